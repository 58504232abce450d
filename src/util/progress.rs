//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use indicatif::ProgressBar;
use indicatif::ProgressStyle;

/// A progress bar tracking jobs processed at the current recursion level,
/// the rough equivalent of the original implementation's nested
/// `Console::Bullet` counters (spec §9).
pub fn job_progress_bar(total_jobs: u64) -> ProgressBar {
    let bar = ProgressBar::new(total_jobs);
    let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    bar.set_style(style);
    bar
}
