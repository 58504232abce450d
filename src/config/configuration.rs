//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::PathBuf;

use getset::Getters;

/// Validated, defaulted configuration. Only ever constructed via
/// [`crate::config::NotValidatedConfiguration::validate`].
#[derive(Clone, Debug, Getters)]
pub struct Configuration {
    #[getset(get = "pub")]
    thread_count: usize,

    #[getset(get = "pub")]
    nice_count: usize,

    #[getset(get = "pub")]
    halt_on_error: bool,

    #[getset(get = "pub")]
    cache_dir: PathBuf,

    #[getset(get = "pub")]
    remote_cache_url: Option<String>,

    #[getset(get = "pub")]
    graph_store_path: PathBuf,

    #[getset(get = "pub")]
    log_dir: PathBuf,
}
