//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::fmt;

/// The terminal (or not-yet-terminal) state of a [`crate::job::BuildJob`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobResult {
    /// Not yet resolved.
    Pending,
    /// Built fresh, by invoking the builder.
    Clean,
    /// The builder returned `false` with no errors recorded.
    Dirty,
    /// The job was already up-to-date; nothing ran.
    Skip,
    /// Satisfied from the content cache.
    Download,
    /// The job, or one of its required dependents, failed.
    Failure,
}

impl JobResult {
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, JobResult::Clean | JobResult::Download | JobResult::Skip)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobResult::Failure)
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobResult::Pending => "Pending",
            JobResult::Clean => "Clean",
            JobResult::Dirty => "Dirty",
            JobResult::Skip => "Skip",
            JobResult::Download => "Download",
            JobResult::Failure => "Failure",
        };
        write!(f, "{}", s)
    }
}
