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

use crate::job::Fingerprint;

/// Severity of one [`LogItem`], mirroring the original implementation's
/// `Console::Bullet` trace/warning/error split (spec §9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// One message emitted while building `fingerprint` (or, for
/// orchestrator-level messages with no single job attached, `None`).
#[derive(Clone, Debug)]
pub struct LogItem {
    pub level: LogLevel,
    pub fingerprint: Option<Fingerprint>,
    pub message: String,
}

impl LogItem {
    pub fn new(level: LogLevel, fingerprint: Option<Fingerprint>, message: impl Into<String>) -> Self {
        LogItem {
            level,
            fingerprint,
            message: message.into(),
        }
    }
}
