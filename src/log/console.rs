//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use anyhow::Result;
use colored::Colorize;

use crate::log::LogItem;
use crate::log::LogLevel;
use crate::log::LogSink;

/// Prints build output to the terminal, colored by severity — the
/// interactive counterpart to [`crate::log::FileSink`]'s durable record.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn record(&self, item: &LogItem) -> Result<()> {
        let prefix = match item.level {
            LogLevel::Trace => "trace".dimmed(),
            LogLevel::Warning => "warn".yellow().bold(),
            LogLevel::Error => "error".red().bold(),
        };

        match &item.fingerprint {
            Some(fp) => println!("[{prefix}] {fp}: {}", item.message),
            None => println!("[{prefix}] {}", item.message),
        }
        Ok(())
    }
}
