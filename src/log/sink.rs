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

use crate::log::LogItem;

/// A listener for build log output, invoked once per [`LogItem`].
///
/// Multiple sinks are typically installed at once — a console sink for
/// interactive feedback and a file sink for durable per-job logs (spec
/// §9) — so the orchestrator fans each item out to a `Vec<Arc<dyn
/// LogSink>>` rather than picking one.
pub trait LogSink: Send + Sync {
    fn record(&self, item: &LogItem) -> Result<()>;
}

/// Fan a single [`LogItem`] out to every sink in `sinks`, continuing past
/// any individual sink's failure and returning the first error seen, if
/// any — a warning file that fails to write shouldn't stop the build.
pub fn broadcast(sinks: &[std::sync::Arc<dyn LogSink>], item: &LogItem) -> Result<()> {
    let mut first_error = None;
    for sink in sinks {
        if let Err(e) = sink.record(item) {
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
