//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

/// Environment variable that forces the scheduler onto a single thread,
/// regardless of the configured thread/nice count.
pub const ENV_SINGLE_THREAD: &str = "ASSET_BUILDER_SINGLE_THREAD";

/// Name of the trace/warning/error log files written per job, joined with
/// the job's trace token and one of "trace", "warn", "error".
pub const TRACE_FILE_SUFFIX: &str = "trace.log";
pub const WARNING_FILE_SUFFIX: &str = "warn.log";
pub const ERROR_FILE_SUFFIX: &str = "error.log";
