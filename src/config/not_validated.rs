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

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;

use crate::config::Configuration;

/// The shape of `assetforge.toml` (or whatever TOML/env source is
/// configured) before it's been checked for consistency. Kept separate
/// from [`Configuration`] so a malformed config file can't silently
/// propagate `None`s into code that assumes validated, defaulted values
/// (spec §9, modeled after the teacher's `NotValidatedConfiguration`
/// split).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotValidatedConfiguration {
    /// Number of background worker threads. Defaults to the number of
    /// logical CPUs if unset.
    pub thread_count: Option<usize>,

    /// How many of `thread_count` worker threads to give up, to leave
    /// headroom for other work on the machine (spec §6). Defaults to 0.
    pub nice_count: Option<usize>,

    /// Promote every optional job failure to a fatal abort, the way a
    /// required job failure already is (spec §4.1, §7). Defaults to
    /// false.
    pub halt_on_error: Option<bool>,

    /// Where built outputs are cached locally.
    pub cache_dir: Option<PathBuf>,

    /// Base URL of a remote content cache, if one is configured. Mutually
    /// exclusive with relying on `cache_dir` alone, but both may be set —
    /// the remote is consulted first, and a miss falls through to the
    /// local cache (spec §4.4).
    pub remote_cache_url: Option<String>,

    /// Directory holding the persisted dependency-graph store.
    pub graph_store_path: Option<PathBuf>,

    /// Directory per-job trace/warning/error logs are written to.
    pub log_dir: Option<PathBuf>,
}

impl NotValidatedConfiguration {
    pub fn validate(self) -> Result<Configuration> {
        let thread_count = self.thread_count.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });

        if thread_count == 0 {
            anyhow::bail!("'thread_count' must be at least 1 if set");
        }

        let nice_count = self.nice_count.unwrap_or(0);
        let halt_on_error = self.halt_on_error.unwrap_or(false);

        let cache_dir = self
            .cache_dir
            .unwrap_or_else(|| PathBuf::from(".assetforge/cache"));
        let graph_store_path = self
            .graph_store_path
            .unwrap_or_else(|| PathBuf::from(".assetforge/graph.json"));
        let log_dir = self.log_dir.unwrap_or_else(|| PathBuf::from(".assetforge/log"));

        if let Some(url) = &self.remote_cache_url {
            url::Url::parse(url).with_context(|| format!("'remote_cache_url' is not a valid URL: {url}"))?;
        }

        Ok(Configuration {
            thread_count,
            nice_count,
            halt_on_error,
            cache_dir,
            remote_cache_url: self.remote_cache_url,
            graph_store_path,
            log_dir,
        })
    }
}
