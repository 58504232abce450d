//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The content cache (spec §4.4): the only coupling between machines in
//! this scheduler. Jobs that produce a `Clean` result push their outputs
//! here, keyed by signature; jobs whose signature is already present can
//! be satisfied with a `Download` instead of re-running the builder.
//!
//! The orchestrator assembles one request batch per recursion level
//! (`allOutputFiles`/`downloadOutputFiles`/`filesToUpload` in spec §4.1,
//! §4.4, §5) rather than calling this trait once per job, so `get`/`put`
//! take the whole batch at once.

mod fs;
pub use fs::*;

mod remote;
pub use remote::*;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Result;

/// A cache entry key: the output signature computed by
/// [`crate::graph::DependencyGraph::create_signatures`].
pub type CacheKey = str;

/// One entry in a batched [`ContentCache::get`] call: download `key`,
/// if present, to `destination`.
pub struct CacheGetRequest {
    pub key: String,
    pub destination: PathBuf,
}

/// One entry in a batched [`ContentCache::put`] call: publish the file
/// at `source` under `key`.
pub struct CachePutRequest {
    pub key: String,
    pub source: PathBuf,
}

/// The contract the orchestrator pulls from and workers push to.
///
/// Implementations are shared across worker threads (spec §4.2) so must
/// be `Send + Sync`; `get`/`put` are synchronous from the caller's
/// perspective even when an implementation (like [`RemoteContentCache`])
/// does network I/O underneath, matching this crate's choice to keep the
/// worker pool itself a plain OS-thread pool rather than an async runtime
/// (spec §9).
pub trait ContentCache: Send + Sync {
    /// Fetch every entry in `requests` whose key is present, writing it
    /// to its requested destination, in one round-trip for the whole
    /// batch. Returns the keys that were actual hits — a miss is a
    /// normal outcome for any individual entry, not an error, and never
    /// fails the rest of the batch.
    fn get(&self, requests: &[CacheGetRequest]) -> Result<HashSet<String>>;

    /// Publish every entry in `requests`, in one round-trip for the
    /// whole batch. Called only with jobs whose [`crate::job::JobResult`]
    /// was `Clean` (spec §9's open question: the original only ever
    /// uploads `Clean` outputs, never already-`Skip`ped ones, and this
    /// crate keeps that restriction rather than "fixing" it into
    /// uploading everything).
    fn put(&self, requests: &[CachePutRequest]) -> Result<()>;
}
