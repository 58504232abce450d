//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::HashSet;
use std::fs;
use std::fs::File;
use std::io::Write;

use anyhow::Context;
use anyhow::Result;
use tracing::debug;
use tracing::trace;

use crate::cache::CacheGetRequest;
use crate::cache::CacheKey;
use crate::cache::CachePutRequest;
use crate::cache::ContentCache;

/// A cache backed by an HTTP(S) object store, reachable from every
/// machine running the scheduler (spec §4.4: "the only coupling between
/// machines").
///
/// The worker pool itself is a plain `std::thread` pool (spec §9), so
/// this wraps a small dedicated Tokio runtime to drive `reqwest` — the
/// only place in this crate async I/O shows up at all.
pub struct RemoteContentCache {
    base_url: String,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl RemoteContentCache {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Building cache client runtime")?;

        Ok(RemoteContentCache {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            runtime,
        })
    }

    fn url_for(&self, key: &CacheKey) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

impl ContentCache for RemoteContentCache {
    /// Downloads every requested entry over the same runtime, one after
    /// another within a single `block_on` call — still one batched
    /// round-trip from the orchestrator's perspective, even though the
    /// requests themselves aren't sent concurrently.
    fn get(&self, requests: &[CacheGetRequest]) -> Result<HashSet<String>> {
        self.runtime.block_on(async {
            let mut hits = HashSet::new();
            for request in requests {
                let key: &CacheKey = &request.key;
                let url = self.url_for(key);
                trace!(%url, "Pulling cache entry");

                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .with_context(|| format!("GET {url}"))?;

                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    continue;
                }
                let response = response
                    .error_for_status()
                    .with_context(|| format!("GET {url}"))?;

                if let Some(parent) = request.destination.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Creating directory {}", parent.display()))?;
                }

                let bytes = response.bytes().await.context("Reading cache response body")?;
                let mut file = File::create(&request.destination)
                    .with_context(|| format!("Creating {}", request.destination.display()))?;
                file.write_all(&bytes)
                    .with_context(|| format!("Writing {}", request.destination.display()))?;

                debug!(%key, dest = %request.destination.display(), "Cache hit");
                hits.insert(request.key.clone());
            }
            Ok(hits)
        })
    }

    fn put(&self, requests: &[CachePutRequest]) -> Result<()> {
        self.runtime.block_on(async {
            for request in requests {
                let key: &CacheKey = &request.key;
                let url = self.url_for(key);
                let body = fs::read(&request.source)
                    .with_context(|| format!("Reading {}", request.source.display()))?;

                self.client
                    .put(&url)
                    .body(body)
                    .send()
                    .await
                    .with_context(|| format!("PUT {url}"))?
                    .error_for_status()
                    .with_context(|| format!("PUT {url}"))?;

                debug!(%key, "Published cache entry");
            }
            Ok(())
        })
    }
}
