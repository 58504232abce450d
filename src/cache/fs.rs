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
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use tracing::debug;
use tracing::trace;

use crate::cache::CacheGetRequest;
use crate::cache::CacheKey;
use crate::cache::CachePutRequest;
use crate::cache::ContentCache;

/// A cache backed by a local directory, one file per key. The obvious
/// choice for a single-machine setup or a cache shared over a network
/// filesystem (spec §4.4).
pub struct FilesystemContentCache {
    root: PathBuf,
}

impl FilesystemContentCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemContentCache { root: root.into() }
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key)
    }
}

impl ContentCache for FilesystemContentCache {
    fn get(&self, requests: &[CacheGetRequest]) -> Result<HashSet<String>> {
        let mut hits = HashSet::new();
        for request in requests {
            let key: &CacheKey = &request.key;
            let entry = self.entry_path(key);
            if !entry.exists() {
                trace!(%key, "Cache miss");
                continue;
            }

            if let Some(parent) = request.destination.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating directory {}", parent.display()))?;
            }
            fs::copy(&entry, &request.destination).with_context(|| {
                format!("Copying cache entry {} to {}", entry.display(), request.destination.display())
            })?;
            debug!(%key, dest = %request.destination.display(), "Cache hit");
            hits.insert(request.key.clone());
        }
        Ok(hits)
    }

    fn put(&self, requests: &[CachePutRequest]) -> Result<()> {
        if requests.is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Creating cache root {}", self.root.display()))?;
        for request in requests {
            let key: &CacheKey = &request.key;
            let entry = self.entry_path(key);
            fs::copy(&request.source, &entry).with_context(|| {
                format!("Publishing {} to cache entry {}", request.source.display(), entry.display())
            })?;
            debug!(%key, "Published cache entry");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_then_push_then_hit() {
        let cache_dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();
        let cache = FilesystemContentCache::new(cache_dir.path());

        let source = work_dir.path().join("out.bin");
        fs::write(&source, b"payload").unwrap();
        let dest = work_dir.path().join("downloaded.bin");

        let miss = cache
            .get(&[CacheGetRequest {
                key: "abc123".into(),
                destination: dest.clone(),
            }])
            .unwrap();
        assert!(miss.is_empty());

        cache
            .put(&[CachePutRequest {
                key: "abc123".into(),
                source: source.clone(),
            }])
            .unwrap();

        let hits = cache
            .get(&[CacheGetRequest {
                key: "abc123".into(),
                destination: dest.clone(),
            }])
            .unwrap();
        assert!(hits.contains("abc123"));
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn get_of_unknown_key_is_a_miss_not_an_error() {
        let cache_dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();
        let cache = FilesystemContentCache::new(cache_dir.path());
        let dest = work_dir.path().join("downloaded.bin");
        let hits = cache
            .get(&[CacheGetRequest {
                key: "missing".into(),
                destination: dest,
            }])
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn a_batch_can_mix_hits_and_misses() {
        let cache_dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();
        let cache = FilesystemContentCache::new(cache_dir.path());

        let source = work_dir.path().join("out.bin");
        fs::write(&source, b"payload").unwrap();
        cache
            .put(&[CachePutRequest {
                key: "present".into(),
                source,
            }])
            .unwrap();

        let hits = cache
            .get(&[
                CacheGetRequest {
                    key: "present".into(),
                    destination: work_dir.path().join("present.bin"),
                },
                CacheGetRequest {
                    key: "absent".into(),
                    destination: work_dir.path().join("absent.bin"),
                },
            ])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits.contains("present"));
    }
}
