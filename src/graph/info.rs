//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Context;
use anyhow::Result;
use getset::Getters;
use getset::Setters;
use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

/// What a [`DependencyInfo`] actually addresses: a file on disk, or an
/// in-memory blob (spec §3: "Subtypes distinguish on-disk files from
/// in-memory data blobs").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DependencyKind {
    File,
    Blob(Vec<u8>),
}

/// One record per input or output artifact tracked by the
/// [`crate::graph::DependencyGraph`].
#[derive(Clone, Debug, Getters, Setters, Serialize, Deserialize)]
pub struct DependencyInfo {
    #[getset(get = "pub")]
    path: PathBuf,

    #[getset(get = "pub")]
    format_version: u32,

    #[getset(get = "pub", set = "pub")]
    last_modified: Option<SystemTime>,

    #[getset(get = "pub", set = "pub")]
    size: u64,

    #[getset(get = "pub", set = "pub")]
    hash: Option<String>,

    #[getset(get = "pub", set = "pub")]
    valid: bool,

    #[getset(get = "pub", set = "pub")]
    row_id: Option<u64>,

    #[getset(get = "pub", set = "pub")]
    version_row_id: Option<u64>,

    #[getset(get = "pub", set = "pub")]
    downloaded: bool,

    #[getset(get = "pub")]
    kind: DependencyKind,

    /// Whether this artifact must exist for the build to be valid.
    /// Optional inputs that no longer exist on disk are skipped during
    /// signature creation rather than erroring (spec §4.3).
    #[getset(get = "pub")]
    optional: bool,
}

impl DependencyInfo {
    pub fn file(path: PathBuf, format_version: u32) -> Self {
        DependencyInfo {
            path,
            format_version,
            last_modified: None,
            size: 0,
            hash: None,
            valid: false,
            row_id: None,
            version_row_id: None,
            downloaded: false,
            kind: DependencyKind::File,
            optional: false,
        }
    }

    pub fn optional_file(path: PathBuf, format_version: u32) -> Self {
        let mut info = Self::file(path, format_version);
        info.optional = true;
        info
    }

    pub fn blob(name: PathBuf, format_version: u32, data: Vec<u8>) -> Self {
        DependencyInfo {
            path: name,
            format_version,
            last_modified: None,
            size: data.len() as u64,
            hash: None,
            valid: false,
            row_id: None,
            version_row_id: None,
            downloaded: false,
            kind: DependencyKind::Blob(data),
            optional: false,
        }
    }

    /// Whether the currently-cached `hash` is still valid for the on-disk
    /// state of this artifact, without recomputing it.
    pub fn is_hash_valid(&self) -> bool {
        self.valid && self.hash.is_some()
    }

    /// Whether the file backing this record has changed since `hash` was
    /// last computed: cheaply, via size + mtime; a full rehash only
    /// happens in [`Self::regenerate_hash`] once this returns `true` and
    /// the size also matches (spec §4.3).
    pub fn was_modified(&self) -> Result<bool> {
        match &self.kind {
            DependencyKind::Blob(_) => Ok(!self.valid),
            DependencyKind::File => {
                if !self.path.exists() {
                    return Ok(true);
                }
                let meta = fs::metadata(&self.path)
                    .with_context(|| format!("Statting {}", self.path.display()))?;
                let mtime_changed = match (meta.modified().ok(), self.last_modified) {
                    (Some(now), Some(then)) => now != then,
                    _ => true,
                };
                Ok(mtime_changed || meta.len() != self.size)
            }
        }
    }

    /// Recompute `hash` from the current content, if [`Self::was_modified`]
    /// says it's necessary. Updates `last_modified`/`size` to match.
    pub fn regenerate_hash(&mut self) -> Result<()> {
        if !self.was_modified()? {
            self.valid = true;
            return Ok(());
        }

        match &self.kind {
            DependencyKind::Blob(data) => {
                let mut hasher = Sha256::new();
                hasher.update(data);
                self.hash = Some(hex::encode(hasher.finalize()));
                self.size = data.len() as u64;
            }
            DependencyKind::File => {
                let bytes = fs::read(&self.path)
                    .with_context(|| format!("Reading {}", self.path.display()))?;
                let meta = fs::metadata(&self.path)
                    .with_context(|| format!("Statting {}", self.path.display()))?;
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                self.hash = Some(hex::encode(hasher.finalize()));
                self.size = bytes.len() as u64;
                self.last_modified = meta.modified().ok();
            }
        }

        self.valid = true;
        Ok(())
    }

    /// Fold this artifact's content hash into an aggregate signature
    /// hasher, regenerating the hash first if stale. Returns `Ok(false)`
    /// without touching the hasher when this is an optional input that no
    /// longer exists on disk (spec §4.3).
    pub fn append_to_signature(&mut self, hasher: &mut Sha256) -> Result<bool> {
        if self.optional && !self.exists_on_disk() {
            return Ok(false);
        }

        if !self.is_hash_valid() {
            self.regenerate_hash()?;
        }

        let hash = self
            .hash
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("No hash available for {}", self.path.display()))?;
        hasher.update(self.path.to_string_lossy().as_bytes());
        hasher.update(hash.as_bytes());
        Ok(true)
    }

    fn exists_on_disk(&self) -> bool {
        match &self.kind {
            DependencyKind::Blob(_) => true,
            DependencyKind::File => self.path.exists(),
        }
    }
}

/// A small helper so callers don't need to pull in the `hex` crate
/// themselves; kept local to this module since it's the only place that
/// turns a digest into a stable, persisted string.
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[allow(dead_code)]
fn assert_path_is_relative_or_absolute(_p: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn blob_hash_is_deterministic() {
        let mut a = DependencyInfo::blob(PathBuf::from("virtual/a"), 1, vec![1, 2, 3]);
        let mut b = DependencyInfo::blob(PathBuf::from("virtual/a"), 1, vec![1, 2, 3]);
        a.regenerate_hash().unwrap();
        b.regenerate_hash().unwrap();
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn file_hash_changes_when_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"hello").unwrap();

        let mut info = DependencyInfo::file(path.clone(), 1);
        info.regenerate_hash().unwrap();
        let first = info.hash().clone();

        // sleep isn't reliable for mtime granularity in CI, so force a
        // distinct mtime via utime-like remove+recreate isn't available
        // without extra deps; rewriting is enough to change size+content.
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b" world").unwrap();
        drop(f);

        info.regenerate_hash().unwrap();
        assert_ne!(first, *info.hash());
    }

    #[test]
    fn optional_missing_input_is_skipped_in_signature() {
        let mut info = DependencyInfo::optional_file(PathBuf::from("/does/not/exist"), 1);
        let mut hasher = Sha256::new();
        let appended = info.append_to_signature(&mut hasher).unwrap();
        assert!(!appended);
    }
}
