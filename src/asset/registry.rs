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

use crate::asset::Asset;
use crate::asset::AssetId;

/// Lookup of an opaque [`Asset`] handle by its [`AssetId`].
///
/// Out of scope for this crate (spec §6): a real deployment backs this with
/// a reflection/serialization runtime that knows how to resolve an id to a
/// full asset class. The scheduler depends only on this trait.
pub trait AssetRegistry: Send + Sync {
    fn find(&self, id: AssetId) -> Result<Asset>;
}

/// A trivial in-memory registry, useful for tests and small standalone
/// tools that don't have a real asset database behind them.
#[derive(Debug, Default)]
pub struct InMemoryAssetRegistry {
    assets: std::collections::HashMap<AssetId, Asset>,
}

impl InMemoryAssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset: Asset) -> &mut Self {
        self.assets.insert(*asset.id(), asset);
        self
    }
}

impl AssetRegistry for InMemoryAssetRegistry {
    fn find(&self, id: AssetId) -> Result<Asset> {
        self.assets
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Unknown asset id: {}", id))
    }
}
