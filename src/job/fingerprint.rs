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

use crate::asset::AssetId;
use crate::builder::BuilderTypeId;

/// `(asset_id, build_string, builder_type_id)`, the dedup key within a
/// single orchestrator level (spec §3, §9).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint {
    asset_id: AssetId,
    build_string: String,
    builder_type_id: BuilderTypeId,
}

impl Fingerprint {
    pub fn new(asset_id: AssetId, build_string: String, builder_type_id: BuilderTypeId) -> Self {
        Fingerprint {
            asset_id,
            build_string,
            builder_type_id,
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}",
            self.asset_id, self.build_string, self.builder_type_id
        )
    }
}
