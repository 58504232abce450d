//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The asset data model.
//!
//! An [`Asset`] is an opaque handle supplied by the asset registry, which
//! lives outside this crate's scope (see spec §6). The scheduler never
//! constructs one itself; it only reads its three accessors.

mod id;
pub use id::*;

mod engine_type;
pub use engine_type::*;

mod registry;
pub use registry::*;

use getset::Getters;

/// An addressable unit of content with a 64-bit id and an engine-type tag.
#[derive(Clone, Debug, Getters, PartialEq, Eq)]
pub struct Asset {
    #[getset(get = "pub")]
    id: AssetId,

    #[getset(get = "pub")]
    engine_type: EngineType,

    #[getset(get = "pub")]
    full_name: String,
}

impl Asset {
    pub fn new(id: AssetId, engine_type: EngineType, full_name: String) -> Self {
        Asset {
            id,
            engine_type,
            full_name,
        }
    }
}
