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

use serde::Deserialize;
use serde::Serialize;

/// A stable identity for a builder's *type*, provided by its factory.
///
/// The original implementation this crate is based on derived builder
/// identity from the builder instance's vtable pointer, which the design
/// notes (spec §9) call out as a leaky choice. Here every
/// [`crate::builder::BuilderFactory`] carries one of these, and a job's
/// fingerprint is `(asset_id, build_string, builder_type_id)` rather than
/// anything address-derived.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BuilderTypeId(String);

impl BuilderTypeId {
    pub fn new(name: impl Into<String>) -> Self {
        BuilderTypeId(name.into())
    }
}

impl fmt::Display for BuilderTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BuilderTypeId {
    fn from(s: &str) -> Self {
        BuilderTypeId(s.to_string())
    }
}
