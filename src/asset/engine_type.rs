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

/// Tag identifying which family of builders is responsible for an asset.
///
/// The concrete set of engine types is owned by the asset registry and its
/// builder plug-ins (out of scope, spec §1); the scheduler treats this as an
/// opaque key used only to look builders up in the [`crate::builder::BuilderRegistry`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineType(String);

impl EngineType {
    pub fn new(name: impl Into<String>) -> Self {
        EngineType(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EngineType {
    fn from(s: &str) -> Self {
        EngineType(s.to_string())
    }
}
