//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

//! The dependency graph (spec §4.3): a persistent store of
//! `(path, format_version, hash)` records, with operations to compute
//! aggregated content signatures over input sets and to update output
//! records after a successful build.

mod info;
pub use info::*;

mod signature;
pub use signature::*;

mod store;
pub use store::*;

use anyhow::Result;

/// The contract the orchestrator and worker pool depend on.
///
/// `update_outputs` is called both concurrently (from workers, for `Clean`
/// jobs, spec §4.2) and serially (from the orchestrator, for `Download`
/// jobs, spec §4.1 Phase J); implementations must serialize their own
/// writes internally.
pub trait DependencyGraph: Send + Sync {
    /// Register the ordered list of inputs a given output depends on.
    fn register_inputs(&self, output: &DependencyInfo, inputs: Vec<DependencyInfo>) -> Result<()>;

    /// Whether `output`'s recorded signature matches what its registered
    /// inputs currently hash to, and its format version is current.
    fn is_up_to_date(&self, output: &DependencyInfo) -> Result<bool>;

    /// Compute an aggregate content signature for each of `outputs` from
    /// its registered, ordered, transitive inputs. With `force`, recompute
    /// even if a cached signature is already present.
    fn create_signatures(&self, outputs: &mut [DependencyInfo], force: bool) -> Result<()>;

    /// Persist the current hashes of `outputs` as their canonical version.
    /// Idempotent; safe to call concurrently for disjoint output sets.
    fn update_outputs(&self, outputs: &[DependencyInfo]) -> Result<()>;
}
