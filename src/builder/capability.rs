//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::path::PathBuf;

use anyhow::Result;

use crate::asset::Asset;
use crate::builder::BuilderOptions;
use crate::builder::BuilderTypeId;
use crate::graph::DependencyInfo;
use crate::job::JobSpec;

/// What a builder produced, independent of whether the scheduler ends up
/// classifying the containing job as `Clean` or `Dirty` (spec §4.1, Phase
/// K/L): `outputs` are registered as dependency-graph records either way,
/// but only a `success == true` outcome is eligible to be pushed to the
/// content cache.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    pub outputs: Vec<DependencyInfo>,
    pub success: bool,
}

/// The contract every concrete builder (shader, texture, animation, …)
/// implements. Avoids an inheritance tree in favour of one flat trait,
/// matching this crate's general preference for capability traits over
/// class hierarchies (spec §4.5, §9).
///
/// Implementations must be `Send + Sync`: a single builder instance is
/// shared across every worker thread invoking it, including foreground
/// jobs running on the calling thread and background jobs running in the
/// pool (spec §4.2).
pub trait Builder: Send + Sync {
    /// Stable identity for this builder's *type*, used in job
    /// fingerprints (spec §9, see [`BuilderTypeId`]'s doc comment for why
    /// this replaced vtable-pointer identity).
    fn builder_type_id(&self) -> BuilderTypeId;

    /// Human-readable asset class this builder is registered under, used
    /// only for logging and diagnostics.
    fn asset_class(&self) -> &str;

    /// Called once per job before any other method, to let the builder
    /// cache whatever per-asset state the rest of its methods need.
    fn initialize(&self, asset: &Asset, options: &dyn BuilderOptions) -> Result<()>;

    /// A string folded into the job's fingerprint alongside asset id and
    /// builder type id (spec §3): two jobs for the same asset and builder
    /// with different build strings are never deduplicated together.
    fn build_string(&self, asset: &Asset, options: &dyn BuilderOptions) -> Result<String>;

    /// Whether [`Self::register_inputs`] must run, and the resulting
    /// inputs be hashed, *before* [`Self::gather_jobs`] is invoked (spec
    /// §4.1, Phase D) — some builders need an up-to-date input set to
    /// decide what sub-jobs to request.
    fn needs_pre_register_inputs(&self) -> bool {
        false
    }

    /// Whether this builder must run on the thread that discovered it,
    /// rather than being handed to the background pool (spec §4.2).
    fn needs_thread_affinity(&self) -> bool {
        false
    }

    /// The ordered list of inputs this asset's build depends on, used to
    /// compute its content signature (spec §4.3).
    fn register_inputs(&self, asset: &Asset, options: &dyn BuilderOptions) -> Result<Vec<DependencyInfo>>;

    /// Sub-builds this job needs before it can run at all (spec §4.1,
    /// Phase D).
    fn gather_jobs(&self, asset: &Asset, options: &dyn BuilderOptions) -> Result<Vec<JobSpec>> {
        let _ = (asset, options);
        Ok(Vec::new())
    }

    /// Additional sub-builds discovered only after this job's own inputs
    /// are known, potentially across several passes (spec §4.1, Phase
    /// H); `pass` starts at zero and increments each time this method
    /// returns a non-empty list.
    fn gather_dependent_jobs(
        &self,
        asset: &Asset,
        options: &dyn BuilderOptions,
        pass: u32,
    ) -> Result<Vec<JobSpec>> {
        let _ = (asset, options, pass);
        Ok(Vec::new())
    }

    /// Sub-builds that must run *after* this job completes, regardless of
    /// its own result (spec §4.1, Phase N).
    fn gather_post_jobs(&self, asset: &Asset, options: &dyn BuilderOptions) -> Result<Vec<JobSpec>> {
        let _ = (asset, options);
        Ok(Vec::new())
    }

    /// Where this builder writes its outputs, prior to running `build`.
    fn output_directory(&self, asset: &Asset) -> PathBuf;

    /// Actually perform the build. Only called once the job has been
    /// determined to be stale (spec §4.1, Phase K).
    fn build(&self, asset: &Asset, options: &dyn BuilderOptions, output_dir: &PathBuf) -> Result<BuildOutcome>;
}
