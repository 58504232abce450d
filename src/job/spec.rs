//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::sync::Arc;

use getset::Getters;

use crate::asset::AssetId;
use crate::builder::BuilderOptions;
use crate::builder::DefaultBuilderOptions;
use crate::job::JobFlags;

/// A requested build, before it has been resolved to a concrete
/// [`crate::builder::Builder`] and deduplicated against the current
/// level's job set (spec §4.1, Phase A/D/H/N).
///
/// Builders emit these from [`crate::builder::Builder::gather_jobs`] and
/// friends; the orchestrator is the only thing that turns a `JobSpec`
/// into a [`crate::job::BuildJob`].
#[derive(Clone, Getters)]
pub struct JobSpec {
    #[getset(get = "pub")]
    asset_id: AssetId,

    #[getset(get = "pub")]
    options: Arc<dyn BuilderOptions>,

    #[getset(get = "pub")]
    flags: JobFlags,
}

impl JobSpec {
    pub fn new(asset_id: AssetId, options: Arc<dyn BuilderOptions>, flags: JobFlags) -> Self {
        JobSpec {
            asset_id,
            options,
            flags,
        }
    }

    /// A required build request with default options, the common case
    /// for a top-level build (spec §4.1, Phase A).
    pub fn required(asset_id: AssetId) -> Self {
        JobSpec::new(asset_id, Arc::new(DefaultBuilderOptions), JobFlags::REQUIRED)
    }

    /// An optional build request with default options, the common case
    /// for a dependency a builder discovers but doesn't strictly need
    /// (spec §3).
    pub fn optional(asset_id: AssetId) -> Self {
        JobSpec::new(asset_id, Arc::new(DefaultBuilderOptions), JobFlags::empty())
    }

    pub fn flags_mut(&mut self) -> &mut JobFlags {
        &mut self.flags
    }
}

/// Apply the flag-weakening `process_new_jobs` performs on every
/// candidate job before it's handed to the orchestrator's dedup step
/// (spec §4.1): a `Required` spec is stripped down to optional when the
/// job that produced it (`parent_required`) isn't itself `Required` —
/// `Required` never survives past an optional parent. Then
/// `RequiredOnlyInTopLevelBuild` is resolved against `depth`: at depth 1
/// it's promoted via [`JobFlags::mask_to`] (the literal, possibly-buggy
/// masking behavior the original implements — see the open question on
/// that method), otherwise the flag is simply cleared.
pub fn process_new_jobs(parent_required: bool, depth: u32, specs: Vec<JobSpec>) -> Vec<JobSpec> {
    specs
        .into_iter()
        .map(|mut spec| {
            if !parent_required {
                spec.flags_mut().remove(JobFlags::REQUIRED);
            }
            if spec.flags().contains(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD) {
                if depth == 1 {
                    spec.flags_mut().mask_to(JobFlags::REQUIRED);
                } else {
                    spec.flags_mut().remove(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD);
                }
            }
            spec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_child_of_an_optional_parent_is_weakened() {
        let specs = vec![JobSpec::required(AssetId::new(1))];
        let processed = process_new_jobs(false, 2, specs);
        assert!(!processed[0].flags().is_required());
    }

    #[test]
    fn required_child_of_a_required_parent_stays_required() {
        let specs = vec![JobSpec::required(AssetId::new(1))];
        let processed = process_new_jobs(true, 2, specs);
        assert!(processed[0].flags().is_required());
    }

    #[test]
    fn top_level_only_flag_is_promoted_at_depth_one() {
        let spec = JobSpec::new(AssetId::new(1), Arc::new(DefaultBuilderOptions), JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD);
        let processed = process_new_jobs(true, 1, vec![spec]);
        assert!(processed[0].flags().is_required());
    }

    #[test]
    fn top_level_only_flag_is_dropped_below_depth_one() {
        let spec = JobSpec::new(AssetId::new(1), Arc::new(DefaultBuilderOptions), JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD);
        let processed = process_new_jobs(true, 2, vec![spec]);
        assert!(!processed[0].flags().is_required());
        assert!(!processed[0].flags().contains(JobFlags::REQUIRED_ONLY_IN_TOP_LEVEL_BUILD));
    }
}

impl std::fmt::Debug for JobSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobSpec")
            .field("asset_id", &self.asset_id)
            .field("flags", &self.flags)
            .finish()
    }
}
