//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use getset::Getters;

use crate::asset::Asset;
use crate::builder::Builder;
use crate::builder::BuilderOptions;
use crate::graph::DependencyInfo;
use crate::job::Fingerprint;
use crate::job::JobFlags;
use crate::job::JobResult;

/// The scheduling unit the orchestrator and worker pool operate on: one
/// asset bound to one builder, with everything the build produced along
/// the way (spec §3, §4.1).
///
/// Fields that only ever change before the job is handed to a worker
/// (asset, builder, options, fingerprint) are plain; fields the
/// orchestrator revisits across phases — flags (can only ever be
/// weakened further as duplicate requesters are folded in, spec §8),
/// the result, and captured output — are `Mutex`-guarded so a
/// background-pool thread and the orchestrator thread can both touch
/// them safely.
#[derive(Getters)]
pub struct BuildJob {
    #[getset(get = "pub")]
    asset: Asset,

    #[getset(get = "pub")]
    builder: Arc<dyn Builder>,

    #[getset(get = "pub")]
    options: Arc<dyn BuilderOptions>,

    #[getset(get = "pub")]
    build_string: String,

    #[getset(get = "pub")]
    fingerprint: Fingerprint,

    flags: Mutex<JobFlags>,

    /// The flags this job was first created with, kept around so the
    /// orchestrator can tell whether a later merge actually changed
    /// anything (spec §3: flags only ever lose `Required`, never gain it
    /// back once stripped at this job's own level).
    original_flags: JobFlags,

    result: Mutex<JobResult>,

    outputs: Mutex<Vec<DependencyInfo>>,

    warning_count: AtomicU32,
    error_count: AtomicU32,
}

impl BuildJob {
    pub fn new(
        asset: Asset,
        builder: Arc<dyn Builder>,
        options: Arc<dyn BuilderOptions>,
        build_string: String,
        fingerprint: Fingerprint,
        flags: JobFlags,
    ) -> Self {
        BuildJob {
            asset,
            builder,
            options,
            build_string,
            fingerprint,
            flags: Mutex::new(flags),
            original_flags: flags,
            result: Mutex::new(JobResult::Pending),
            outputs: Mutex::new(Vec::new()),
            warning_count: AtomicU32::new(0),
            error_count: AtomicU32::new(0),
        }
    }

    pub fn flags(&self) -> JobFlags {
        *self.flags.lock().expect("job flags lock poisoned")
    }

    pub fn original_flags(&self) -> JobFlags {
        self.original_flags
    }

    /// Fold in a second requester's flags for the same fingerprint,
    /// honoring flag monotonicity: the result only ever keeps or clears
    /// `Required`, never sets it where it wasn't already present (spec
    /// §8). A job that's already lost `Required` — to its own parent
    /// being optional, or to an earlier duplicate request — never gets
    /// it back from a later, weaker or stronger request.
    pub fn merge_flags(&self, other: JobFlags) {
        let mut flags = self.flags.lock().expect("job flags lock poisoned");
        flags.intersect(other);
    }

    pub fn set_flags(&self, new_flags: JobFlags) {
        *self.flags.lock().expect("job flags lock poisoned") = new_flags;
    }

    pub fn result(&self) -> JobResult {
        *self.result.lock().expect("job result lock poisoned")
    }

    pub fn set_result(&self, result: JobResult) {
        *self.result.lock().expect("job result lock poisoned") = result;
    }

    pub fn take_outputs(&self) -> Vec<DependencyInfo> {
        std::mem::take(&mut self.outputs.lock().expect("job outputs lock poisoned"))
    }

    pub fn set_outputs(&self, outputs: Vec<DependencyInfo>) {
        *self.outputs.lock().expect("job outputs lock poisoned") = outputs;
    }

    pub fn record_warning(&self) {
        self.warning_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u32 {
        self.error_count.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for BuildJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildJob")
            .field("asset", &self.asset)
            .field("fingerprint", &self.fingerprint)
            .field("flags", &self.flags())
            .field("result", &self.result())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetId;
    use crate::asset::EngineType;
    use crate::builder::BuilderTypeId;
    use crate::builder::DefaultBuilderOptions;

    fn sample_job(flags: JobFlags) -> BuildJob {
        let asset = Asset::new(AssetId::new(1), EngineType::new("demo"), "demo-asset".into());
        let fingerprint = Fingerprint::new(
            *asset.id(),
            "default".into(),
            BuilderTypeId::new("demo.passthrough"),
        );
        BuildJob::new(
            asset,
            crate::builder::demo::passthrough_builder(),
            Arc::new(DefaultBuilderOptions),
            "default".into(),
            fingerprint,
            flags,
        )
    }

    #[test]
    fn merge_flags_never_revives_a_cleared_bit() {
        let job = sample_job(JobFlags::empty());
        // A second requester asking for `Required` cannot undo this
        // job's own flags already having dropped it.
        job.merge_flags(JobFlags::REQUIRED);
        assert!(!job.flags().is_required());

        job.set_flags(JobFlags::REQUIRED);
        // A second, weaker requester strips `Required` back off.
        job.merge_flags(JobFlags::empty());
        assert!(!job.flags().is_required());

        job.set_flags(JobFlags::REQUIRED);
        job.merge_flags(JobFlags::REQUIRED);
        assert!(job.flags().is_required());
    }

    #[test]
    fn warning_and_error_counts_start_at_zero() {
        let job = sample_job(JobFlags::empty());
        assert_eq!(job.warning_count(), 0);
        assert_eq!(job.error_count(), 0);
        job.record_warning();
        job.record_error();
        job.record_error();
        assert_eq!(job.warning_count(), 1);
        assert_eq!(job.error_count(), 2);
    }
}
