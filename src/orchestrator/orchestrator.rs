//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Result;
use tracing::debug;
use tracing::instrument;
use tracing::warn;

use crate::asset::AssetId;
use crate::asset::AssetRegistry;
use crate::builder::BuilderRegistry;
use crate::cache::CacheGetRequest;
use crate::cache::CachePutRequest;
use crate::cache::ContentCache;
use crate::graph::DependencyGraph;
use crate::graph::DependencyInfo;
use crate::job::process_new_jobs;
use crate::job::BuildJob;
use crate::job::Fingerprint;
use crate::job::JobResult;
use crate::job::JobSpec;
use crate::log::broadcast;
use crate::log::LogItem;
use crate::log::LogLevel;
use crate::log::LogSink;
use crate::orchestrator::BuildContext;
use crate::orchestrator::StackGuard;
use crate::pool::WorkerPool;
use crate::telemetry::TelemetrySink;

/// What became of a job once its own inputs and sub-builds (Phases C
/// through H) were resolved, but before the level's batched cache
/// lookup (Phase F/I/J) or the worker pool (Phase K) touches it.
enum Resolution {
    /// Already terminal — `Skip` or `Failure` — nothing left to do.
    Terminal,
    /// Stale; its signature still needs to be checked against the
    /// content cache, batched together with every other stale job at
    /// this level (spec §4.1/§5).
    NeedsCacheLookup(DependencyInfo),
}

/// Ties every component together and runs the recursive, multi-phase
/// build algorithm described in spec §4.1.
pub struct Orchestrator {
    asset_registry: Arc<dyn AssetRegistry>,
    builder_registry: Arc<BuilderRegistry>,
    dependency_graph: Arc<dyn DependencyGraph>,
    content_cache: Arc<dyn ContentCache>,
    pool: WorkerPool,
    log_sinks: Vec<Arc<dyn LogSink>>,
    telemetry: Arc<TelemetrySink>,
}

impl Orchestrator {
    pub fn new(
        asset_registry: Arc<dyn AssetRegistry>,
        builder_registry: Arc<BuilderRegistry>,
        dependency_graph: Arc<dyn DependencyGraph>,
        content_cache: Arc<dyn ContentCache>,
        pool: WorkerPool,
        log_sinks: Vec<Arc<dyn LogSink>>,
        telemetry: Arc<TelemetrySink>,
    ) -> Self {
        Orchestrator {
            asset_registry,
            builder_registry,
            dependency_graph,
            content_cache,
            pool,
            log_sinks,
            telemetry,
        }
    }

    /// Build one top-level asset (spec §4.1, Phase P — originally
    /// `SendTopLevelBuild`): records overall timing telemetry around a
    /// fresh recursive build, rooted at depth 1. `halt_on_error` promotes
    /// every optional job failure to a fatal abort, the same way a
    /// required job failure already is (spec §7).
    #[instrument(skip(self), fields(asset_id = %asset_id))]
    pub fn build(&self, asset_id: AssetId, halt_on_error: bool) -> Result<JobResult> {
        let start = Instant::now();
        let ctx = BuildContext::new(halt_on_error);

        let jobs = self.build_level(&ctx, vec![JobSpec::required(asset_id)], true)?;
        let result = jobs.first().map(|job| job.result()).unwrap_or(JobResult::Failure);

        self.telemetry
            .record_top_level_build(asset_id, start.elapsed(), result.is_terminal_success());

        Ok(result)
    }

    fn log(&self, level: LogLevel, fingerprint: Option<Fingerprint>, message: impl Into<String>) {
        let item = LogItem::new(level, fingerprint, message);
        if let Err(e) = broadcast(&self.log_sinks, &item) {
            warn!(error = %e, "Failed to record a log item");
        }
    }

    /// One recursion level: resolve a batch of [`JobSpec`]s to concrete,
    /// deduplicated [`BuildJob`]s and drive each through to a terminal
    /// [`JobResult`] (spec §4.1, Phases A through N). `parent_required`
    /// is the flags of whatever job produced `specs` (or `true` at the
    /// very top, where there is no parent to weaken against); it drives
    /// the `process_new_jobs` flag-weakening applied before dedup.
    fn build_level(&self, ctx: &BuildContext, specs: Vec<JobSpec>, parent_required: bool) -> Result<Vec<Arc<BuildJob>>> {
        // Phase A: weaken flags relative to the parent and the current
        // recursion depth, then resolve each spec to (asset, builder,
        // build_string), compute its fingerprint, and dedupe against
        // this level's job set. A duplicate requester can only weaken
        // an existing job's flags further, never restore a bit a
        // previous requester (or this job's own parent) already
        // stripped (spec §8).
        let depth = StackGuard::depth() + 1;
        let specs = process_new_jobs(parent_required, depth, specs);

        let mut order: Vec<Fingerprint> = Vec::new();
        let mut jobs: HashMap<Fingerprint, Arc<BuildJob>> = HashMap::new();
        let mut newly_created: Vec<Fingerprint> = Vec::new();

        for spec in specs {
            let asset_id = *spec.asset_id();
            if ctx.has_failed(asset_id) {
                debug!(%asset_id, "Asset already failed at this build, skipping");
                continue;
            }
            let asset = self.asset_registry.find(asset_id)?;

            let builder_type_id = self.builder_registry.builder_type_id(asset.engine_type())?;
            let builder = self.builder_registry.allocate(asset.engine_type())?;
            builder.initialize(&asset, spec.options().as_ref())?;
            let build_string = builder.build_string(&asset, spec.options().as_ref())?;
            let fingerprint = Fingerprint::new(*asset.id(), build_string.clone(), builder_type_id);

            if let Some(existing) = jobs.get(&fingerprint) {
                existing.merge_flags(*spec.flags());
                continue;
            }

            let job = Arc::new(BuildJob::new(
                asset,
                builder,
                spec.options().clone(),
                build_string,
                fingerprint.clone(),
                *spec.flags(),
            ));
            order.push(fingerprint.clone());
            newly_created.push(fingerprint.clone());
            jobs.insert(fingerprint, job);
        }

        // Phases C-H: resolve sub-builds and staleness for every new job
        // at this level, sequentially — each call can itself recurse
        // into `build_level` for its own sub-jobs. What's left after
        // this loop is the set of jobs whose signature still needs a
        // cache lookup.
        let mut lookups: HashMap<Fingerprint, DependencyInfo> = HashMap::new();

        for fingerprint in &newly_created {
            let job = jobs.get(fingerprint).expect("just inserted").clone();
            match self.prepare_job(ctx, &job)? {
                Resolution::Terminal => {}
                Resolution::NeedsCacheLookup(output) => {
                    lookups.insert(fingerprint.clone(), output);
                }
            }
        }

        // Phase F/I/J: one batched cache round-trip for every stale job
        // at this level (spec §4.1/§4.4/§5's `allOutputFiles` /
        // `downloadOutputFiles`), instead of a lookup per job.
        let mut pending: HashMap<Fingerprint, DependencyInfo> = HashMap::new();
        let mut foreground: Vec<Arc<BuildJob>> = Vec::new();
        let mut background: Vec<Arc<BuildJob>> = Vec::new();

        if !lookups.is_empty() {
            let requests: Vec<CacheGetRequest> = lookups
                .iter()
                .filter_map(|(fingerprint, output)| {
                    let signature = output.hash().as_ref()?;
                    if signature.is_empty() {
                        return None;
                    }
                    let job = jobs.get(fingerprint).expect("present");
                    let destination = job.builder().output_directory(job.asset()).join("download.bin");
                    Some(CacheGetRequest {
                        key: signature.clone(),
                        destination,
                    })
                })
                .collect();
            let hits: HashSet<String> = if requests.is_empty() {
                HashSet::new()
            } else {
                self.content_cache.get(&requests)?
            };

            for (fingerprint, output) in lookups {
                let job = jobs.get(&fingerprint).expect("present").clone();
                let signature = output.hash().clone().unwrap_or_default();
                if !signature.is_empty() && hits.contains(&signature) {
                    // Phase J: a cache hit satisfies the job without
                    // invoking its builder.
                    job.set_result(JobResult::Download);
                    self.dependency_graph.update_outputs(&[output])?;
                } else {
                    if job.builder().needs_thread_affinity() {
                        foreground.push(job.clone());
                    } else {
                        background.push(job.clone());
                    }
                    pending.insert(fingerprint, output);
                }
            }
        }

        // Phase K: invoke every still-stale job's builder, foreground
        // jobs inline on this thread and background jobs spread across
        // the worker pool (spec §4.2) — all of this level's jobs run
        // concurrently with each other, unlike the sub-build resolution
        // above.
        let mut uploads: Vec<CachePutRequest> = Vec::new();
        if !foreground.is_empty() || !background.is_empty() {
            let pending = Mutex::new(pending);
            let uploads_mutex: Mutex<Vec<CachePutRequest>> = Mutex::new(Vec::new());
            self.pool.execute(foreground, background, |job| {
                let output = pending
                    .lock()
                    .expect("pending-output map poisoned")
                    .remove(job.fingerprint())
                    .expect("every dispatched job has a pending output");
                if let Some(upload) = self.run_build(ctx, job, &output)? {
                    uploads_mutex
                        .lock()
                        .expect("cache upload batch lock poisoned")
                        .push(upload);
                }
                Ok(())
            })?;
            uploads = uploads_mutex.into_inner().expect("cache upload batch lock poisoned");
        }

        // Phase L: one batched publish for every `Clean` job's outputs
        // at this level (spec §4.1/§4.4/§5's `filesToUpload`), instead
        // of a push per job.
        if !uploads.is_empty() {
            self.content_cache.put(&uploads)?;
        }

        // Phase N: post-jobs run once a job has reached a terminal
        // result, regardless of what that result was.
        for fingerprint in &newly_created {
            let job = jobs.get(fingerprint).expect("present").clone();
            self.run_post_jobs(ctx, &job)?;
        }

        Ok(order.into_iter().map(|fp| jobs.remove(&fp).expect("present")).collect())
    }

    /// Resolve sub-builds, dependency-graph registration, and staleness
    /// for one freshly-created job (spec §4.1, Phases C through H).
    /// Returns [`Resolution::NeedsCacheLookup`] iff the job is stale and
    /// still needs a content-cache lookup, batched across the level by
    /// [`Orchestrator::build_level`].
    fn prepare_job(&self, ctx: &BuildContext, job: &Arc<BuildJob>) -> Result<Resolution> {
        let _stack_guard = match StackGuard::push(*job.asset().id()) {
            Ok(guard) => guard,
            Err(cycle_asset) => {
                self.log(
                    LogLevel::Error,
                    Some(job.fingerprint().clone()),
                    format!("Dependency cycle detected at asset {cycle_asset}"),
                );
                self.fail(ctx, job);
                return Ok(Resolution::Terminal);
            }
        };

        // Phase D: gather and recursively build the sub-jobs this job
        // needs before it can run at all.
        let pre_register = job.builder().needs_pre_register_inputs();
        let mut inputs = if pre_register {
            job.builder().register_inputs(job.asset(), job.options().as_ref())?
        } else {
            Vec::new()
        };

        let sub_specs = job.builder().gather_jobs(job.asset(), job.options().as_ref())?;
        if !sub_specs.is_empty() {
            let sub_jobs = self.build_level(ctx, sub_specs, job.flags().is_required())?;
            if self.any_fatal_failure(ctx, &sub_jobs) {
                self.fail(ctx, job);
                return Ok(Resolution::Terminal);
            }
        }

        if !pre_register {
            inputs = job.builder().register_inputs(job.asset(), job.options().as_ref())?;
        }

        // Phase E: register this job's inputs.
        let mut output = DependencyInfo::file(self.job_output_key(job), 1);
        self.dependency_graph.register_inputs(&output, inputs)?;

        // Phase D/G: compare against the signature recorded by the last
        // *successful* build, before anything recomputes a signature
        // from the inputs just registered above.
        let up_to_date = self.dependency_graph.is_up_to_date(&output)?;
        if up_to_date {
            job.set_result(JobResult::Skip);
        } else {
            // Phase F: stale, so compute a fresh signature to use as
            // this job's content-cache key.
            self.dependency_graph
                .create_signatures(std::slice::from_mut(&mut output), true)?;
        }

        // Phase H: additional sub-builds discovered once this job's own
        // inputs are known, across as many passes as the builder asks
        // for.
        let mut pass = 0;
        loop {
            let dependent_specs = job
                .builder()
                .gather_dependent_jobs(job.asset(), job.options().as_ref(), pass)?;
            if dependent_specs.is_empty() {
                break;
            }
            let dependent_jobs = self.build_level(ctx, dependent_specs, job.flags().is_required())?;
            if self.any_fatal_failure(ctx, &dependent_jobs) {
                self.fail(ctx, job);
                return Ok(Resolution::Terminal);
            }
            pass += 1;
        }

        if up_to_date {
            return Ok(Resolution::Terminal);
        }

        // Phase I: defer the actual cache lookup to `build_level`, which
        // batches it together with every other stale job at this level.
        Ok(Resolution::NeedsCacheLookup(output))
    }

    /// Actually invoke a job's builder (spec §4.1, Phase K) and update
    /// the dependency graph. Returns the cache-publish request for a
    /// `Clean` result's outputs, left for `build_level` to batch
    /// together with every other `Clean` job at this level (Phase L).
    fn run_build(&self, ctx: &BuildContext, job: &Arc<BuildJob>, output: &DependencyInfo) -> Result<Option<CachePutRequest>> {
        let start = Instant::now();
        let output_dir = job.builder().output_directory(job.asset());
        let outcome = job.builder().build(job.asset(), job.options().as_ref(), &output_dir);

        self.telemetry
            .record_builder_build(job.builder().builder_type_id(), start.elapsed());

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                job.record_error();
                self.log(LogLevel::Error, Some(job.fingerprint().clone()), e.to_string());
                self.fail(ctx, job);
                return Ok(None);
            }
        };

        job.set_outputs(outcome.outputs.clone());

        if !outcome.success {
            job.set_result(JobResult::Dirty);
            if job.flags().is_required() || ctx.halt_on_error {
                ctx.mark_failed(*job.asset().id());
            }
            return Ok(None);
        }

        job.set_result(JobResult::Clean);
        self.dependency_graph.update_outputs(std::slice::from_ref(output))?;

        // Phase L: only a `Clean` job's outputs are eligible for the
        // cache (spec §9's open question — `Skip`/`Download` jobs never
        // re-upload what they never rebuilt). The actual publish is
        // batched by `build_level` across this level's jobs.
        match (output.hash(), outcome.outputs.first()) {
            (Some(signature), Some(first_output)) => Ok(Some(CachePutRequest {
                key: signature.clone(),
                source: first_output.path().to_path_buf(),
            })),
            _ => Ok(None),
        }
    }

    /// Sub-builds that must run after this job completes, regardless of
    /// its own result (spec §4.1, Phase N).
    fn run_post_jobs(&self, ctx: &BuildContext, job: &Arc<BuildJob>) -> Result<()> {
        let post_specs = job.builder().gather_post_jobs(job.asset(), job.options().as_ref())?;
        if post_specs.is_empty() {
            return Ok(());
        }
        let post_jobs = self.build_level(ctx, post_specs, job.flags().is_required())?;
        if self.any_fatal_failure(ctx, &post_jobs) && (job.flags().is_required() || ctx.halt_on_error) {
            ctx.mark_failed(*job.asset().id());
        }
        Ok(())
    }

    /// Whether any of `jobs` failed in a way that must propagate: either
    /// it carried `Required`, or `halt_on_error` promotes every failure
    /// to fatal regardless of flags (spec §7).
    fn any_fatal_failure(&self, ctx: &BuildContext, jobs: &[Arc<BuildJob>]) -> bool {
        jobs.iter()
            .any(|j| j.result().is_failure() && (j.flags().is_required() || ctx.halt_on_error))
    }

    fn fail(&self, ctx: &BuildContext, job: &Arc<BuildJob>) {
        job.set_result(JobResult::Failure);
        if job.flags().is_required() || ctx.halt_on_error {
            ctx.mark_failed(*job.asset().id());
        }
    }

    /// A synthetic dependency-graph key representing this job's
    /// aggregate output, used when a builder doesn't model its outputs as
    /// individually-addressable files up front.
    fn job_output_key(&self, job: &Arc<BuildJob>) -> PathBuf {
        job.builder()
            .output_directory(job.asset())
            .join(format!("{}.manifest", job.fingerprint()))
    }
}

#[allow(dead_code)]
fn assert_send_sync<T: Send + Sync>() {}

#[allow(dead_code)]
fn orchestrator_is_send_sync() {
    assert_send_sync::<Orchestrator>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::asset::EngineType;
    use crate::asset::InMemoryAssetRegistry;
    use crate::builder::demo::ComposeBuilderFactory;
    use crate::builder::demo::PassthroughBuilderFactory;
    use crate::cache::FilesystemContentCache;
    use crate::graph::FileDependencyGraph;
    use crate::pool::WorkerPool;

    fn orchestrator_with(
        registry: InMemoryAssetRegistry,
        mut builders: BuilderRegistry,
        work_dir: &std::path::Path,
    ) -> Orchestrator {
        builders.register(Arc::new(PassthroughBuilderFactory));
        let dependency_graph = Arc::new(FileDependencyGraph::open(work_dir.join("graph.json")).unwrap());
        let content_cache = Arc::new(FilesystemContentCache::new(work_dir.join("cache")));
        Orchestrator::new(
            Arc::new(registry),
            Arc::new(builders),
            dependency_graph,
            content_cache,
            WorkerPool::new(2),
            Vec::new(),
            Arc::new(TelemetrySink::new()),
        )
    }

    #[test]
    fn a_fresh_passthrough_build_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let leaf = dir.path().join("leaf.txt");
        std::fs::write(&leaf, b"hi").unwrap();

        let mut registry = InMemoryAssetRegistry::new();
        let asset = Asset::new(
            AssetId::new(1),
            EngineType::new("demo.passthrough"),
            leaf.to_string_lossy().into_owned(),
        );
        registry.insert(asset);

        let orchestrator = orchestrator_with(registry, BuilderRegistry::new(), dir.path());
        let result = orchestrator.build(AssetId::new(1), false).unwrap();
        assert_eq!(result, JobResult::Clean);
    }

    #[test]
    fn a_second_build_with_unchanged_input_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let leaf = dir.path().join("leaf.txt");
        std::fs::write(&leaf, b"hi").unwrap();

        let mut registry = InMemoryAssetRegistry::new();
        let asset = Asset::new(
            AssetId::new(1),
            EngineType::new("demo.passthrough"),
            leaf.to_string_lossy().into_owned(),
        );
        registry.insert(asset);

        let orchestrator = orchestrator_with(registry, BuilderRegistry::new(), dir.path());
        assert_eq!(orchestrator.build(AssetId::new(1), false).unwrap(), JobResult::Clean);
        assert_eq!(orchestrator.build(AssetId::new(1), false).unwrap(), JobResult::Skip);
    }

    #[test]
    fn compose_builder_pulls_in_its_sub_assets() {
        let dir = tempfile::tempdir().unwrap();
        let child = dir.path().join("child.txt");
        std::fs::write(&child, b"hi").unwrap();

        let mut registry = InMemoryAssetRegistry::new();
        registry.insert(Asset::new(AssetId::new(1), EngineType::new("demo.compose"), "root".into()));
        registry.insert(Asset::new(
            AssetId::new(2),
            EngineType::new("demo.passthrough"),
            child.to_string_lossy().into_owned(),
        ));

        let mut builders = BuilderRegistry::new();
        builders.register(Arc::new(ComposeBuilderFactory {
            sub_assets: vec![AssetId::new(2)],
        }));

        let orchestrator = orchestrator_with(registry, builders, dir.path());
        let result = orchestrator.build(AssetId::new(1), false).unwrap();
        assert!(result.is_terminal_success());
    }
}
