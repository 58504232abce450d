//
// Copyright (c) 2020-2021 science+computing ag and other contributors
//
// This program and the accompanying materials are made
// available under the terms of the Eclipse Public License 2.0
// which is available at https://www.eclipse.org/legal/epl-2.0/
//
// SPDX-License-Identifier: EPL-2.0
//

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;
use tracing::trace;
use tracing::warn;

use crate::consts::ENV_SINGLE_THREAD;
use crate::job::BuildJob;

thread_local! {
    /// Re-entrancy guard (spec §4.2): a builder invoked from a background
    /// worker that itself triggers a nested build (sub-asset discovered
    /// mid-build) must not be handed a second pool to recurse into —
    /// it runs single-threaded instead.
    static IN_CONCURRENT_BUILD: Cell<bool> = Cell::new(false);
}

fn in_concurrent_build() -> bool {
    IN_CONCURRENT_BUILD.with(|flag| flag.get())
}

/// A bounded pool of background worker threads, plus inline execution of
/// thread-affine foreground jobs on the calling thread (spec §4.2).
///
/// `nice_count` throttles how many background threads actually run at
/// once; it's allowed to be less than the configured thread count so a
/// machine doing other work isn't starved.
pub struct WorkerPool {
    thread_count: usize,
}

impl WorkerPool {
    pub fn new(thread_count: usize) -> Self {
        WorkerPool {
            thread_count: thread_count.max(1),
        }
    }

    /// Resolve a thread count the way the scheduler's CLI/config does:
    /// `ASSET_BUILDER_SINGLE_THREAD=1` or `force_single_thread` forces one
    /// thread regardless of `configured` (spec §6, used by tests and by
    /// CI to get deterministic ordering). Otherwise `nice` is subtracted
    /// from `configured`, except that nicing below 2 usable threads falls
    /// back to the full `configured` count instead (spec §4.2, §8).
    pub fn resolve(configured: usize, nice: usize, force_single_thread: bool) -> Self {
        let single_threaded = force_single_thread
            || std::env::var(ENV_SINGLE_THREAD)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false);

        if single_threaded || nice >= configured {
            return WorkerPool::new(1);
        }

        let niced = configured - nice;
        if niced < 2 {
            WorkerPool::new(configured)
        } else {
            WorkerPool::new(niced)
        }
    }

    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    /// Run `foreground` inline on the calling thread, and `background`
    /// spread across up to `thread_count` worker threads, via `work`.
    ///
    /// If called while already nested inside a concurrent build (the
    /// re-entrancy guard is set), everything — foreground and background
    /// alike — runs serially inline instead of spawning a second pool
    /// (spec §4.2, §9).
    pub fn execute<F>(&self, foreground: Vec<Arc<BuildJob>>, background: Vec<Arc<BuildJob>>, work: F) -> Result<()>
    where
        F: Fn(&Arc<BuildJob>) -> Result<()> + Send + Sync,
    {
        if in_concurrent_build() || self.thread_count <= 1 {
            trace!(
                reentrant = in_concurrent_build(),
                threads = self.thread_count,
                "Running jobs single-threaded"
            );
            for job in foreground.iter().chain(background.iter()) {
                work(job)?;
            }
            return Ok(());
        }

        IN_CONCURRENT_BUILD.with(|flag| flag.set(true));
        let result = self.execute_concurrent(foreground, background, &work);
        IN_CONCURRENT_BUILD.with(|flag| flag.set(false));
        result
    }

    fn execute_concurrent<F>(&self, foreground: Vec<Arc<BuildJob>>, background: Vec<Arc<BuildJob>>, work: &F) -> Result<()>
    where
        F: Fn(&Arc<BuildJob>) -> Result<()> + Send + Sync,
    {
        let queue: Mutex<VecDeque<Arc<BuildJob>>> = Mutex::new(background.into_iter().collect());
        let first_error: Mutex<Option<anyhow::Error>> = Mutex::new(None);
        let worker_count = self.thread_count.min(queue.lock().expect("pool queue poisoned").len().max(1));

        std::thread::scope(|scope| {
            for _ in 0..worker_count {
                scope.spawn(|| {
                    loop {
                        let job = {
                            let mut q = queue.lock().expect("pool queue poisoned");
                            q.pop_front()
                        };
                        let job = match job {
                            Some(job) => job,
                            None => break,
                        };
                        if let Err(e) = work(&job) {
                            let mut slot = first_error.lock().expect("pool error slot poisoned");
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            warn!(fingerprint = %job.fingerprint(), "Background job failed");
                        }
                    }
                });
            }

            // Foreground jobs are thread-affine: run them on this
            // (the caller's) thread while workers drain the queue.
            for job in &foreground {
                if let Err(e) = work(job) {
                    let mut slot = first_error.lock().expect("pool error slot poisoned");
                    if slot.is_none() {
                        *slot = Some(e);
                    }
                }
            }
        });

        match first_error.into_inner().expect("pool error slot poisoned") {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Asset;
    use crate::asset::AssetId;
    use crate::asset::EngineType;
    use crate::builder::BuilderTypeId;
    use crate::builder::DefaultBuilderOptions;
    use crate::job::Fingerprint;
    use crate::job::JobFlags;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    fn dummy_job(id: u64) -> Arc<BuildJob> {
        let asset = Asset::new(AssetId::new(id), EngineType::new("demo"), format!("asset-{id}"));
        let fingerprint = Fingerprint::new(*asset.id(), "default".into(), BuilderTypeId::new("demo"));
        Arc::new(BuildJob::new(
            asset,
            crate::builder::demo::passthrough_builder(),
            Arc::new(DefaultBuilderOptions),
            "default".into(),
            fingerprint,
            JobFlags::empty(),
        ))
    }

    #[test]
    fn every_job_runs_exactly_once() {
        let pool = WorkerPool::new(4);
        let foreground = vec![dummy_job(1)];
        let background = vec![dummy_job(2), dummy_job(3), dummy_job(4)];
        let counter = AtomicUsize::new(0);

        pool.execute(foreground, background, |_job| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn single_thread_pool_runs_everything_inline() {
        let pool = WorkerPool::new(1);
        let background = vec![dummy_job(1), dummy_job(2)];
        let counter = AtomicUsize::new(0);

        pool.execute(Vec::new(), background, |_job| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn first_error_is_propagated() {
        let pool = WorkerPool::new(2);
        let background = vec![dummy_job(1), dummy_job(2)];

        let result = pool.execute(Vec::new(), background, |_job| anyhow::bail!("boom"));
        assert!(result.is_err());
    }

    #[test]
    fn nice_count_at_or_above_processor_count_forces_single_thread() {
        assert_eq!(WorkerPool::resolve(4, 4, false).thread_count(), 1);
        assert_eq!(WorkerPool::resolve(4, 5, false).thread_count(), 1);
    }

    #[test]
    fn nice_count_leaving_fewer_than_two_threads_falls_back_to_full_count() {
        assert_eq!(WorkerPool::resolve(4, 3, false).thread_count(), 4);
    }

    #[test]
    fn nice_count_is_subtracted_when_enough_threads_remain() {
        assert_eq!(WorkerPool::resolve(8, 3, false).thread_count(), 5);
    }
}
