//! Dispatching sorts of the live field onto a dedicated thread pool.
//!
//! A trigger never blocks the caller: the sort is handed to a dispatch
//! thread that fans out onto the pool, and a [`SortHandle`] is returned
//! immediately. The handle can be dropped
//! (fire-and-forget) or awaited for the [`SortReport`].

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use statik_field::ScalarField;
use statik_sort::{SortOptions, SortReport, sort_by, sort_in};
use statik_types::SortPolicy;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::operator::OperatorState;

/// Errors that can occur when building the sort pool.
#[derive(Debug, thiserror::Error)]
pub enum SorterError {
    /// The rayon pool could not be created.
    #[error("failed to build sort thread pool: {source}")]
    Pool {
        /// The underlying rayon error.
        #[from]
        source: rayon::ThreadPoolBuildError,
    },
}

/// Completion of one dispatched sort.
#[derive(Debug)]
pub struct SortHandle {
    receiver: oneshot::Receiver<SortReport>,
}

impl SortHandle {
    /// Wait for the sort to finish. `None` if the worker went away without
    /// reporting.
    pub async fn finished(self) -> Option<SortReport> {
        self.receiver.await.ok()
    }

    /// Blocking variant of [`finished`](Self::finished) for synchronous
    /// callers. Must not be called from inside an async runtime.
    pub fn wait(self) -> Option<SortReport> {
        self.receiver.blocking_recv().ok()
    }
}

/// Owns the sort pool and applies the configured field-sharing policy.
#[derive(Debug)]
pub struct SortCoordinator {
    pool: Arc<ThreadPool>,
    policy: SortPolicy,
    options: SortOptions,
}

impl SortCoordinator {
    /// Build a coordinator with its own pool of `threads` workers (0 lets
    /// rayon pick one per core).
    ///
    /// # Errors
    ///
    /// Returns [`SorterError::Pool`] if the pool cannot be started.
    pub fn new(policy: SortPolicy, options: SortOptions, threads: usize) -> Result<Self, SorterError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("statik-sort-{i}"))
            .build()?;
        Ok(Self {
            pool: Arc::new(pool),
            policy,
            options,
        })
    }

    /// Field-sharing policy.
    pub const fn policy(&self) -> SortPolicy {
        self.policy
    }

    /// Fan-out options.
    pub const fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Start sorting `field` in the background. The sort runs on a
    /// dispatch thread that fans out onto the pool.
    pub fn trigger(&self, field: &Arc<ScalarField>, operator: &Arc<OperatorState>) -> SortHandle {
        let (sender, receiver) = oneshot::channel();
        let field = Arc::clone(field);
        let task_operator = Arc::clone(operator);
        let policy = self.policy;
        let options = self.options.clone();

        operator.sort_started();
        info!(
            %policy,
            cells = field.dims().cell_count(),
            in_flight = operator.sorts_in_flight(),
            "Sort dispatched"
        );

        let pool = Arc::clone(&self.pool);
        let worker = std::thread::Builder::new()
            .name(String::from("statik-sort-dispatch"))
            .spawn(move || {
                let report = run_policy(&pool, policy, &field, &options);
                task_operator.sort_finished();
                info!(
                    %policy,
                    len = report.len,
                    partitions = report.partitions,
                    spawned_tasks = report.spawned_tasks,
                    elapsed_ms = report.elapsed.as_millis(),
                    "Sort finished"
                );
                if sender.send(report).is_err() {
                    debug!("Sort handle dropped before completion");
                }
            });
        if let Err(error) = worker {
            warn!(%error, "Sort dispatch thread could not be started");
            operator.sort_finished();
        }

        SortHandle { receiver }
    }
}

/// Run one sort under `policy`. The gate is only ever taken on the calling
/// thread, never on a pool worker, so a worker blocked in one sort's scope
/// cannot pick up a second sort that waits on the same gate.
fn run_policy(
    pool: &ThreadPool,
    policy: SortPolicy,
    field: &ScalarField,
    options: &SortOptions,
) -> SortReport {
    match policy {
        SortPolicy::Interleaved => sort_in(pool, field, options),
        SortPolicy::Exclusive => {
            let _gate = field.lock_exclusive();
            sort_in(pool, field, options)
        }
        SortPolicy::Snapshot => {
            let values = {
                let _gate = field.lock_exclusive();
                field.values()
            };
            let (sorted, report) = pool.install(|| sort_by(values, |a: &f64, b: &f64| a < b, options));
            let _gate = field.lock_exclusive();
            if let Err(error) = field.store_all(&sorted) {
                warn!(%error, "Sorted snapshot could not be written back");
            }
            report
        }
    }
}
