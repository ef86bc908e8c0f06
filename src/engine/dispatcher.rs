use std::sync::Arc;

use tracing::error;

use super::run::RunConfig;
use super::worker::{WorkerContext, WorkerReport, run_worker};

/// How a run's request total is split across its workers.
///
/// Every worker gets `requests / workers` requests; the remainder is not sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPlan {
    requested: u64,
    workers: usize,
    per_worker: u64,
}

impl BatchPlan {
    #[must_use]
    pub fn for_config(config: &RunConfig) -> Self {
        Self::new(config.requests().get(), config.concurrency().get())
    }

    #[must_use]
    pub fn new(requested: u64, workers: usize) -> Self {
        let divisor = u64::try_from(workers).unwrap_or(u64::MAX);
        Self {
            requested,
            workers,
            per_worker: requested.checked_div(divisor).unwrap_or(0),
        }
    }

    #[must_use]
    pub const fn requested(&self) -> u64 {
        self.requested
    }

    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub const fn per_worker(&self) -> u64 {
        self.per_worker
    }

    /// Requests that will actually be issued.
    #[must_use]
    pub fn attempted(&self) -> u64 {
        self.per_worker
            .saturating_mul(u64::try_from(self.workers).unwrap_or(u64::MAX))
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.requested.saturating_sub(self.attempted())
    }
}

/// Spawns one task per worker and waits for all of them.
///
/// Reports come back in worker order. A worker that panicked is logged and
/// left out.
pub(crate) async fn dispatch(plan: BatchPlan, context: &Arc<WorkerContext>) -> Vec<WorkerReport> {
    let handles: Vec<_> = (0..plan.workers())
        .map(|worker_id| {
            tokio::spawn(run_worker(
                worker_id,
                plan.per_worker(),
                Arc::clone(context),
            ))
        })
        .collect();

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(report) => reports.push(report),
            Err(err) => error!("Worker task failed: {}", err),
        }
    }
    reports
}
