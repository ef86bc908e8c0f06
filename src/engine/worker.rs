use std::sync::Arc;

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::counters::OutcomeCounters;
use super::publisher::{ProgressPublisher, ProgressUpdate};
use super::sampler::ResourceSampler;
use super::samples::{Sample, SampleCollector};
use super::target::Target;

/// State shared by every worker of one run.
pub(crate) struct WorkerContext {
    pub(crate) target: Arc<dyn Target>,
    pub(crate) sampler: Arc<dyn ResourceSampler>,
    pub(crate) counters: OutcomeCounters,
    pub(crate) samples: SampleCollector,
    pub(crate) publisher: ProgressPublisher,
    pub(crate) expected_status: u16,
}

/// What one worker did with its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub attempted: u64,
    pub successes: u64,
    pub failures: u64,
}

impl WorkerReport {
    const fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            attempted: 0,
            successes: 0,
            failures: 0,
        }
    }

    const fn record(&mut self, success: bool) {
        self.attempted = self.attempted.saturating_add(1);
        if success {
            self.successes = self.successes.saturating_add(1);
        } else {
            self.failures = self.failures.saturating_add(1);
        }
    }
}

/// Issues `batch` requests one after another.
///
/// Each request is timed, classified, counted, sampled and published before the
/// next one starts. Failures are never retried.
pub(crate) async fn run_worker(
    worker_id: usize,
    batch: u64,
    context: Arc<WorkerContext>,
) -> WorkerReport {
    let mut report = WorkerReport::new(worker_id);
    debug!("Worker {} starting {} requests.", worker_id, batch);

    for request_index in 0..batch {
        let started = Instant::now();
        let outcome = context.target.execute().await;
        let latency = started.elapsed();

        let success = outcome.is_success(context.expected_status);
        let counters = if success {
            context.counters.record_success()
        } else {
            trace!("Worker {} request {} failed: {:?}", worker_id, request_index, outcome);
            context.counters.record_failure()
        };
        report.record(success);

        let sample = Sample::new(Utc::now(), context.sampler.sample(request_index), latency);
        context.samples.append(sample);
        context.publisher.publish(ProgressUpdate {
            outcome: counters,
            sample,
        });
    }

    debug!(
        "Worker {} finished: {} ok, {} failed.",
        worker_id, report.successes, report.failures
    );
    report
}
