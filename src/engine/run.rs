use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};
use url::Url;

use crate::args::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_REQUESTS, PositiveU64, PositiveUsize};
use crate::error::{RunConfigField, ValidationError};

use super::counters::{MAX_OUTCOME_COUNT, OutcomeCounters};
use super::dispatcher::{BatchPlan, dispatch};
use super::publisher::ProgressPublisher;
use super::sampler::ResourceSampler;
use super::samples::{Sample, SampleCollector};
use super::target::Target;
use super::worker::{WorkerContext, WorkerReport};

/// Server-side ceilings applied to every inbound run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    max_requests: u64,
    max_concurrency: usize,
}

impl RunLimits {
    /// `max_requests` is clamped to what the outcome counters can hold.
    #[must_use]
    pub fn new(max_requests: PositiveU64, max_concurrency: PositiveUsize) -> Self {
        Self {
            max_requests: max_requests.get().min(MAX_OUTCOME_COUNT),
            max_concurrency: max_concurrency.get(),
        }
    }

    #[must_use]
    pub const fn max_requests(&self) -> u64 {
        self.max_requests
    }

    #[must_use]
    pub const fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS.min(MAX_OUTCOME_COUNT),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// A validated run: one target, a request total and a worker count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    target: Url,
    requests: PositiveU64,
    concurrency: PositiveUsize,
}

impl RunConfig {
    /// Validates raw observer input.
    ///
    /// # Errors
    ///
    /// Returns an error when `url` is not an absolute http(s) URL with a host,
    /// or when `requests`/`concurrency` are below 1 or above `limits`.
    pub fn new(
        url: &str,
        requests: i64,
        concurrency: i64,
        limits: &RunLimits,
    ) -> Result<Self, ValidationError> {
        let target = parse_target_url(url)?;
        let requests = bounded_count(RunConfigField::Requests, requests, limits.max_requests)?;
        let max_concurrency = u64::try_from(limits.max_concurrency).unwrap_or(u64::MAX);
        let concurrency = bounded_count(RunConfigField::Concurrency, concurrency, max_concurrency)?;
        let concurrency = usize::try_from(concurrency).map_err(|_err| {
            ValidationError::AboveLimit {
                field: RunConfigField::Concurrency,
                max: max_concurrency,
                value: concurrency,
            }
        })?;

        Ok(Self {
            target,
            requests: PositiveU64::try_from(requests)?,
            concurrency: PositiveUsize::try_from(concurrency)?,
        })
    }

    #[must_use]
    pub const fn target(&self) -> &Url {
        &self.target
    }

    #[must_use]
    pub const fn requests(&self) -> PositiveU64 {
        self.requests
    }

    #[must_use]
    pub const fn concurrency(&self) -> PositiveUsize {
        self.concurrency
    }
}

fn parse_target_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw.trim()).map_err(|err| ValidationError::InvalidUrl {
        url: raw.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::UnsupportedScheme {
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::UrlMissingHost);
    }
    Ok(url)
}

fn bounded_count(field: RunConfigField, value: i64, max: u64) -> Result<u64, ValidationError> {
    let count = u64::try_from(value)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or(ValidationError::NonPositive { field, value })?;
    if count > max {
        return Err(ValidationError::AboveLimit {
            field,
            max,
            value: count,
        });
    }
    Ok(count)
}

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// The configured total, including any remainder the batch plan dropped.
    pub total_requests: u64,
    pub success: u64,
    pub failures: u64,
    pub duration: Duration,
    pub samples: Vec<Sample>,
    pub workers: Vec<WorkerReport>,
}

impl RunResult {
    /// Requests that were actually issued and classified.
    #[must_use]
    pub const fn attempted(&self) -> u64 {
        self.success.saturating_add(self.failures)
    }
}

/// Collaborators a run needs besides its configuration.
pub struct RunDeps {
    pub target: Arc<dyn Target>,
    pub sampler: Arc<dyn ResourceSampler>,
    pub publisher: ProgressPublisher,
    pub expected_status: u16,
}

/// Runs one load test to completion.
///
/// Every worker reports each request to `deps.publisher`; the publisher handle
/// is dropped before this returns, so the publishing task ends once it has
/// drained the remaining updates.
pub async fn run_load(config: &RunConfig, deps: RunDeps) -> RunResult {
    let plan = BatchPlan::for_config(config);
    if plan.dropped() > 0 {
        warn!(
            "{} requests do not divide evenly across {} workers; {} will not be sent.",
            plan.requested(),
            plan.workers(),
            plan.dropped()
        );
    }
    info!(
        "Starting run against {}: {} workers x {} requests.",
        config.target(),
        plan.workers(),
        plan.per_worker()
    );

    let context = Arc::new(WorkerContext {
        target: deps.target,
        sampler: deps.sampler,
        counters: OutcomeCounters::new(),
        samples: SampleCollector::with_capacity(
            usize::try_from(plan.attempted()).unwrap_or(usize::MAX).min(MAX_PREALLOCATED_SAMPLES),
        ),
        publisher: deps.publisher,
        expected_status: deps.expected_status,
    });

    let started = Instant::now();
    let workers = dispatch(plan, &context).await;
    let duration = started.elapsed();

    let outcome = context.counters.snapshot();
    let samples = context.samples.take_all();
    drop(context);

    RunResult {
        total_requests: config.requests().get(),
        success: outcome.success,
        failures: outcome.failures,
        duration,
        samples,
        workers,
    }
}

const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;
