use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::engine::{OutcomeSnapshot, RunConfig, RunLimits, RunResult, Sample};
use crate::error::ValidationError;

/// Run configuration sent by the observer as its first message.
///
/// `requests` and `concurrency` are signed so a negative value reaches
/// validation instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfigMessage {
    pub url: String,
    pub requests: i64,
    pub concurrency: i64,
}

impl RunConfigMessage {
    /// Validates the message against the server limits.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is not an absolute http(s) URL or either
    /// count is non-positive or above its limit.
    pub fn into_run_config(self, limits: &RunLimits) -> Result<RunConfig, ValidationError> {
        RunConfig::new(&self.url, self.requests, self.concurrency, limits)
    }
}

/// Wire form of one [`Sample`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// RFC 3339, UTC, nanosecond precision.
    pub timestamp: String,
    pub cpu_usage: f64,
    pub mem_usage: u64,
    /// Seconds.
    pub response_time: f64,
}

impl From<&Sample> for ResourceUsage {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            cpu_usage: sample.cpu_usage,
            mem_usage: sample.mem_usage,
            response_time: sample.response_time(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressMessage {
    pub success: u64,
    pub failures: u64,
    pub resource_usage: ResourceUsage,
}

impl ProgressMessage {
    #[must_use]
    pub fn new(outcome: OutcomeSnapshot, sample: &Sample) -> Self {
        Self {
            success: outcome.success,
            failures: outcome.failures,
            resource_usage: ResourceUsage::from(sample),
        }
    }
}

/// Final summary of a run. `duration` is wall-clock nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMessage {
    pub total_requests: u64,
    pub success: u64,
    pub failures: u64,
    pub duration: u64,
    pub resource_usage: Vec<ResourceUsage>,
}

impl From<&RunResult> for ResultMessage {
    fn from(result: &RunResult) -> Self {
        Self {
            total_requests: result.total_requests,
            success: result.success,
            failures: result.failures,
            duration: u64::try_from(result.duration.as_nanos()).unwrap_or(u64::MAX),
            resource_usage: result.samples.iter().map(ResourceUsage::from).collect(),
        }
    }
}
