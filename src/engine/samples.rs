use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::sampler::ResourceReading;

/// One timestamped measurement taken after a completed request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub cpu_usage: f64,
    pub mem_usage: u64,
    pub latency: Duration,
}

impl Sample {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, reading: ResourceReading, latency: Duration) -> Self {
        Self {
            timestamp,
            cpu_usage: reading.cpu_usage,
            mem_usage: reading.mem_usage,
            latency,
        }
    }

    /// Response latency in seconds.
    #[must_use]
    pub fn response_time(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}

/// Append-only sample log shared by all workers of a run.
///
/// Appends from different workers interleave in completion order; samples from
/// one worker keep that worker's request order.
#[derive(Debug, Default)]
pub struct SampleCollector {
    samples: Mutex<Vec<Sample>>,
}

impl SampleCollector {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Appends a sample and returns the collector length after the append.
    pub fn append(&self, sample: Sample) -> usize {
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        samples.push(sample);
        samples.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves every collected sample out, leaving the collector empty.
    #[must_use]
    pub fn take_all(&self) -> Vec<Sample> {
        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *samples)
    }
}
