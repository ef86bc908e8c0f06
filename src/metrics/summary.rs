use std::time::Duration;

use tracing::{info, warn};

use super::LatencyHistogram;
use crate::engine::RunResult;

/// Headline numbers for one finished run. Latencies are microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_requests: u64,
    pub success: u64,
    pub failures: u64,
    pub duration: Duration,
    pub success_rate_x100: u64,
    pub avg_rps_x100: u64,
    pub min_latency_us: u64,
    pub max_latency_us: u64,
    pub avg_latency_us: u64,
    pub p50_latency_us: u64,
    pub p90_latency_us: u64,
    pub p99_latency_us: u64,
}

impl RunSummary {
    #[must_use]
    pub fn from_result(result: &RunResult) -> Self {
        let attempted = result.attempted();
        let mut summary = Self {
            total_requests: result.total_requests,
            success: result.success,
            failures: result.failures,
            duration: result.duration,
            ..Self::default()
        };

        if attempted > 0 {
            let scaled = u128::from(result.success)
                .saturating_mul(10_000)
                .checked_div(u128::from(attempted))
                .unwrap_or(0);
            summary.success_rate_x100 = u64::try_from(scaled).unwrap_or(u64::MAX);

            let duration_us = result.duration.as_micros().max(1);
            let scaled = u128::from(attempted)
                .saturating_mul(100_000_000)
                .checked_div(duration_us)
                .unwrap_or(0);
            summary.avg_rps_x100 = u64::try_from(scaled).unwrap_or(u64::MAX);
        }

        let mut histogram = match LatencyHistogram::new() {
            Ok(histogram) => histogram,
            Err(err) => {
                warn!("Latency summary unavailable: {}", err);
                return summary;
            }
        };
        let mut latency_sum_us: u128 = 0;
        for sample in &result.samples {
            let latency_us = u64::try_from(sample.latency.as_micros()).unwrap_or(u64::MAX);
            latency_sum_us = latency_sum_us.saturating_add(u128::from(latency_us));
            if let Err(err) = histogram.record(latency_us) {
                warn!("Dropping latency from summary: {}", err);
            }
        }

        let (p50, p90, p99) = histogram.percentiles();
        summary.p50_latency_us = p50;
        summary.p90_latency_us = p90;
        summary.p99_latency_us = p99;
        summary.min_latency_us = histogram.min();
        summary.max_latency_us = histogram.max();
        let samples = u128::try_from(result.samples.len()).unwrap_or(u128::MAX);
        summary.avg_latency_us = latency_sum_us
            .checked_div(samples)
            .and_then(|avg| u64::try_from(avg).ok())
            .unwrap_or(0);
        summary
    }

    pub fn log(&self) {
        info!(
            "Run finished in {}ms: {} configured, {} ok, {} failed ({}.{:02}% ok), {}.{:02} req/s.",
            self.duration.as_millis(),
            self.total_requests,
            self.success,
            self.failures,
            self.success_rate_x100 / 100,
            self.success_rate_x100 % 100,
            self.avg_rps_x100 / 100,
            self.avg_rps_x100 % 100,
        );
        info!(
            "Latency (us): min {} / avg {} / max {}, p50 {} / p90 {} / p99 {}.",
            self.min_latency_us,
            self.avg_latency_us,
            self.max_latency_us,
            self.p50_latency_us,
            self.p90_latency_us,
            self.p99_latency_us,
        );
    }
}
