/// Resource figures attached to one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceReading {
    pub cpu_usage: f64,
    pub mem_usage: u64,
}

/// Source of the resource figures recorded with every sample.
///
/// `request_index` is the position of the just-completed request within its
/// worker's batch, starting at zero.
pub trait ResourceSampler: Send + Sync {
    fn sample(&self, request_index: u64) -> ResourceReading;
}

/// Placeholder readings that climb with the request index.
///
/// Load starts at `0.5` and grows by `0.01` per request; memory starts at `100`
/// and grows by `10`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSampler;

const BASE_CPU: f64 = 0.5;
const CPU_STEP: f64 = 0.01;
const BASE_MEM: u64 = 100;
const MEM_STEP: u64 = 10;

impl ResourceSampler for SyntheticSampler {
    #[expect(clippy::float_arithmetic, reason = "synthetic load curve is a float ramp")]
    fn sample(&self, request_index: u64) -> ResourceReading {
        ResourceReading {
            cpu_usage: BASE_CPU + request_index as f64 * CPU_STEP,
            mem_usage: BASE_MEM.saturating_add(request_index.saturating_mul(MEM_STEP)),
        }
    }
}
