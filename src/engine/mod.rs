//! Load-generation engine: workers, shared counters, samples and progress fan-out.
mod counters;
mod dispatcher;
mod publisher;
mod run;
mod sampler;
mod samples;
mod target;
mod worker;


pub use counters::{MAX_OUTCOME_COUNT, OutcomeCounters, OutcomeSnapshot};
pub use dispatcher::BatchPlan;
pub use publisher::{DeliveryStats, ObserverSink, ProgressPublisher, ProgressUpdate, spawn_publisher};
pub use run::{RunConfig, RunDeps, RunLimits, RunResult, run_load};
pub use sampler::{ResourceReading, ResourceSampler, SyntheticSampler};
pub use samples::{Sample, SampleCollector};
pub use target::{
    HttpTarget, HttpTargetFactory, RequestOutcome, Target, TargetFactory, TargetSettings,
};
pub use worker::WorkerReport;

#[cfg(test)]
pub(crate) use publisher::test_sink::RecordingSink;
