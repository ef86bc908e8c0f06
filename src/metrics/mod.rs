//! Latency histogram and end-of-run summary.
mod histogram;
mod summary;


pub use histogram::LatencyHistogram;
pub use summary::RunSummary;
