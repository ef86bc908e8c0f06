//! JSON messages exchanged with the observer.
//!
//! One inbound [`RunConfigMessage`], then one [`ProgressMessage`] per completed
//! request, then a single [`ResultMessage`].
mod messages;


pub use messages::{ProgressMessage, ResourceUsage, ResultMessage, RunConfigMessage};
