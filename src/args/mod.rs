//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::ServerArgs;
pub use types::{PositiveU64, PositiveUsize};

pub(crate) use defaults::DEFAULT_USER_AGENT;
pub use defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_EXPECTED_STATUS, DEFAULT_LISTEN, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MAX_REQUESTS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_ROUTE,
};
