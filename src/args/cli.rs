use clap::Parser;
use std::time::Duration;

use super::defaults::{DEFAULT_EXPECTED_STATUS, DEFAULT_LISTEN, DEFAULT_ROUTE};
use super::parsers::{
    parse_duration_arg, parse_positive_u64, parse_positive_usize, parse_route_path,
    parse_status_code,
};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Concurrent HTTP load generator that streams live progress to a WebSocket observer."
)]
pub struct ServerArgs {
    /// Address the observer endpoint listens on
    #[arg(
        long = "listen",
        short = 'l',
        env = "LOADSTREAM_LISTEN",
        default_value = DEFAULT_LISTEN
    )]
    pub listen: String,

    /// WebSocket route observers connect to
    #[arg(
        long = "path",
        env = "LOADSTREAM_PATH",
        default_value = DEFAULT_ROUTE,
        value_parser = parse_route_path
    )]
    pub route: String,

    /// Per-request timeout against the target (supports ms/s/m/h)
    #[arg(
        long = "request-timeout",
        env = "LOADSTREAM_REQUEST_TIMEOUT",
        default_value = "10s",
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Connect timeout against the target (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        env = "LOADSTREAM_CONNECT_TIMEOUT",
        default_value = "5s",
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Response status counted as a success
    #[arg(
        long = "expected-status",
        env = "LOADSTREAM_EXPECTED_STATUS",
        default_value_t = DEFAULT_EXPECTED_STATUS,
        value_parser = parse_status_code
    )]
    pub expected_status_code: u16,

    /// Largest request count a single run may ask for
    #[arg(
        long = "max-requests",
        env = "LOADSTREAM_MAX_REQUESTS",
        default_value = "1000000",
        value_parser = parse_positive_u64
    )]
    pub max_requests: PositiveU64,

    /// Largest worker count a single run may ask for
    #[arg(
        long = "max-concurrency",
        env = "LOADSTREAM_MAX_CONCURRENCY",
        default_value = "1000",
        value_parser = parse_positive_usize
    )]
    pub max_concurrency: PositiveUsize,

    /// Path to a TOML or JSON config file
    #[arg(long = "config", short = 'c', env = "LOADSTREAM_CONFIG")]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,
}
