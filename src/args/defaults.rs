use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("loadstream/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_ROUTE: &str = "/stress-test";
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_REQUESTS: u64 = 1_000_000;
pub const DEFAULT_MAX_CONCURRENCY: usize = 1_000;
