use serde::Deserialize;

/// Server settings read from `loadstream.toml` / `loadstream.json`.
///
/// Every field mirrors a CLI flag; values given explicitly on the command line
/// or through the environment take precedence.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub listen: Option<String>,
    pub path: Option<String>,
    pub request_timeout: Option<String>,
    pub connect_timeout: Option<String>,
    pub expected_status: Option<u16>,
    pub max_requests: Option<u64>,
    pub max_concurrency: Option<usize>,
    pub verbose: Option<bool>,
}
