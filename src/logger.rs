use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. Later calls leave the first one in place.
///
/// The filter comes from `LOADSTREAM_LOG`, then `RUST_LOG`, then `info`
/// (`debug` when `verbose`).
pub fn init_logging(verbose: bool) {
    let filter = std::env::var("LOADSTREAM_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Global tracing subscriber already installed.");
    }
}
