use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::info;

use crate::args::ServerArgs;
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::server::{ServerSettings, bind, serve};
use crate::session::SessionSettings;
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

/// Parses arguments, applies the config file and serves observers until shutdown.
///
/// # Errors
///
/// Returns an error when arguments or the config file are invalid, the runtime
/// cannot start, or the listener cannot be bound.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

fn parse_args() -> AppResult<(ServerArgs, ArgMatches)> {
    let matches = ServerArgs::command().get_matches();
    let args = ServerArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

async fn run_async(args: ServerArgs) -> AppResult<()> {
    let listener = bind(&args.listen).await?;
    let settings = ServerSettings {
        route: args.route.clone(),
        session: Arc::new(SessionSettings::from_args(&args)),
    };

    let (shutdown_tx, _) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    serve(listener, settings, &shutdown_tx).await;

    signal_handle.abort();
    info!("Server stopped.");
    Ok(())
}
