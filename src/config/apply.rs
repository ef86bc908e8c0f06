use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::parsers::{parse_duration_value, validate_route_path, validate_status_code};
use crate::args::{PositiveU64, PositiveUsize, ServerArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut ServerArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_explicit(matches, "listen")
        && let Some(listen) = config.listen.clone()
    {
        args.listen = listen;
    }

    if !is_explicit(matches, "route")
        && let Some(path) = config.path.as_deref()
    {
        args.route = validate_route_path(path).map_err(|err| invalid("path", err))?;
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.request_timeout.as_deref()
    {
        args.request_timeout =
            parse_duration_value(timeout).map_err(|err| invalid("request_timeout", err))?;
    }

    if !is_explicit(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_deref()
    {
        args.connect_timeout =
            parse_duration_value(timeout).map_err(|err| invalid("connect_timeout", err))?;
    }

    if !is_explicit(matches, "expected_status_code")
        && let Some(status) = config.expected_status
    {
        args.expected_status_code =
            validate_status_code(status).map_err(|err| invalid("expected_status", err))?;
    }

    if !is_explicit(matches, "max_requests")
        && let Some(max_requests) = config.max_requests
    {
        args.max_requests = PositiveU64::try_from(max_requests).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "max_requests",
                source: err,
            })
        })?;
    }

    if !is_explicit(matches, "max_concurrency")
        && let Some(max_concurrency) = config.max_concurrency
    {
        args.max_concurrency = PositiveUsize::try_from(max_concurrency).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "max_concurrency",
                source: err,
            })
        })?;
    }

    if !is_explicit(matches, "verbose")
        && let Some(verbose) = config.verbose
    {
        args.verbose = verbose;
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}

fn invalid(field: &'static str, source: crate::error::ValidationError) -> AppError {
    AppError::config(ConfigError::InvalidField { field, source })
}
