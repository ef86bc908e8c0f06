use super::parsers::{parse_duration_value, validate_route_path, validate_status_code};
use super::*;
use crate::error::{AppError, AppResult, ValidationError};
use clap::Parser;
use std::time::Duration;

fn parse_test_args<I, T>(args: I) -> AppResult<ServerArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    ServerArgs::try_parse_from(args)
        .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))
}

#[test]
fn parse_args_defaults() -> AppResult<()> {
    if std::env::vars().any(|(key, _)| key.starts_with("LOADSTREAM_")) {
        return Ok(());
    }
    let args = parse_test_args(["loadstream"])?;

    let checks = [
        (args.listen == DEFAULT_LISTEN, "Unexpected listen"),
        (args.route == DEFAULT_ROUTE, "Unexpected route"),
        (
            args.request_timeout == DEFAULT_REQUEST_TIMEOUT,
            "Unexpected request_timeout",
        ),
        (
            args.connect_timeout == DEFAULT_CONNECT_TIMEOUT,
            "Unexpected connect_timeout",
        ),
        (
            args.expected_status_code == DEFAULT_EXPECTED_STATUS,
            "Unexpected expected_status_code",
        ),
        (
            args.max_requests.get() == DEFAULT_MAX_REQUESTS,
            "Unexpected max_requests",
        ),
        (
            args.max_concurrency.get() == DEFAULT_MAX_CONCURRENCY,
            "Unexpected max_concurrency",
        ),
        (args.config.is_none(), "Expected config to be None"),
        (!args.verbose, "Expected verbose to be false"),
    ];
    for (ok, message) in checks {
        if !ok {
            return Err(AppError::validation(message));
        }
    }
    Ok(())
}

#[test]
fn parse_args_overrides() -> AppResult<()> {
    let args = parse_test_args([
        "loadstream",
        "--listen",
        "127.0.0.1:9000",
        "--path",
        "/ws",
        "--request-timeout",
        "750ms",
        "--connect-timeout",
        "2s",
        "--expected-status",
        "204",
        "--max-requests",
        "5000",
        "--max-concurrency",
        "64",
        "-v",
    ])?;

    if args.listen != "127.0.0.1:9000" {
        return Err(AppError::validation("Unexpected listen"));
    }
    if args.route != "/ws" {
        return Err(AppError::validation("Unexpected route"));
    }
    if args.request_timeout != Duration::from_millis(750) {
        return Err(AppError::validation("Unexpected request_timeout"));
    }
    if args.connect_timeout != Duration::from_secs(2) {
        return Err(AppError::validation("Unexpected connect_timeout"));
    }
    if args.expected_status_code != 204 {
        return Err(AppError::validation("Unexpected expected_status_code"));
    }
    if args.max_requests.get() != 5000 || args.max_concurrency.get() != 64 {
        return Err(AppError::validation("Unexpected run limits"));
    }
    if !args.verbose {
        return Err(AppError::validation("Expected verbose"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_limits() -> AppResult<()> {
    if ServerArgs::try_parse_from(["loadstream", "--max-concurrency", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero max-concurrency to fail"));
    }
    if ServerArgs::try_parse_from(["loadstream", "--max-requests", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero max-requests to fail"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_relative_route() -> AppResult<()> {
    if ServerArgs::try_parse_from(["loadstream", "--path", "stress-test"]).is_ok() {
        return Err(AppError::validation("Expected relative route to fail"));
    }
    match validate_route_path(" /stress-test ") {
        Ok(route) if route == "/stress-test" => Ok(()),
        Ok(route) => Err(AppError::validation(format!("Unexpected route {}", route))),
        Err(err) => Err(AppError::validation(format!("Unexpected error {}", err))),
    }
}

#[test]
fn status_code_range_is_enforced() -> AppResult<()> {
    if !matches!(
        validate_status_code(99),
        Err(ValidationError::InvalidStatusCode { value: 99 })
    ) {
        return Err(AppError::validation("Expected 99 to be rejected"));
    }
    if validate_status_code(200).is_err() || validate_status_code(599).is_err() {
        return Err(AppError::validation("Expected valid status codes"));
    }
    Ok(())
}

#[test]
fn duration_units_parse() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("3", Duration::from_secs(3)),
        ("3s", Duration::from_secs(3)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "Unexpected duration for {}: {:?}",
                input, parsed
            )));
        }
    }
    Ok(())
}

#[test]
fn duration_rejects_bad_input() -> AppResult<()> {
    if !matches!(parse_duration_value(""), Err(ValidationError::DurationEmpty)) {
        return Err(AppError::validation("Expected DurationEmpty"));
    }
    if !matches!(
        parse_duration_value("ms"),
        Err(ValidationError::InvalidDurationFormat { .. })
    ) {
        return Err(AppError::validation("Expected InvalidDurationFormat"));
    }
    if !matches!(
        parse_duration_value("5d"),
        Err(ValidationError::InvalidDurationUnit { .. })
    ) {
        return Err(AppError::validation("Expected InvalidDurationUnit"));
    }
    if !matches!(parse_duration_value("0ms"), Err(ValidationError::DurationZero)) {
        return Err(AppError::validation("Expected DurationZero"));
    }
    Ok(())
}

#[test]
fn positive_newtypes_reject_zero() -> AppResult<()> {
    if PositiveU64::try_from(0).is_ok() || PositiveUsize::try_from(0).is_ok() {
        return Err(AppError::validation("Expected zero to be rejected"));
    }
    let value: PositiveU64 = "42".parse()?;
    if value.get() != 42 {
        return Err(AppError::validation("Unexpected parsed value"));
    }
    Ok(())
}
