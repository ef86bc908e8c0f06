use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tracing::{info, warn};

use crate::args::ServerArgs;
use crate::engine::{
    DeliveryStats, HttpTargetFactory, ObserverSink, ResourceSampler, RunDeps, RunLimits,
    RunResult, SyntheticSampler, TargetFactory, TargetSettings, run_load, spawn_publisher,
};
use crate::error::{PublishError, SessionError};
use crate::metrics::RunSummary;
use crate::protocol::ResultMessage;

use super::observer::WsObserver;
use super::read::{read_run_config, reject};
use super::state::SessionState;

/// Everything a session needs that does not come from the observer.
#[derive(Clone)]
pub struct SessionSettings {
    pub limits: RunLimits,
    pub expected_status: u16,
    pub targets: Arc<dyn TargetFactory>,
    pub sampler: Arc<dyn ResourceSampler>,
}

impl SessionSettings {
    #[must_use]
    pub fn from_args(args: &ServerArgs) -> Self {
        let target_settings = TargetSettings {
            request_timeout: args.request_timeout,
            connect_timeout: args.connect_timeout,
        };
        Self {
            limits: RunLimits::new(args.max_requests, args.max_concurrency),
            expected_status: args.expected_status_code,
            targets: Arc::new(HttpTargetFactory::new(target_settings)),
            sampler: Arc::new(SyntheticSampler),
        }
    }
}

/// Outcome of a session that reached a run.
#[derive(Debug)]
pub struct SessionReport {
    pub result: RunResult,
    pub delivery: DeliveryStats,
}

/// Drives one observer connection from config to final result.
///
/// # Errors
///
/// Returns an error when the config cannot be read or is rejected (the
/// connection is closed and no run starts), when the HTTP client cannot be
/// built, or when the final result cannot be delivered.
pub async fn run_session<S>(
    mut ws: WebSocketStream<S>,
    settings: &SessionSettings,
) -> Result<SessionReport, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let mut state = SessionState::AwaitingConfig;

    let prepared = match read_run_config(&mut ws, &settings.limits).await {
        Ok(config) => settings
            .targets
            .build(config.target())
            .map(|target| (config, target))
            .map_err(|err| SessionError::BuildClient { source: err }),
        Err(err) => Err(err),
    };
    let (config, target) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            reject(&mut ws, &err).await;
            return Err(err);
        }
    };

    state.advance(SessionState::Running);
    info!(
        "Run accepted: {} requests, concurrency {}, target {}.",
        config.requests().get(),
        config.concurrency().get(),
        config.target()
    );

    let (publisher, publisher_task) = spawn_publisher(WsObserver::new(ws));
    let result = run_load(
        &config,
        RunDeps {
            target,
            sampler: Arc::clone(&settings.sampler),
            publisher,
            expected_status: settings.expected_status,
        },
    )
    .await;
    let (mut observer, delivery) = publisher_task
        .await
        .map_err(|err| SessionError::PublisherJoin { source: err })?;

    state.advance(SessionState::Completed);
    RunSummary::from_result(&result).log();

    send_result(&mut observer, &result)
        .await
        .map_err(|err| SessionError::SendResult { source: err })?;
    if let Err(err) = observer.close().await {
        warn!("Failed to close observer connection: {}", err);
    }

    Ok(SessionReport { result, delivery })
}

async fn send_result<W>(observer: &mut W, result: &RunResult) -> Result<(), PublishError>
where
    W: ObserverSink,
{
    let payload = serde_json::to_string(&ResultMessage::from(result)).map_err(|err| {
        PublishError::Serialize {
            context: "run result",
            source: err,
        }
    })?;
    observer.send_text(payload).await
}
