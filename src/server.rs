//! TCP listener and WebSocket upgrade in front of the session controller.
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult, SessionError, ValidationError};
use crate::session::{SessionSettings, run_session};
use crate::shutdown::ShutdownSender;

#[derive(Clone)]
pub struct ServerSettings {
    /// Only upgrade requests for this path are accepted.
    pub route: String,
    pub session: Arc<SessionSettings>,
}

/// Binds the observer listener.
///
/// # Errors
///
/// Returns an error when `addr` is not a socket address or cannot be bound.
pub async fn bind(addr: &str) -> AppResult<TcpListener> {
    let socket_addr: SocketAddr = addr
        .trim()
        .parse()
        .map_err(|err| ValidationError::InvalidListenAddr {
            value: addr.to_owned(),
            source: err,
        })?;
    let listener = TcpListener::bind(socket_addr)
        .await
        .map_err(|err| AppError::Bind {
            addr: addr.to_owned(),
            source: err,
        })?;
    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts observers until shutdown fires, one task per connection.
pub async fn serve(listener: TcpListener, settings: ServerSettings, shutdown_tx: &ShutdownSender) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let settings = Arc::new(settings);
    info!("Accepting observers on route {}", settings.route);

    loop {
        let (stream, peer) = tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("Shutdown requested; no longer accepting observers.");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!("Failed to accept connection: {}", err);
                    continue;
                }
            },
        };
        let settings = Arc::clone(&settings);
        tokio::spawn(async move {
            handle_connection(stream, peer, &settings).await;
        });
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, settings: &ServerSettings) {
    let ws = match upgrade(stream, &settings.route).await {
        Ok(ws) => ws,
        Err(err) => {
            warn!("Rejected connection from {}: {}", peer, err);
            return;
        }
    };
    debug!("Observer connected from {}", peer);

    match run_session(ws, &settings.session).await {
        Ok(report) => info!(
            "Session with {} finished: {} ok, {} failed, {} updates delivered.",
            peer, report.result.success, report.result.failures, report.delivery.sent
        ),
        Err(err) if err.is_config_error() => {
            warn!("Session with {} ended before a run: {}", peer, err);
        }
        Err(err) => error!("Session with {} failed: {}", peer, err),
    }
}

async fn upgrade(
    stream: TcpStream,
    route: &str,
) -> Result<WebSocketStream<TcpStream>, SessionError> {
    let check_route = |request: &Request, response: Response| {
        let path = request.uri().path();
        if path == route {
            Ok(response)
        } else {
            Err(not_found(path))
        }
    };
    accept_hdr_async(stream, check_route)
        .await
        .map_err(|err| SessionError::Handshake {
            source: Box::new(err),
        })
}

fn not_found(path: &str) -> ErrorResponse {
    let mut response = ErrorResponse::new(Some(format!("No observer endpoint at {}", path)));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
