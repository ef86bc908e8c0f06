use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::debug;

use crate::engine::{RunConfig, RunLimits};
use crate::error::SessionError;
use crate::protocol::RunConfigMessage;

/// Close-frame reasons are limited to 123 bytes by the WebSocket protocol.
const MAX_CLOSE_REASON: usize = 123;

/// Reads and validates the first data frame as the run config.
///
/// Ping and pong frames are skipped; a close frame or end of stream ends the
/// session before any run starts.
pub(super) async fn read_run_config<S>(
    ws: &mut WebSocketStream<S>,
    limits: &RunLimits,
) -> Result<RunConfig, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let text = loop {
        let frame = match ws.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                return Err(SessionError::ReadConfig {
                    source: Box::new(err),
                });
            }
            None => return Err(SessionError::ClosedBeforeConfig),
        };
        match frame {
            Message::Text(text) => break text,
            Message::Binary(bytes) => {
                break String::from_utf8(bytes)
                    .map_err(|err| SessionError::ConfigNotUtf8 { source: err })?;
            }
            Message::Close(_) => return Err(SessionError::ClosedBeforeConfig),
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    };

    let message: RunConfigMessage =
        serde_json::from_str(&text).map_err(|err| SessionError::DecodeConfig { source: err })?;
    message
        .into_run_config(limits)
        .map_err(|err| SessionError::RejectedConfig { source: err })
}

/// Closes the connection with a policy-violation code carrying `err`.
pub(super) async fn reject<S>(ws: &mut WebSocketStream<S>, err: &SessionError)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let frame = CloseFrame {
        code: CloseCode::Policy,
        reason: close_reason(err).into(),
    };
    if let Err(close_err) = ws.send(Message::Close(Some(frame))).await {
        debug!("Could not send close frame: {}", close_err);
    }
}

pub(super) fn close_reason(err: &SessionError) -> String {
    let mut reason = err.to_string();
    if reason.len() > MAX_CLOSE_REASON {
        let mut cut = MAX_CLOSE_REASON;
        while !reason.is_char_boundary(cut) {
            cut = cut.saturating_sub(1);
        }
        reason.truncate(cut);
    }
    reason
}
