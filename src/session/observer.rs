use async_trait::async_trait;
use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

use crate::engine::ObserverSink;
use crate::error::PublishError;

/// WebSocket observer: every payload becomes one text frame.
#[derive(Debug)]
pub struct WsObserver<S> {
    ws: WebSocketStream<S>,
}

impl<S> WsObserver<S> {
    #[must_use]
    pub const fn new(ws: WebSocketStream<S>) -> Self {
        Self { ws }
    }
}

#[async_trait]
impl<S> ObserverSink for WsObserver<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send_text(&mut self, payload: String) -> Result<(), PublishError> {
        self.ws.send(Message::Text(payload)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), PublishError> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "run complete".into(),
        };
        self.ws.send(Message::Close(Some(frame))).await?;
        Ok(())
    }
}
