use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::trace;

use crate::args::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_USER_AGENT};

/// What came back from one request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A response arrived with this status code.
    Status(u16),
    /// The request did not finish within the request timeout.
    Timeout,
    /// No connection could be established.
    Connect,
    /// Any other transport-level error.
    Transport,
}

impl RequestOutcome {
    /// A request succeeds only when a response arrived with the expected status.
    #[must_use]
    pub const fn is_success(self, expected_status: u16) -> bool {
        matches!(self, RequestOutcome::Status(code) if code == expected_status)
    }
}

/// One load target. Every call issues exactly one request, with no retries.
#[async_trait]
pub trait Target: Send + Sync {
    async fn execute(&self) -> RequestOutcome;
}

/// Builds the target a run will hit from the observer-supplied URL.
pub trait TargetFactory: Send + Sync {
    /// Builds a target for `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying HTTP client cannot be built.
    fn build(&self, url: &Url) -> Result<Arc<dyn Target>, reqwest::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Plain `GET` against a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpTarget {
    client: Client,
    url: Url,
}

impl HttpTarget {
    /// Creates a target with its own connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(url: Url, settings: &TargetSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Target for HttpTarget {
    async fn execute(&self) -> RequestOutcome {
        match self.client.get(self.url.clone()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                // The request only completes once the whole body has arrived.
                match response.bytes().await {
                    Ok(_) => RequestOutcome::Status(status),
                    Err(err) if err.is_timeout() => RequestOutcome::Timeout,
                    Err(err) => {
                        trace!("Reading body from {} failed: {}", self.url, err);
                        RequestOutcome::Transport
                    }
                }
            }
            Err(err) if err.is_timeout() => RequestOutcome::Timeout,
            Err(err) if err.is_connect() => RequestOutcome::Connect,
            Err(err) => {
                trace!("Request to {} failed: {}", self.url, err);
                RequestOutcome::Transport
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTargetFactory {
    settings: TargetSettings,
}

impl HttpTargetFactory {
    #[must_use]
    pub const fn new(settings: TargetSettings) -> Self {
        Self { settings }
    }
}

impl TargetFactory for HttpTargetFactory {
    fn build(&self, url: &Url) -> Result<Arc<dyn Target>, reqwest::Error> {
        let target = HttpTarget::new(url.clone(), &self.settings)?;
        Ok(Arc::new(target))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};
    use std::thread;

    use super::*;
    use crate::error::{AppError, AppResult};

    fn spawn_one_shot_server(response: &'static [u8]) -> AppResult<(Url, thread::JoinHandle<()>)> {
        spawn_stalling_server(response, Duration::ZERO)
    }

    /// Writes `response`, then keeps the connection open for `stall` before closing.
    fn spawn_stalling_server(
        response: &'static [u8],
        stall: Duration,
    ) -> AppResult<(Url, thread::JoinHandle<()>)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let handle = thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                respond(stream, response, stall);
            }
        });
        let url = Url::parse(&format!("http://{}/", addr))
            .map_err(|err| AppError::validation(format!("Invalid test url: {}", err)))?;
        Ok((url, handle))
    }

    fn respond(mut stream: TcpStream, response: &[u8], stall: Duration) {
        let mut buffer = [0u8; 1024];
        if stream.read(&mut buffer).is_err() {
            return;
        }
        if stream.write_all(response).is_err() {
            return;
        }
        drop(stream.flush());
        if !stall.is_zero() {
            thread::sleep(stall);
        }
        drop(stream.shutdown(Shutdown::Both));
    }

    fn free_local_url() -> AppResult<Url> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        drop(listener);
        Url::parse(&format!("http://{}/", addr))
            .map_err(|err| AppError::validation(format!("Invalid test url: {}", err)))
    }

    #[test]
    fn only_expected_status_is_success() -> AppResult<()> {
        let cases = [
            (RequestOutcome::Status(200), true),
            (RequestOutcome::Status(201), false),
            (RequestOutcome::Status(503), false),
            (RequestOutcome::Timeout, false),
            (RequestOutcome::Connect, false),
            (RequestOutcome::Transport, false),
        ];
        for (outcome, expected) in cases {
            if outcome.is_success(200) != expected {
                return Err(AppError::validation(format!(
                    "Unexpected classification for {:?}",
                    outcome
                )));
            }
        }
        if !RequestOutcome::Status(204).is_success(204) {
            return Err(AppError::validation("Expected 204 to match a 204 target"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn http_target_reports_status() -> AppResult<()> {
        let (url, server) = spawn_one_shot_server(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\nbusy",
        )?;
        let target = HttpTarget::new(url, &TargetSettings::default())?;

        let outcome = target.execute().await;
        server
            .join()
            .map_err(|_err| AppError::validation("server thread panicked"))?;
        if outcome != RequestOutcome::Status(503) {
            return Err(AppError::validation(format!(
                "Unexpected outcome: {:?}",
                outcome
            )));
        }
        Ok(())
    }

    #[tokio::test]
    async fn truncated_body_is_a_failure() -> AppResult<()> {
        let (url, server) = spawn_one_shot_server(
            b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nshort",
        )?;
        let target = HttpTarget::new(url, &TargetSettings::default())?;

        let outcome = target.execute().await;
        server
            .join()
            .map_err(|_err| AppError::validation("server thread panicked"))?;
        if outcome.is_success(200) || outcome != RequestOutcome::Transport {
            return Err(AppError::validation(format!(
                "Expected a transport failure for a cut-off body, got {:?}",
                outcome
            )));
        }
        Ok(())
    }

    #[tokio::test]
    async fn body_stalling_past_the_timeout_is_a_timeout() -> AppResult<()> {
        let (url, server) = spawn_stalling_server(
            b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial",
            Duration::from_secs(2),
        )?;
        let target = HttpTarget::new(
            url,
            &TargetSettings {
                request_timeout: Duration::from_millis(300),
                connect_timeout: Duration::from_secs(1),
            },
        )?;

        let outcome = target.execute().await;
        server
            .join()
            .map_err(|_err| AppError::validation("server thread panicked"))?;
        if outcome != RequestOutcome::Timeout {
            return Err(AppError::validation(format!(
                "Expected a timeout for a stalled body, got {:?}",
                outcome
            )));
        }
        Ok(())
    }

    #[tokio::test]
    async fn http_target_reports_connect_failure() -> AppResult<()> {
        let url = free_local_url()?;
        let target = HttpTargetFactory::new(TargetSettings {
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        })
        .build(&url)?;

        let outcome = target.execute().await;
        if outcome.is_success(200) || matches!(outcome, RequestOutcome::Status(_)) {
            return Err(AppError::validation(format!(
                "Expected a transport failure, got {:?}",
                outcome
            )));
        }
        Ok(())
    }
}
