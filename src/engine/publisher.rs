use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::PublishError;
use crate::protocol::ProgressMessage;

use super::counters::OutcomeSnapshot;
use super::samples::Sample;

/// Counters right after one request, plus the sample that request produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub outcome: OutcomeSnapshot,
    pub sample: Sample,
}

/// Write side of the observer connection.
#[async_trait]
pub trait ObserverSink: Send {
    /// Writes one complete text message.
    ///
    /// # Errors
    ///
    /// Returns an error when the observer can no longer be written to.
    async fn send_text(&mut self, payload: String) -> Result<(), PublishError>;

    /// Closes the connection after the last message.
    ///
    /// # Errors
    ///
    /// Returns an error when the close cannot be delivered.
    async fn close(&mut self) -> Result<(), PublishError>;
}

/// What the publishing task managed to deliver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub sent: u64,
    pub dropped: u64,
    pub disconnected: bool,
}

/// Worker-side handle for pushing progress to the observer.
///
/// `publish` only enqueues; the single publishing task owns the sink, so writes
/// never interleave and a slow observer never stalls a worker.
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressPublisher {
    pub fn publish(&self, update: ProgressUpdate) {
        if self.tx.send(update).is_err() {
            debug!("Progress publisher already stopped; dropping update.");
        }
    }
}

/// Starts the publishing task for `sink`.
///
/// The task runs until every [`ProgressPublisher`] clone is dropped, then hands
/// the sink back together with its delivery stats.
#[must_use]
pub fn spawn_publisher<W>(sink: W) -> (ProgressPublisher, JoinHandle<(W, DeliveryStats)>)
where
    W: ObserverSink + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_publisher(sink, rx));
    (ProgressPublisher { tx }, handle)
}

async fn run_publisher<W>(
    mut sink: W,
    mut rx: mpsc::UnboundedReceiver<ProgressUpdate>,
) -> (W, DeliveryStats)
where
    W: ObserverSink,
{
    let mut stats = DeliveryStats::default();
    let mut latest = OutcomeSnapshot::default();

    while let Some(update) = rx.recv().await {
        if stats.disconnected {
            stats.dropped = stats.dropped.saturating_add(1);
            continue;
        }

        // Updates from different workers can arrive out of order; always report
        // the newest counters so the observer never sees them go backwards.
        latest = latest.latest(update.outcome);
        match send_progress(&mut sink, latest, &update.sample).await {
            Ok(()) => stats.sent = stats.sent.saturating_add(1),
            Err(err) => {
                warn!(
                    "Observer write failed, dropping further progress updates: {}",
                    err
                );
                stats.disconnected = true;
                stats.dropped = stats.dropped.saturating_add(1);
            }
        }
    }

    if stats.dropped > 0 {
        warn!(
            "Dropped {} progress updates after the observer disconnected.",
            stats.dropped
        );
    }
    debug!("Progress publisher sent {} updates.", stats.sent);
    (sink, stats)
}

async fn send_progress<W>(
    sink: &mut W,
    outcome: OutcomeSnapshot,
    sample: &Sample,
) -> Result<(), PublishError>
where
    W: ObserverSink,
{
    let message = ProgressMessage::new(outcome, sample);
    let payload = serde_json::to_string(&message).map_err(|err| PublishError::Serialize {
        context: "progress update",
        source: err,
    })?;
    sink.send_text(payload).await
}
