use std::fmt;

use tracing::{debug, warn};

/// Lifecycle of a session. Only moves forward, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingConfig,
    Running,
    Completed,
}

impl SessionState {
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (SessionState::AwaitingConfig, SessionState::Running)
                | (SessionState::Running, SessionState::Completed)
        )
    }

    /// Moves to `next` when that is the following state; otherwise stays put.
    pub fn advance(&mut self, next: Self) -> bool {
        if !self.can_advance_to(next) {
            warn!("Ignoring session transition {} -> {}.", self, next);
            return false;
        }
        debug!("Session {} -> {}.", self, next);
        *self = next;
        true
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::AwaitingConfig => "awaiting-config",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
        };
        f.write_str(name)
    }
}
