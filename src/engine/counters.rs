use std::sync::atomic::{AtomicU64, Ordering};

/// Largest count either side of [`OutcomeCounters`] can hold.
pub const MAX_OUTCOME_COUNT: u64 = u32::MAX as u64;

const FAILURE_SHIFT: u32 = 32;
const SUCCESS_MASK: u64 = MAX_OUTCOME_COUNT;
const SUCCESS_ONE: u64 = 1;
const FAILURE_ONE: u64 = 1 << FAILURE_SHIFT;

/// Success and failure counts at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeSnapshot {
    pub success: u64,
    pub failures: u64,
}

impl OutcomeSnapshot {
    const fn unpack(packed: u64) -> Self {
        Self {
            success: packed & SUCCESS_MASK,
            failures: packed.wrapping_shr(FAILURE_SHIFT),
        }
    }

    #[must_use]
    pub const fn total(self) -> u64 {
        self.success.saturating_add(self.failures)
    }

    /// Returns whichever snapshot was taken later.
    ///
    /// Snapshots come from one atomic word whose halves only grow, so any two of
    /// them are ordered component-wise and the larger total is the later one.
    #[must_use]
    pub const fn latest(self, other: Self) -> Self {
        if other.total() > self.total() {
            other
        } else {
            self
        }
    }
}

/// Run-wide success/failure counters shared by every worker.
///
/// Both counts live in a single `AtomicU64` (success in the low half, failures in
/// the high half) so an increment and the snapshot it yields are one atomic step
/// and a reader can never see a torn pair. Each half must stay at or below
/// [`MAX_OUTCOME_COUNT`]; run validation caps the request count accordingly.
#[derive(Debug, Default)]
pub struct OutcomeCounters {
    packed: AtomicU64,
}

impl OutcomeCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            packed: AtomicU64::new(0),
        }
    }

    /// Counts one success and returns the counters as they stand right after it.
    pub fn record_success(&self) -> OutcomeSnapshot {
        self.add(SUCCESS_ONE)
    }

    /// Counts one failure and returns the counters as they stand right after it.
    pub fn record_failure(&self) -> OutcomeSnapshot {
        self.add(FAILURE_ONE)
    }

    #[must_use]
    pub fn snapshot(&self) -> OutcomeSnapshot {
        OutcomeSnapshot::unpack(self.packed.load(Ordering::Acquire))
    }

    fn add(&self, delta: u64) -> OutcomeSnapshot {
        let previous = self.packed.fetch_add(delta, Ordering::AcqRel);
        OutcomeSnapshot::unpack(previous.wrapping_add(delta))
    }
}
