//! Epoch stamps used to detect staleness without locking.
//!
//! Every stamp comes from an [`EpochClock`], which must hand out strictly
//! increasing values. Comparing two stamps is all the invalidation scheme ever
//! does: a holder is stale when its stamp is older than the one it depends on.
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Monotonically increasing version stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Epoch(pub u64);

impl Epoch {
    /// Older than anything a clock can produce.
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn is_older_than(self, other: Epoch) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Source of fresh epoch stamps.
///
/// Implementations must never return the same value twice and never go
/// backwards, even when called from several partitions at once.
pub trait EpochClock: Send + Sync {
    fn now(&self) -> Epoch;
}

/// Wall-clock microseconds, forced strictly increasing.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn wall_micros() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_micros() as u64)
            .unwrap_or(0)
    }
}

impl EpochClock for SystemClock {
    fn now(&self) -> Epoch {
        let wall = Self::wall_micros();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Epoch(next),
                Err(observed) => current = observed,
            }
        }
    }
}

/// Deterministic counter clock for tests and scripted replays.
#[derive(Debug)]
pub struct ManualClock {
    next: AtomicU64,
}

impl ManualClock {
    /// Starts handing out stamps at `start` (clamped to at least 1).
    pub fn starting_at(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start.max(1)),
        }
    }

    /// Returns the stamp the next call to [`EpochClock::now`] will produce.
    pub fn peek(&self) -> Epoch {
        Epoch(self.next.load(Ordering::Acquire))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl EpochClock for ManualClock {
    fn now(&self) -> Epoch {
        Epoch(self.next.fetch_add(1, Ordering::AcqRel))
    }
}
