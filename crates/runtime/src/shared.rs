//! Configuration handle shared by every session of one or more engines.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use scaling_core::{ConfigurationSnapshot, Epoch, EpochClock, SystemClock};

/// Current snapshot, global epoch, and the clock that stamps both.
///
/// The lock is only held to clone or swap the `Arc`; sessions keep whichever
/// snapshot they last synced against and notice a newer one by comparing the
/// global epoch with their own.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<Inner>,
}

struct Inner {
    snapshot: RwLock<Arc<ConfigurationSnapshot>>,
    global_epoch: AtomicU64,
    clock: Arc<dyn EpochClock>,
}

impl SharedConfig {
    /// Wraps `snapshot` using the wall clock.
    pub fn new(snapshot: ConfigurationSnapshot) -> Self {
        Self::with_clock(snapshot, Arc::new(SystemClock::new()))
    }

    pub fn with_clock(snapshot: ConfigurationSnapshot, clock: Arc<dyn EpochClock>) -> Self {
        let global = clock.now();
        Self {
            inner: Arc::new(Inner {
                snapshot: RwLock::new(Arc::new(snapshot)),
                global_epoch: AtomicU64::new(global.0),
                clock,
            }),
        }
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<ConfigurationSnapshot> {
        let guard = self
            .inner
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn global_epoch(&self) -> Epoch {
        Epoch(self.inner.global_epoch.load(Ordering::Acquire))
    }

    pub fn clock(&self) -> &dyn EpochClock {
        &*self.inner.clock
    }

    /// Publishes a new snapshot and advances the global epoch.
    ///
    /// The snapshot's generation is set one past the previous one. Returns the
    /// new generation.
    pub fn reload(&self, mut snapshot: ConfigurationSnapshot) -> u64 {
        let generation = {
            let mut guard = self
                .inner
                .snapshot
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            snapshot.generation = guard.generation + 1;
            let generation = snapshot.generation;
            *guard = Arc::new(snapshot);
            generation
        };
        let epoch = self.bump();
        info!(
            target: "runtime::engine",
            generation,
            %epoch,
            "configuration reloaded"
        );
        generation
    }

    /// Advances the global epoch so every session resyncs on its next callback.
    pub fn bump(&self) -> Epoch {
        let epoch = self.inner.clock.now();
        self.inner.global_epoch.fetch_max(epoch.0, Ordering::AcqRel);
        epoch
    }
}

impl std::fmt::Debug for SharedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedConfig")
            .field("generation", &self.snapshot().generation)
            .field("global_epoch", &self.global_epoch())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scaling_core::ManualClock;

    fn shared() -> SharedConfig {
        SharedConfig::with_clock(ConfigurationSnapshot::new(), Arc::new(ManualClock::default()))
    }

    #[test]
    fn reload_swaps_snapshot_and_advances_epoch() {
        let config = shared();
        let held = config.snapshot();
        let before = config.global_epoch();

        let generation = config.reload(ConfigurationSnapshot::new());

        assert_eq!(generation, held.generation + 1);
        assert_eq!(config.snapshot().generation, generation);
        assert!(!Arc::ptr_eq(&held, &config.snapshot()));
        assert!(before.is_older_than(config.global_epoch()));
    }

    #[test]
    fn clones_share_one_handle() {
        let config = shared();
        let other = config.clone();
        let epoch = other.bump();
        assert_eq!(config.global_epoch(), epoch);
    }
}
