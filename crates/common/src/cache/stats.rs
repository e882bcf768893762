//! Expiring store statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time counters for an expiring store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries currently held, including expired ones not yet swept
    pub entries: usize,

    /// Completed sweep passes (background and manual)
    pub sweeps: u64,

    /// Total entries removed by sweeps
    pub purged: u64,
}

/// Lock-free sweep counters shared with the background task
#[derive(Debug, Default)]
pub(crate) struct SweepCounters {
    sweeps: AtomicU64,
    purged: AtomicU64,
}

impl SweepCounters {
    pub(crate) fn record_sweep(&self, purged: usize) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
        self.purged.fetch_add(purged as u64, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize) -> StoreStats {
        StoreStats {
            entries,
            sweeps: self.sweeps.load(Ordering::Relaxed),
            purged: self.purged.load(Ordering::Relaxed),
        }
    }
}
