//! Clock shared by consensus and rollup.

use std::sync::atomic::{AtomicU64, Ordering};

use ss_01_consensus::TimeSource as ConsensusTimeSource;
use ss_03_rollup::TimeSource as RollupTimeSource;

/// Manually driven clock, in unix seconds.
///
/// One instance can be handed to both subsystems so block timestamps,
/// batch ages and proof deadlines advance together.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Returns the new time.
    pub fn advance(&self, secs: u64) -> u64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }

    pub fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl ConsensusTimeSource for ManualClock {
    fn now(&self) -> u64 {
        ManualClock::now(self)
    }
}

impl RollupTimeSource for ManualClock {
    fn now(&self) -> u64 {
        ManualClock::now(self)
    }
}
