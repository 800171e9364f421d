//! Driven ports (Outbound dependencies)

use crate::domain::{BatchProof, BatchStatement, ShardAnchor};
use crate::events::{BatchFinalizedEvent, BatchResolvedEvent};
use shared_types::ShardId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Proof verification capability.
///
/// Decides whether `proof` attests to `statement`. The proof system is
/// opaque to the processor.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, statement: &BatchStatement, proof: &BatchProof) -> bool;
}

/// Read access to shard chain heads.
///
/// Returns `None` for shards that do not exist. The anchor is copied out;
/// the processor never holds a reference into a chain.
pub trait ShardStateProvider: Send + Sync {
    fn shard_anchor(&self, shard_id: ShardId) -> Option<ShardAnchor>;
}

/// Finalization and resolution callbacks towards the rest of the node.
pub trait EventBus: Send + Sync {
    fn publish_batch_finalized(&self, event: BatchFinalizedEvent) -> Result<(), String>;

    fn publish_batch_resolved(&self, event: BatchResolvedEvent) -> Result<(), String>;
}

/// Time source for batch ages and proof timeouts
pub trait TimeSource: Send + Sync {
    /// Current unix timestamp in seconds
    fn now(&self) -> u64;
}

pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Settable clock for tests.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    now: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) -> u64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
