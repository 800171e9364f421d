//! Driven ports (Outbound dependencies)

use crate::events::{BlockCommittedEvent, BlockRejectedEvent, ValidatorSlashedEvent};
use shared_types::{Address, PublicKey, Signature};
use std::sync::atomic::{AtomicU64, Ordering};

/// Signature verification capability.
///
/// The scheme (Ed25519, a lattice-based scheme, ...) lives entirely behind
/// this trait; key and signature bytes are opaque to the engine.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

/// Signing capability used when building blocks.
pub trait BlockSigner: Send + Sync {
    /// Validator address the signer proposes as.
    fn address(&self) -> Address;

    fn sign(&self, message: &[u8]) -> Signature;
}

/// Commit callback towards the rest of the node.
///
/// Called with the chain lock held; implementations must not block.
pub trait EventBus: Send + Sync {
    fn publish_block_committed(&self, event: BlockCommittedEvent) -> Result<(), String>;

    fn publish_block_rejected(&self, event: BlockRejectedEvent) -> Result<(), String>;

    fn publish_validator_slashed(&self, event: ValidatorSlashedEvent) -> Result<(), String>;
}

/// Time source for timestamp validation
pub trait TimeSource: Send + Sync {
    /// Get current unix timestamp in seconds
    fn now(&self) -> u64;
}

/// Default time source using system time
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Settable clock for tests and simulations.
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
