//! Batches and their proofs

use super::{ApplyError, BatchError};
use serde::{Deserialize, Serialize};
use shared_crypto::{compute_merkle_root, hash_concat, Keccak256Hasher};
use shared_types::{BatchId, Hash, ShardId, Timestamp, Transaction};

const STATEMENT_DOMAIN: &[u8] = b"stakeshard/batch-statement";

/// Why a batch was rejected. Terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    ProofInvalid,
    Timeout,
    /// An earlier batch it was built on was rejected.
    ParentRejected,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProofInvalid => "proof_invalid",
            Self::Timeout => "timeout",
            Self::ParentRejected => "parent_rejected",
        }
    }
}

/// Batch lifecycle: `Pending → Verified | Rejected`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Pending,
    Verified,
    Rejected(RejectionReason),
}

impl BatchStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// `Ok` only for `Verified`; rejections become the matching error.
    pub fn into_result(self, batch_id: BatchId) -> Result<(), BatchError> {
        match self {
            Self::Verified => Ok(()),
            Self::Pending => Err(BatchError::OutOfOrder(batch_id)),
            Self::Rejected(RejectionReason::ProofInvalid) => Err(BatchError::ProofInvalid(batch_id)),
            Self::Rejected(RejectionReason::Timeout) => Err(BatchError::Timeout(batch_id)),
            Self::Rejected(RejectionReason::ParentRejected) => {
                Err(BatchError::ParentRejected(batch_id))
            }
        }
    }
}

/// Per-transaction result of applying a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxOutcome {
    Applied,
    Failed(ApplyError),
}

/// Shard head a batch was finalized against, held by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardAnchor {
    pub shard_id: ShardId,
    pub height: u64,
    pub head_hash: Hash,
}

/// What a batch proof attests to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatement {
    pub batch_id: BatchId,
    pub shard_id: ShardId,
    pub prior_state_root: Hash,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub anchor_hash: Hash,
}

impl BatchStatement {
    /// The message a prover signs.
    pub fn digest(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(STATEMENT_DOMAIN)
            .update(self.batch_id.to_le_bytes())
            .update(self.shard_id.to_le_bytes())
            .update(self.prior_state_root)
            .update(self.state_root)
            .update(self.transactions_root)
            .update(self.anchor_hash);
        hasher.finalize()
    }
}

/// Opaque proof bytes, interpreted by the configured `ProofVerifier`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProof(pub Vec<u8>);

impl BatchProof {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub shard_id: ShardId,
    pub transactions: Vec<Transaction>,
    /// One entry per transaction, same order
    pub outcomes: Vec<TxOutcome>,
    /// Rollup state this batch was applied on
    pub prior_state_root: Hash,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub anchor: ShardAnchor,
    pub created_at: Timestamp,
    pub status: BatchStatus,
    /// Rejected batch whose transactions this one carries again
    pub resubmission_of: Option<BatchId>,
}

impl Batch {
    pub fn statement(&self) -> BatchStatement {
        BatchStatement {
            batch_id: self.id,
            shard_id: self.shard_id,
            prior_state_root: self.prior_state_root,
            state_root: self.state_root,
            transactions_root: self.transactions_root,
            anchor_hash: self.anchor.head_hash,
        }
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, TxOutcome::Applied))
            .count()
    }
}

/// Merkle root over transaction hashes in order.
pub fn compute_transactions_root(transactions: &[Transaction]) -> Hash {
    let leaves: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
    compute_merkle_root(&leaves)
}

/// `keccak(transactions_root || accounts_root)`.
pub fn compute_state_root(transactions_root: &Hash, accounts_root: &Hash) -> Hash {
    hash_concat(transactions_root, accounts_root)
}
