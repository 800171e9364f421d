//! Error types for the rollup subsystem

use serde::{Deserialize, Serialize};
use shared_types::{BatchId, ShardId, TransactionError};
use thiserror::Error;

/// Why an applied transaction left the ledger unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ApplyError {
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("Nonce mismatch: account at {expected}, transaction uses {actual}")]
    NonceMismatch { expected: u64, actual: u64 },

    #[error("Balance overflow")]
    BalanceOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("Unknown batch: {0}")]
    NotFound(BatchId),

    #[error("Submission of {count} transactions exceeds batch size {limit}")]
    Oversize { count: usize, limit: usize },

    #[error("Batch {0} rejected: proof invalid")]
    ProofInvalid(BatchId),

    #[error("Batch {0} rejected: proof timed out")]
    Timeout(BatchId),

    #[error("Batch {0} rejected: parent batch rejected")]
    ParentRejected(BatchId),

    #[error("Unknown shard: {0}")]
    UnknownShard(ShardId),

    #[error("Empty batch submission")]
    EmptyBatch,

    #[error("Invalid transaction at index {index}: {source}")]
    InvalidTransaction {
        index: usize,
        source: TransactionError,
    },

    /// An earlier batch of the same shard is still unresolved.
    #[error("Batch {0} does not extend the committed rollup state")]
    OutOfOrder(BatchId),

    #[error("Batch {0} is not rejected")]
    NotRejected(BatchId),
}

pub type BatchResult<T> = Result<T, BatchError>;
