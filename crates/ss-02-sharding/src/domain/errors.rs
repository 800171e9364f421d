//! # Domain Errors

use shared_types::ShardId;
use ss_01_consensus::{PoolError, RegistrationError, SelectionError, ValidationError};
use thiserror::Error;

/// Sharding error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    #[error("Unknown shard: {0}")]
    NotFound(ShardId),

    #[error("Shard {0} already exists")]
    DuplicateShard(ShardId),

    #[error("Shard limit of {max} reached")]
    ShardLimit { max: usize },

    /// Quarantined after a failed audit; refuses blocks until recovered.
    #[error("Shard {0} is corrupted")]
    Corrupted(ShardId),

    #[error("Shard {0} is not corrupted")]
    NotCorrupted(ShardId),

    /// Even the genesis block fails its audit.
    #[error("Shard {0} has no valid block to recover to")]
    Unrecoverable(ShardId),

    #[error("No shards to route to")]
    NoShards,

    #[error("Block rejected: {0}")]
    Rejected(#[from] ValidationError),

    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("Transaction refused: {0}")]
    Pool(#[from] PoolError),
}
