//! Published events (Outgoing)

use crate::domain::{BlockStage, EquivocationEvidence};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, ShardId};

/// Emitted after a block is appended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCommittedEvent {
    pub shard_id: ShardId,
    pub height: u64,
    pub block_hash: Hash,
    pub merkle_root: Hash,
    pub proposer: Address,
    pub transaction_count: usize,
    pub timestamp: u64,
}

/// Emitted when a submission stops short of `Committed`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRejectedEvent {
    pub shard_id: ShardId,
    pub height: u64,
    pub block_hash: Hash,
    pub stage: BlockStage,
    pub reason: String,
}

/// Emitted when an equivocating proposer is removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSlashedEvent {
    pub evidence: EquivocationEvidence,
}
