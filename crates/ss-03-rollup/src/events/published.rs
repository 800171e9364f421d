//! Published events (Outgoing)

use crate::domain::RejectionReason;
use serde::{Deserialize, Serialize};
use shared_types::{BatchId, Hash, ShardId};

/// Emitted when an accumulator is finalized into a Pending batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFinalizedEvent {
    pub batch_id: BatchId,
    pub shard_id: ShardId,
    pub transaction_count: usize,
    pub prior_state_root: Hash,
    pub state_root: Hash,
    pub anchor_height: u64,
    pub anchor_hash: Hash,
}

/// Emitted once per batch when it leaves Pending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResolvedEvent {
    pub batch_id: BatchId,
    pub shard_id: ShardId,
    /// `None` when verified
    pub rejection: Option<RejectionReason>,
}

impl BatchResolvedEvent {
    pub fn is_verified(&self) -> bool {
        self.rejection.is_none()
    }
}
