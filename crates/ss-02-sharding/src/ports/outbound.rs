//! # Outbound Ports

use serde::{Deserialize, Serialize};
use shared_types::{Hash, ShardId};

/// Shard lifecycle changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardEvent {
    Created { shard_id: ShardId, genesis_hash: Hash },
    Corrupted { shard_id: ShardId, first_invalid_height: u64 },
    Recovered { shard_id: ShardId, head_height: u64 },
}

/// Where shard lifecycle events go.
///
/// Block-level events are published by each shard's consensus engine
/// through its own `EventBus`.
pub trait ShardEventSink: Send + Sync {
    fn publish(&self, event: ShardEvent) -> Result<(), String>;
}
