//! Rollup view of the sharded chain.

use std::sync::Arc;

use shared_types::ShardId;
use ss_01_consensus::{EventBus, SignatureVerifier};
use ss_02_sharding::ShardingManager;
use ss_03_rollup::{ShardAnchor, ShardStateProvider};

/// Anchors rollup batches to the current head of the sharding manager's chains.
pub struct ShardingStateProvider<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    sharding: Arc<ShardingManager<S, E>>,
}

impl<S, E> ShardingStateProvider<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    pub fn new(sharding: Arc<ShardingManager<S, E>>) -> Self {
        Self { sharding }
    }
}

impl<S, E> ShardStateProvider for ShardingStateProvider<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    fn shard_anchor(&self, shard_id: ShardId) -> Option<ShardAnchor> {
        let head = self.sharding.chain_head(shard_id).ok()?;
        Some(ShardAnchor {
            shard_id,
            height: head.height,
            head_hash: head.hash,
        })
    }
}
