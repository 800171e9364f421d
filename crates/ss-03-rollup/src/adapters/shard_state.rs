//! Fixed shard anchors, for standalone use and tests

use crate::domain::ShardAnchor;
use crate::ports::ShardStateProvider;
use parking_lot::RwLock;
use shared_types::{Hash, ShardId};
use std::collections::BTreeMap;

#[derive(Default)]
pub struct StaticShardState {
    anchors: RwLock<BTreeMap<ShardId, ShardAnchor>>,
}

impl StaticShardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shards at height 0 with their id repeated as the head hash.
    pub fn with_shards(ids: impl IntoIterator<Item = ShardId>) -> Self {
        let state = Self::new();
        for id in ids {
            state.set_head(id, 0, [id as u8; 32]);
        }
        state
    }

    pub fn set_head(&self, shard_id: ShardId, height: u64, head_hash: Hash) {
        self.anchors.write().insert(
            shard_id,
            ShardAnchor {
                shard_id,
                height,
                head_hash,
            },
        );
    }
}

impl ShardStateProvider for StaticShardState {
    fn shard_anchor(&self, shard_id: ShardId) -> Option<ShardAnchor> {
        self.anchors.read().get(&shard_id).copied()
    }
}
