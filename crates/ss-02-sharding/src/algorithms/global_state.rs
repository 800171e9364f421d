//! # Global State Root Computation
//!
//! Binary Merkle tree over shard heads sorted by shard id.

use crate::domain::{GlobalStateRoot, ShardStateRoot};
use shared_crypto::compute_merkle_root;
use shared_types::Hash;

/// Compute global state root from shard roots. Input order does not matter.
pub fn compute_global_state_root(shard_roots: &[ShardStateRoot]) -> GlobalStateRoot {
    let mut sorted = shard_roots.to_vec();
    sorted.sort_by_key(|r| r.shard_id);

    let leaves: Vec<Hash> = sorted.iter().map(ShardStateRoot::leaf).collect();
    GlobalStateRoot {
        root: compute_merkle_root(&leaves),
        shard_roots: sorted,
    }
}
