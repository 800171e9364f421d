//! # Domain Value Objects

use serde::{Deserialize, Serialize};
use shared_crypto::{build_merkle_proof, verify_merkle_proof, Keccak256Hasher, ProofNode};
use shared_types::{Hash, ShardId};

/// Head of one shard, as committed into the global root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardStateRoot {
    pub shard_id: ShardId,
    /// Hash of the shard's head block.
    pub state_root: Hash,
    pub height: u64,
}

impl ShardStateRoot {
    pub fn new(shard_id: ShardId, state_root: Hash, height: u64) -> Self {
        Self {
            shard_id,
            state_root,
            height,
        }
    }

    /// Merkle leaf binding the head to its shard id and height.
    pub fn leaf(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(self.shard_id.to_le_bytes())
            .update(self.height.to_le_bytes())
            .update(self.state_root);
        hasher.finalize()
    }
}

/// Merkle root over every shard head, ordered by shard id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStateRoot {
    pub root: Hash,
    pub shard_roots: Vec<ShardStateRoot>,
}

impl GlobalStateRoot {
    /// Inclusion proof for one shard's head.
    pub fn inclusion_proof(&self, shard_id: ShardId) -> Option<Vec<ProofNode>> {
        let index = self
            .shard_roots
            .binary_search_by_key(&shard_id, |r| r.shard_id)
            .ok()?;
        let leaves: Vec<Hash> = self.shard_roots.iter().map(ShardStateRoot::leaf).collect();
        build_merkle_proof(&leaves, index).ok()
    }

    pub fn verify_inclusion(&self, shard_root: &ShardStateRoot, proof: &[ProofNode]) -> bool {
        verify_merkle_proof(&shard_root.leaf(), proof, &self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_binds_shard_id() {
        let a = ShardStateRoot::new(0, [1u8; 32], 5);
        let b = ShardStateRoot::new(1, [1u8; 32], 5);
        assert_ne!(a.leaf(), b.leaf());
    }
}
