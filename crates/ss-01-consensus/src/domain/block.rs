//! Block domain entities

use serde::{Deserialize, Serialize};
use shared_crypto::{compute_merkle_root, Keccak256Hasher};
use shared_types::{Address, Hash, ShardId, Signature, Transaction, ZERO_HASH};

const HEADER_DOMAIN: &[u8] = b"stakeshard/block-header";

/// Block header. Its hash is what the proposer signs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub shard_id: ShardId,
    pub height: u64,
    pub previous_hash: Hash,
    /// Merkle root over the ordered transaction hashes
    pub merkle_root: Hash,
    pub timestamp: u64,
    pub proposer: Address,
}

impl BlockHeader {
    /// Compute the hash of this block header
    pub fn hash(&self) -> Hash {
        let mut hasher = Keccak256Hasher::new();
        hasher
            .update(HEADER_DOMAIN)
            .update(self.shard_id.to_le_bytes())
            .update(self.height.to_le_bytes())
            .update(self.previous_hash)
            .update(self.merkle_root)
            .update(self.timestamp.to_le_bytes())
            .update(self.proposer);
        hasher.finalize()
    }

    /// Check if this is a genesis header
    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.previous_hash == ZERO_HASH
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub signature: Signature,
}

impl Block {
    /// Unsigned genesis block for `shard_id`.
    pub fn genesis(shard_id: ShardId, timestamp: u64) -> Self {
        Self {
            header: BlockHeader {
                shard_id,
                height: 0,
                previous_hash: ZERO_HASH,
                merkle_root: ZERO_HASH,
                timestamp,
                proposer: [0u8; 20],
            },
            transactions: Vec::new(),
            signature: Signature::empty(),
        }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn height(&self) -> u64 {
        self.header.height
    }

    /// Merkle root over `transactions` in order.
    pub fn compute_merkle_root(transactions: &[Transaction]) -> Hash {
        let leaves: Vec<Hash> = transactions.iter().map(Transaction::hash).collect();
        compute_merkle_root(&leaves)
    }
}

/// Progress of a submitted block through the validation pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockStage {
    Proposed,
    SignatureChecked,
    ProposerEligible,
    LinkChecked,
    Committed,
}

/// Outcome of a successful submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub shard_id: ShardId,
    pub height: u64,
    pub block_hash: Hash,
}
