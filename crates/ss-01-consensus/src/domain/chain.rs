//! Append-only chain of committed blocks

use super::{Block, BlockHeader};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, PublicKey, ShardId};

/// Current chain head information
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub height: u64,
    pub hash: Hash,
    pub timestamp: u64,
}

/// Why an audited block failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditFault {
    /// Stored block no longer hashes to the hash recorded at commit.
    HashMismatch,
    /// Genesis block differs from the shard's canonical genesis.
    GenesisMismatch,
    /// Parent hash does not match the previous block.
    BrokenLink,
    /// Height is not previous height + 1.
    HeightMismatch,
    /// Header names another shard.
    ShardMismatch,
    /// Signature does not verify under the proposer's registered key.
    BadSignature,
    /// Proposer has no registered key.
    UnknownProposer,
    /// Transactions no longer match the header's merkle root.
    BadMerkleRoot,
}

/// Result of re-verifying a chain from genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainAudit {
    pub shard_id: ShardId,
    /// Blocks audited, genesis included
    pub blocks_checked: u64,
    /// First failing block; it and every descendant are invalid
    pub first_invalid: Option<(u64, AuditFault)>,
}

impl ChainAudit {
    pub fn is_valid(&self) -> bool {
        self.first_invalid.is_none()
    }

    /// Heights invalidated by the first failure.
    pub fn invalid_heights(&self) -> std::ops::Range<u64> {
        match self.first_invalid {
            Some((height, _)) => height..self.blocks_checked,
            None => 0..0,
        }
    }

    /// Highest height still trusted, if any block is.
    pub fn last_valid_height(&self) -> Option<u64> {
        match self.first_invalid {
            Some((0, _)) => None,
            Some((height, _)) => Some(height - 1),
            None => self.blocks_checked.checked_sub(1),
        }
    }
}

/// Committed blocks of one shard, starting at genesis.
///
/// Each block's hash is recorded when it is appended so later mutation of the
/// stored block can be detected. A halted chain accepts no blocks until it
/// is truncated.
#[derive(Clone, Debug)]
pub struct Chain {
    shard_id: ShardId,
    genesis_hash: Hash,
    blocks: Vec<Block>,
    hashes: Vec<Hash>,
    halted: bool,
}

impl Chain {
    pub fn new(shard_id: ShardId, genesis_timestamp: u64) -> Self {
        let genesis = Block::genesis(shard_id, genesis_timestamp);
        let genesis_hash = genesis.hash();
        Self {
            shard_id,
            genesis_hash,
            blocks: vec![genesis],
            hashes: vec![genesis_hash],
            halted: false,
        }
    }

    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    fn head_block(&self) -> &Block {
        // Genesis is never truncated away, so `blocks` is never empty.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn head(&self) -> ChainHead {
        let block = self.head_block();
        ChainHead {
            height: block.header.height,
            hash: self.hashes[self.hashes.len() - 1],
            timestamp: block.header.timestamp,
        }
    }

    pub fn head_header(&self) -> &BlockHeader {
        &self.head_block().header
    }

    pub fn height(&self) -> u64 {
        self.head_block().header.height
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_at(&self, height: u64) -> Option<&Block> {
        self.blocks.get(usize::try_from(height).ok()?)
    }

    pub fn hash_at(&self, height: u64) -> Option<Hash> {
        self.hashes.get(usize::try_from(height).ok()?).copied()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append an already validated block.
    pub(crate) fn append(&mut self, block: Block) -> Hash {
        let hash = block.hash();
        self.blocks.push(block);
        self.hashes.push(hash);
        hash
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn halt(&mut self) {
        self.halted = true;
    }

    /// Drop every block above `height` and lift a halt. Genesis always
    /// survives.
    pub fn truncate(&mut self, height: u64) {
        let keep = usize::try_from(height).unwrap_or(usize::MAX).saturating_add(1).max(1);
        self.blocks.truncate(keep);
        self.hashes.truncate(keep);
        self.halted = false;
    }

    /// Mutable access to a stored block, for tamper-detection tests.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn block_mut(&mut self, height: u64) -> Option<&mut Block> {
        self.blocks.get_mut(usize::try_from(height).ok()?)
    }

    /// Re-verify every block from genesis.
    ///
    /// `verify` checks a signature over a header hash against a key;
    /// `key_of` resolves a proposer's registered key.
    pub fn audit<V, K>(&self, verify: V, key_of: K) -> ChainAudit
    where
        V: Fn(&Hash, &Block, &PublicKey) -> bool,
        K: Fn(&Address) -> Option<PublicKey>,
    {
        let first_invalid = self
            .blocks
            .iter()
            .enumerate()
            .find_map(|(idx, block)| {
                self.audit_block(idx, block, &verify, &key_of)
                    .err()
                    .map(|fault| (idx as u64, fault))
            });

        ChainAudit {
            shard_id: self.shard_id,
            blocks_checked: self.blocks.len() as u64,
            first_invalid,
        }
    }

    fn audit_block<V, K>(&self, idx: usize, block: &Block, verify: &V, key_of: &K) -> Result<(), AuditFault>
    where
        V: Fn(&Hash, &Block, &PublicKey) -> bool,
        K: Fn(&Address) -> Option<PublicKey>,
    {
        let hash = block.hash();
        if hash != self.hashes[idx] {
            return Err(AuditFault::HashMismatch);
        }

        if idx == 0 {
            if hash != self.genesis_hash || !block.header.is_genesis() {
                return Err(AuditFault::GenesisMismatch);
            }
            return Ok(());
        }

        let header = &block.header;
        if header.shard_id != self.shard_id {
            return Err(AuditFault::ShardMismatch);
        }
        if header.height != idx as u64 {
            return Err(AuditFault::HeightMismatch);
        }
        if header.previous_hash != self.hashes[idx - 1] {
            return Err(AuditFault::BrokenLink);
        }

        let key = key_of(&header.proposer).ok_or(AuditFault::UnknownProposer)?;
        if !verify(&hash, block, &key) {
            return Err(AuditFault::BadSignature);
        }

        if Block::compute_merkle_root(&block.transactions) != header.merkle_root {
            return Err(AuditFault::BadMerkleRoot);
        }
        Ok(())
    }
}
