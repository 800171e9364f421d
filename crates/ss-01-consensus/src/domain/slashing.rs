//! # Slashing Module - Equivocation Detection
//!
//! Selection is deterministic per (height, parent), so a second validly
//! signed block from the same proposer, on the same shard and parent as an
//! already committed block, can only be equivocation.
//!
//! ## Algorithm
//!
//! 1. Record (proposer, height) -> (block hash, parent) for every commit
//! 2. When a signed block for a committed height is refused, compare
//! 3. Same shard, same parent, different hash is evidence; the proposer is
//!    removed as `Slashed`
//!
//! Validators are shared between shards, so the same proposer legitimately
//! signs one block per shard at each height. A header naming another shard
//! is never evidence here.

use super::BlockHeader;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, ShardId};
use std::collections::HashMap;

/// Proof that a validator signed two blocks at one height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquivocationEvidence {
    pub shard_id: ShardId,
    pub validator: Address,
    pub height: u64,
    pub committed_hash: Hash,
    pub conflicting_hash: Hash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CommittedProposal {
    block_hash: Hash,
    previous_hash: Hash,
}

/// Committed proposals of one shard within the slashing window.
#[derive(Debug)]
pub struct SlashingDB {
    shard_id: ShardId,
    /// (proposer, height) -> committed proposal
    votes: HashMap<(Address, u64), CommittedProposal>,
    pending_slashings: Vec<EquivocationEvidence>,
    total_slashings: u64,
}

impl SlashingDB {
    pub fn new(shard_id: ShardId) -> Self {
        Self {
            shard_id,
            votes: HashMap::new(),
            pending_slashings: Vec::new(),
            total_slashings: 0,
        }
    }

    /// Remember a committed block.
    pub fn record_commit(&mut self, header: &BlockHeader, block_hash: Hash) {
        self.votes.insert(
            (header.proposer, header.height),
            CommittedProposal {
                block_hash,
                previous_hash: header.previous_hash,
            },
        );
    }

    /// Compare a refused, validly signed block with the committed one.
    ///
    /// Returns evidence when the same proposer committed a different block at
    /// the same height of this shard on top of the same parent.
    pub fn check_conflict(&mut self, header: &BlockHeader, block_hash: Hash) -> Option<EquivocationEvidence> {
        if header.shard_id != self.shard_id {
            return None;
        }
        let key = (header.proposer, header.height);
        let committed = *self.votes.get(&key)?;
        if committed.block_hash == block_hash || committed.previous_hash != header.previous_hash {
            // Resubmission, or a block that never competed with the commit
            return None;
        }

        let evidence = EquivocationEvidence {
            shard_id: self.shard_id,
            validator: header.proposer,
            height: header.height,
            committed_hash: committed.block_hash,
            conflicting_hash: block_hash,
        };
        // One slashing per validator and height
        self.votes.remove(&key);
        self.pending_slashings.push(evidence.clone());
        self.total_slashings += 1;
        Some(evidence)
    }

    /// Get pending slashings to broadcast.
    pub fn drain_pending(&mut self) -> Vec<EquivocationEvidence> {
        std::mem::take(&mut self.pending_slashings)
    }

    pub fn total_slashings(&self) -> u64 {
        self.total_slashings
    }

    pub fn has_vote(&self, proposer: Address, height: u64) -> bool {
        self.votes.contains_key(&(proposer, height))
    }

    /// Forget heights below `height` (garbage collection).
    pub fn prune_before(&mut self, height: u64) {
        self.votes.retain(|(_, h), _| *h >= height);
    }

    /// Forget heights at or above `height` (chain truncated).
    pub fn forget_from(&mut self, height: u64) {
        self.votes.retain(|(_, h), _| *h < height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(id: u8) -> Address {
        [id; 20]
    }

    fn block_hash(id: u8) -> Hash {
        [id; 32]
    }

    fn header(shard_id: ShardId, proposer: u8, height: u64, parent: u8) -> BlockHeader {
        BlockHeader {
            shard_id,
            height,
            previous_hash: [parent; 32],
            merkle_root: [0u8; 32],
            timestamp: 1_000 + height,
            proposer: validator(proposer),
        }
    }

    #[test]
    fn test_unknown_height_is_not_evidence() {
        let mut db = SlashingDB::new(0);
        assert!(db.check_conflict(&header(0, 1, 10, 9), block_hash(1)).is_none());
    }

    #[test]
    fn test_same_block_is_not_evidence() {
        let mut db = SlashingDB::new(0);
        db.record_commit(&header(0, 1, 10, 9), block_hash(0xAB));
        assert!(db.check_conflict(&header(0, 1, 10, 9), block_hash(0xAB)).is_none());
        assert_eq!(db.total_slashings(), 0);
    }

    #[test]
    fn test_conflicting_block_is_evidence_once() {
        let mut db = SlashingDB::new(2);
        db.record_commit(&header(2, 1, 10, 9), block_hash(0xAB));

        let evidence = db
            .check_conflict(&header(2, 1, 10, 9), block_hash(0xCD))
            .expect("evidence");
        assert_eq!(evidence.shard_id, 2);
        assert_eq!(evidence.committed_hash, block_hash(0xAB));
        assert_eq!(evidence.conflicting_hash, block_hash(0xCD));

        assert!(db.check_conflict(&header(2, 1, 10, 9), block_hash(0xEF)).is_none());
        assert_eq!(db.total_slashings(), 1);
        assert_eq!(db.drain_pending(), vec![evidence]);
        assert!(db.drain_pending().is_empty());
    }

    #[test]
    fn test_other_proposer_is_not_evidence() {
        let mut db = SlashingDB::new(0);
        db.record_commit(&header(0, 1, 10, 9), block_hash(0xAB));
        assert!(db.check_conflict(&header(0, 2, 10, 9), block_hash(0xCD)).is_none());
    }

    #[test]
    fn test_block_for_another_shard_is_not_evidence() {
        let mut db = SlashingDB::new(0);
        db.record_commit(&header(0, 1, 10, 9), block_hash(0xAB));
        assert!(db.check_conflict(&header(1, 1, 10, 9), block_hash(0xCD)).is_none());
        assert!(db.has_vote(validator(1), 10));
    }

    #[test]
    fn test_block_on_another_parent_is_not_evidence() {
        let mut db = SlashingDB::new(0);
        db.record_commit(&header(0, 1, 10, 9), block_hash(0xAB));
        assert!(db.check_conflict(&header(0, 1, 10, 7), block_hash(0xCD)).is_none());
        assert_eq!(db.total_slashings(), 0);
    }

    #[test]
    fn test_prune_and_forget() {
        let mut db = SlashingDB::new(0);
        for h in [5, 10, 15] {
            db.record_commit(&header(0, 1, h, 0), block_hash(h as u8));
        }

        db.prune_before(10);
        assert!(!db.has_vote(validator(1), 5));
        assert!(db.has_vote(validator(1), 10));

        db.forget_from(15);
        assert!(db.has_vote(validator(1), 10));
        assert!(!db.has_vote(validator(1), 15));
    }
}
