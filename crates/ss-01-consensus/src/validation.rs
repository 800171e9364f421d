//! Stateless block checks, one per pipeline stage.
//!
//! The engine runs them in order under its own locks; each returns the
//! first failure it finds.

use crate::domain::{
    derive_seed, Block, BlockHeader, ChainHead, ConsensusConfig, LinkFault, RegistrySnapshot,
    StakeWeightedSelector, ValidationError, ValidationResult,
};
use crate::ports::SignatureVerifier;
use shared_crypto::verify_transaction;
use shared_types::{PublicKey, ShardId};

/// Stateless validation logic for blocks.
pub struct BlockValidator;

impl BlockValidator {
    /// Transaction count, per-transaction well-formedness and transfer
    /// signatures.
    pub fn validate_structure(block: &Block, config: &ConsensusConfig) -> ValidationResult<()> {
        if block.transactions.len() > config.max_txs_per_block {
            return Err(ValidationError::TooManyTransactions {
                count: block.transactions.len(),
                limit: config.max_txs_per_block,
            });
        }

        for (index, tx) in block.transactions.iter().enumerate() {
            tx.validate()
                .and_then(|()| verify_transaction(tx))
                .map_err(|source| ValidationError::InvalidTransaction { index, source })?;
        }
        Ok(())
    }

    /// Signature over the header hash under the proposer's registered key.
    pub fn check_signature<S>(
        block: &Block,
        public_key: Option<&PublicKey>,
        verifier: &S,
    ) -> ValidationResult<()>
    where
        S: SignatureVerifier + ?Sized,
    {
        let proposer = block.header.proposer;
        let key = public_key.ok_or(ValidationError::UnknownProposer(proposer))?;
        if !verifier.verify(&block.hash(), &block.signature, key) {
            return Err(ValidationError::BadSignature(proposer));
        }
        Ok(())
    }

    /// The declared proposer must be the one selected for this height.
    pub fn check_proposer(header: &BlockHeader, snapshot: &RegistrySnapshot) -> ValidationResult<()> {
        let seed = derive_seed(header.height, &header.previous_hash);
        let expected = StakeWeightedSelector::select(snapshot, seed)
            .map_err(ValidationError::NoEligibleProposer)?;

        if expected.address != header.proposer {
            return Err(ValidationError::WrongProposer {
                expected: expected.address,
                declared: header.proposer,
            });
        }
        Ok(())
    }

    /// Shard, height, parent hash and timestamp against the current head.
    pub fn check_link(
        header: &BlockHeader,
        shard_id: ShardId,
        head: &ChainHead,
        now: u64,
        config: &ConsensusConfig,
    ) -> ValidationResult<()> {
        if header.shard_id != shard_id {
            return Err(ValidationError::BrokenLink(LinkFault::ShardMismatch {
                expected: shard_id,
                declared: header.shard_id,
            }));
        }

        if header.height <= head.height {
            return Err(ValidationError::StaleHeight {
                head: head.height,
                declared: header.height,
            });
        }

        let expected = head.height + 1;
        if header.height != expected {
            return Err(ValidationError::HeightGap {
                expected,
                declared: header.height,
            });
        }

        if header.previous_hash != head.hash {
            return Err(ValidationError::BrokenLink(LinkFault::ParentMismatch {
                expected: head.hash,
                declared: header.previous_hash,
            }));
        }

        if header.timestamp <= head.timestamp {
            return Err(ValidationError::TimestampRegression {
                parent: head.timestamp,
                declared: header.timestamp,
            });
        }

        if header.timestamp > now.saturating_add(config.max_future_drift_secs) {
            return Err(ValidationError::FutureTimestamp {
                declared: header.timestamp,
                now,
                max_drift: config.max_future_drift_secs,
            });
        }

        Ok(())
    }

    /// Header merkle root must commit to exactly these transactions.
    pub fn check_merkle_root(block: &Block) -> ValidationResult<()> {
        let computed = Block::compute_merkle_root(&block.transactions);
        if computed != block.header.merkle_root {
            return Err(ValidationError::BadMerkleRoot {
                computed,
                declared: block.header.merkle_root,
            });
        }
        Ok(())
    }
}
