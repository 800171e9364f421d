//! Error types for the consensus subsystem

use super::BlockStage;
use shared_types::{short_hex, Address, Hash, ShardId, TransactionError};
use std::fmt;
use thiserror::Error;

/// Registry mutation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Validator already registered: {}", short_hex(.0))]
    Duplicate(Address),

    #[error("Invalid stake for {}: {reason}", short_hex(.address))]
    InvalidStake {
        address: Address,
        reason: &'static str,
    },

    #[error("Validator {} registered with an empty public key", short_hex(.0))]
    InvalidPublicKey(Address),

    #[error("Unknown validator: {}", short_hex(.0))]
    UnknownValidator(Address),

    #[error("Validator {} is no longer active", short_hex(.0))]
    Inactive(Address),

    #[error("Stake overflow for validator {}", short_hex(.0))]
    StakeOverflow(Address),
}

/// Proposer selection failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No active validators to select from")]
    NoEligibleValidators,

    #[error("Total active stake is zero")]
    ZeroTotalStake,

    #[error("Total active stake overflows")]
    StakeOverflow,
}

/// Why a block's link to the head was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkFault {
    ParentMismatch { expected: Hash, declared: Hash },
    ShardMismatch { expected: ShardId, declared: ShardId },
}

impl fmt::Display for LinkFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentMismatch { expected, declared } => write!(
                f,
                "parent {} does not match head {}",
                short_hex(declared),
                short_hex(expected)
            ),
            Self::ShardMismatch { expected, declared } => {
                write!(f, "addressed to shard {declared}, chain is shard {expected}")
            }
        }
    }
}

/// Block rejection reasons. Each maps to the pipeline stage it fired at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Too many transactions: {count} > {limit}")]
    TooManyTransactions { count: usize, limit: usize },

    #[error("Invalid transaction at index {index}: {source}")]
    InvalidTransaction {
        index: usize,
        source: TransactionError,
    },

    #[error("Proposer {} is not registered", short_hex(.0))]
    UnknownProposer(Address),

    #[error("Bad signature from proposer {}", short_hex(.0))]
    BadSignature(Address),

    #[error("Wrong proposer: expected {}, block declares {}", short_hex(.expected), short_hex(.declared))]
    WrongProposer { expected: Address, declared: Address },

    #[error("No eligible proposer: {0}")]
    NoEligibleProposer(SelectionError),

    #[error("Broken link: {0}")]
    BrokenLink(LinkFault),

    #[error("Stale height {declared}: head is already at {head}")]
    StaleHeight { head: u64, declared: u64 },

    #[error("Height gap: expected {expected}, got {declared}")]
    HeightGap { expected: u64, declared: u64 },

    #[error("Timestamp {declared} does not advance past parent {parent}")]
    TimestampRegression { parent: u64, declared: u64 },

    #[error("Timestamp {declared} is more than {max_drift}s ahead of {now}")]
    FutureTimestamp {
        declared: u64,
        now: u64,
        max_drift: u64,
    },

    #[error("Bad merkle root: computed {}, declared {}", short_hex(.computed), short_hex(.declared))]
    BadMerkleRoot { computed: Hash, declared: Hash },

    #[error("Chain of shard {0} is halted until recovered")]
    ChainHalted(ShardId),
}

impl ValidationError {
    /// The pipeline stage whose check failed.
    pub fn stage(&self) -> BlockStage {
        match self {
            Self::TooManyTransactions { .. } | Self::InvalidTransaction { .. } => {
                BlockStage::Proposed
            }
            Self::UnknownProposer(_) | Self::BadSignature(_) => BlockStage::SignatureChecked,
            Self::WrongProposer { .. } | Self::NoEligibleProposer(_) => BlockStage::ProposerEligible,
            Self::BrokenLink(_)
            | Self::StaleHeight { .. }
            | Self::HeightGap { .. }
            | Self::TimestampRegression { .. }
            | Self::FutureTimestamp { .. }
            | Self::ChainHalted(_) => BlockStage::LinkChecked,
            Self::BadMerkleRoot { .. } => BlockStage::Committed,
        }
    }

    /// Short label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TooManyTransactions { .. } => "too_many_transactions",
            Self::InvalidTransaction { .. } => "invalid_transaction",
            Self::UnknownProposer(_) => "unknown_proposer",
            Self::BadSignature(_) => "bad_signature",
            Self::WrongProposer { .. } => "wrong_proposer",
            Self::NoEligibleProposer(_) => "no_eligible_proposer",
            Self::BrokenLink(_) => "broken_link",
            Self::StaleHeight { .. } => "stale_height",
            Self::HeightGap { .. } => "height_gap",
            Self::TimestampRegression { .. } => "timestamp_regression",
            Self::FutureTimestamp { .. } => "future_timestamp",
            Self::BadMerkleRoot { .. } => "bad_merkle_root",
            Self::ChainHalted(_) => "chain_halted",
        }
    }
}

/// Transaction pool admission failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Invalid transaction: {0}")]
    Invalid(#[from] TransactionError),

    #[error("Transaction pool full ({capacity} pending)")]
    Full { capacity: usize },
}

/// Result type for block submission
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(
            ValidationError::BadSignature([1u8; 20]).stage(),
            BlockStage::SignatureChecked
        );
        assert_eq!(
            ValidationError::StaleHeight {
                head: 3,
                declared: 2
            }
            .stage(),
            BlockStage::LinkChecked
        );
        assert_eq!(
            ValidationError::BadMerkleRoot {
                computed: [0u8; 32],
                declared: [1u8; 32]
            }
            .stage(),
            BlockStage::Committed
        );
    }

    #[test]
    fn test_link_fault_display() {
        let err = ValidationError::BrokenLink(LinkFault::ShardMismatch {
            expected: 1,
            declared: 2,
        });
        assert_eq!(
            err.to_string(),
            "Broken link: addressed to shard 2, chain is shard 1"
        );
        assert_eq!(err.reason(), "broken_link");
    }
}
