//! Commitments published for committed blocks and batches

use super::AnchorError;
use serde::{Deserialize, Serialize};
use shared_bus::LedgerEvent;
use shared_types::{BatchId, ShardId};

fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Record stored off-chain and referenced from the registry contract.
///
/// Digests are `0x`-prefixed hex so stored payloads stay readable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Commitment {
    Block {
        shard_id: ShardId,
        height: u64,
        block_hash: String,
        merkle_root: String,
        proposer: String,
        transaction_count: usize,
    },
    Batch {
        batch_id: BatchId,
        shard_id: ShardId,
        transaction_count: usize,
        prior_state_root: String,
        state_root: String,
        anchor_height: u64,
        anchor_hash: String,
    },
    Resolution {
        batch_id: BatchId,
        shard_id: ShardId,
        verified: bool,
        reason: Option<String>,
    },
}

impl Commitment {
    /// Commitment for an event, if the event is one that gets anchored.
    pub fn from_event(event: &LedgerEvent) -> Option<Self> {
        match event {
            LedgerEvent::BlockCommitted {
                shard_id,
                height,
                block_hash,
                merkle_root,
                proposer,
                transaction_count,
            } => Some(Self::Block {
                shard_id: *shard_id,
                height: *height,
                block_hash: hex0x(block_hash),
                merkle_root: hex0x(merkle_root),
                proposer: hex0x(proposer),
                transaction_count: *transaction_count,
            }),
            LedgerEvent::BatchFinalized {
                batch_id,
                shard_id,
                transaction_count,
                prior_state_root,
                state_root,
                anchor_height,
                anchor_hash,
            } => Some(Self::Batch {
                batch_id: *batch_id,
                shard_id: *shard_id,
                transaction_count: *transaction_count,
                prior_state_root: hex0x(prior_state_root),
                state_root: hex0x(state_root),
                anchor_height: *anchor_height,
                anchor_hash: hex0x(anchor_hash),
            }),
            LedgerEvent::BatchResolved {
                batch_id,
                shard_id,
                verified,
                reason,
            } => Some(Self::Resolution {
                batch_id: *batch_id,
                shard_id: *shard_id,
                verified: *verified,
                reason: reason.clone(),
            }),
            _ => None,
        }
    }

    /// Registry contract method recording this commitment.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Block { .. } => "commitBlock",
            Self::Batch { .. } => "commitBatch",
            Self::Resolution { .. } => "resolveBatch",
        }
    }

    /// Arguments for [`Self::method`], ending with the stored content id.
    pub fn contract_args(&self, content_id: &str) -> Vec<String> {
        let mut args = match self {
            Self::Block {
                shard_id,
                height,
                block_hash,
                ..
            } => vec![shard_id.to_string(), height.to_string(), block_hash.clone()],
            Self::Batch {
                batch_id,
                shard_id,
                state_root,
                ..
            } => vec![batch_id.to_string(), shard_id.to_string(), state_root.clone()],
            Self::Resolution {
                batch_id, verified, ..
            } => vec![batch_id.to_string(), verified.to_string()],
        };
        args.push(content_id.to_string());
        args
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AnchorError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnchorError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
