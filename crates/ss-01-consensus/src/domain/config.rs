//! Consensus configuration

use serde::{Deserialize, Serialize};

/// Per-chain consensus parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Maximum transactions per block
    pub max_txs_per_block: usize,
    /// How far ahead of local time a block timestamp may be (seconds)
    pub max_future_drift_secs: u64,
    /// Stake credited to the proposer of each committed block
    pub block_reward: u128,
    /// Timestamp stamped into every shard's genesis block
    pub genesis_timestamp: u64,
    /// Maximum transactions waiting in the pool
    pub max_pending_transactions: usize,
    /// Committed heights kept for equivocation checks
    pub slashing_window: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            max_txs_per_block: 10_000,
            max_future_drift_secs: 60,
            block_reward: 0,
            genesis_timestamp: 0,
            max_pending_transactions: 100_000,
            slashing_window: 1024,
        }
    }
}

impl ConsensusConfig {
    /// Small limits for unit tests.
    pub fn for_testing() -> Self {
        Self {
            max_txs_per_block: 16,
            max_future_drift_secs: 60,
            block_reward: 0,
            genesis_timestamp: 1_000,
            max_pending_transactions: 64,
            slashing_window: 16,
        }
    }
}
