//! Rollup configuration

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupConfig {
    /// Transactions per batch; a full accumulator finalizes immediately
    pub max_batch_size: usize,
    /// Oldest an open accumulator may get before it is finalized (seconds)
    pub max_batch_age_secs: u64,
    /// How long a Pending batch may wait for its proof (seconds)
    pub proof_timeout_secs: u64,
    /// Background sweep period (milliseconds)
    pub sweep_interval_ms: u64,
}

impl Default for RollupConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1_000,
            max_batch_age_secs: 30,
            proof_timeout_secs: 600,
            sweep_interval_ms: 1_000,
        }
    }
}

impl RollupConfig {
    pub fn for_testing() -> Self {
        Self {
            max_batch_size: 4,
            max_batch_age_secs: 10,
            proof_timeout_secs: 60,
            sweep_interval_ms: 10,
        }
    }
}
