//! # Node Configuration
//!
//! Built from `SS_*` environment variables on top of subsystem defaults.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `SS_SHARDS` | Comma-separated shard ids created at boot | `0` |
//! | `SS_MAX_BATCH_SIZE` | Transactions per rollup batch | 1000 |
//! | `SS_MAX_BATCH_AGE_SECS` | Oldest an open batch may get | 30 |
//! | `SS_PROOF_TIMEOUT_SECS` | Proof deadline for Pending batches | 600 |
//! | `SS_MAX_TXS_PER_BLOCK` | Block transaction limit | 10000 |
//! | `SS_BLOCK_REWARD` | Stake credited per committed block | 0 |
//! | `SS_GENESIS_VALIDATORS` | `hexaddr:stake:hexpubkey;...` | none |
//! | `SS_PROVER_KEYS` | Comma-separated hex Ed25519 prover keys | none |
//! | `SS_ANCHOR_REGISTRY` | Commitment registry contract address | zero address |

use crate::genesis::{parse_genesis_validators, GenesisError};
use shared_crypto::Ed25519PublicKey;
use shared_types::ShardId;
use ss_02_sharding::ShardingConfig;
use ss_03_rollup::RollupConfig;
use ss_04_anchoring::AnchorConfig;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Shards created at boot
    pub shards: Vec<ShardId>,
    /// Consensus parameters and seed validators for every shard
    pub sharding: ShardingConfig,
    pub rollup: RollupConfig,
    /// Keys whose attestations verify batch proofs
    pub prover_keys: Vec<Ed25519PublicKey>,
    pub anchor: AnchorConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            shards: vec![0],
            sharding: ShardingConfig::default(),
            rollup: RollupConfig::default(),
            prover_keys: Vec::new(),
            anchor: AnchorConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("At least one shard must be configured")]
    NoShards,

    #[error("Duplicate shard id {0}")]
    DuplicateShard(ShardId),

    #[error("Batch size must be positive")]
    ZeroBatchSize,

    #[error("Proof timeout must be positive")]
    ZeroProofTimeout,

    #[error("Invalid genesis validator: {0}")]
    Genesis(#[from] GenesisError),

    #[error("Invalid prover key {0:?}")]
    InvalidProverKey(String),
}

impl NodeConfig {
    pub fn for_testing() -> Self {
        Self {
            shards: vec![0, 1],
            sharding: ShardingConfig::for_testing(),
            rollup: RollupConfig::for_testing(),
            prover_keys: Vec::new(),
            anchor: AnchorConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("SS_SHARDS") {
            config.shards = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_value("SS_SHARDS", s))
                .collect::<Result<_, _>>()?;
        }

        let rollup = &mut config.rollup;
        read(&lookup, "SS_MAX_BATCH_SIZE", &mut rollup.max_batch_size)?;
        read(&lookup, "SS_MAX_BATCH_AGE_SECS", &mut rollup.max_batch_age_secs)?;
        read(&lookup, "SS_PROOF_TIMEOUT_SECS", &mut rollup.proof_timeout_secs)?;

        let consensus = &mut config.sharding.consensus;
        read(&lookup, "SS_MAX_TXS_PER_BLOCK", &mut consensus.max_txs_per_block)?;
        read(&lookup, "SS_BLOCK_REWARD", &mut consensus.block_reward)?;

        if let Some(raw) = lookup("SS_GENESIS_VALIDATORS") {
            config.sharding.seed_validators = parse_genesis_validators(&raw)?;
        }
        if let Some(raw) = lookup("SS_PROVER_KEYS") {
            config.prover_keys = parse_prover_keys(&raw)?;
        }
        if let Some(address) = lookup("SS_ANCHOR_REGISTRY") {
            config.anchor.registry_address = address;
        }
        Ok(config)
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shards.is_empty() {
            return Err(ConfigError::NoShards);
        }
        let mut seen = std::collections::BTreeSet::new();
        for id in &self.shards {
            if !seen.insert(*id) {
                return Err(ConfigError::DuplicateShard(*id));
            }
        }
        if self.rollup.max_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.rollup.proof_timeout_secs == 0 {
            return Err(ConfigError::ZeroProofTimeout);
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

fn read<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(var) {
        *target = parse_value(var, &raw)?;
    }
    Ok(())
}

fn parse_prover_keys(raw: &str) -> Result<Vec<Ed25519PublicKey>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            let bytes = hex::decode(s.trim_start_matches("0x"))
                .map_err(|_| ConfigError::InvalidProverKey(s.to_string()))?;
            Ed25519PublicKey::from_slice(&bytes).map_err(|_| ConfigError::InvalidProverKey(s.to_string()))
        })
        .collect()
}
