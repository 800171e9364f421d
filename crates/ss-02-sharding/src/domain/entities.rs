//! # Domain Entities

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{Address, PublicKey, ShardId};
use ss_01_consensus::{
    AuditFault, ChainAudit, ChainHead, ConsensusConfig, ConsensusEngine, EventBus,
    SignatureVerifier,
};

/// Validator registered in every newly created shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedValidator {
    pub address: Address,
    pub stake: u128,
    pub public_key: PublicKey,
}

/// Sharding configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShardingConfig {
    /// Maximum number of shards.
    pub max_shards: usize,
    /// Consensus parameters shared by every shard.
    pub consensus: ConsensusConfig,
    /// Initial validator set of each new shard.
    pub seed_validators: Vec<SeedValidator>,
}

impl Default for ShardingConfig {
    fn default() -> Self {
        Self {
            max_shards: 1024,
            consensus: ConsensusConfig::default(),
            seed_validators: Vec::new(),
        }
    }
}

impl ShardingConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_shards: 8,
            consensus: ConsensusConfig::for_testing(),
            seed_validators: Vec::new(),
        }
    }
}

/// Shard health.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShardHealth {
    Healthy,
    /// Failed an audit; refuses blocks until recovered.
    Corrupted { first_invalid_height: u64, fault: AuditFault },
}

impl ShardHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// A shard: its id, its engine (which owns the chain) and its health.
pub struct Shard<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    id: ShardId,
    engine: ConsensusEngine<S, E>,
    health: RwLock<ShardHealth>,
}

impl<S, E> Shard<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    pub fn new(id: ShardId, engine: ConsensusEngine<S, E>) -> Self {
        Self {
            id,
            engine,
            health: RwLock::new(ShardHealth::Healthy),
        }
    }

    pub fn id(&self) -> ShardId {
        self.id
    }

    pub fn engine(&self) -> &ConsensusEngine<S, E> {
        &self.engine
    }

    pub fn health(&self) -> ShardHealth {
        self.health.read().clone()
    }

    pub fn is_healthy(&self) -> bool {
        self.health.read().is_healthy()
    }

    /// Quarantine after a failed audit. Returns `true` on the transition
    /// from healthy.
    pub(crate) fn mark_corrupted(&self, first_invalid_height: u64, fault: AuditFault) -> bool {
        let mut health = self.health.write();
        let was_healthy = health.is_healthy();
        *health = ShardHealth::Corrupted {
            first_invalid_height,
            fault,
        };
        was_healthy
    }

    pub(crate) fn mark_healthy(&self) {
        *self.health.write() = ShardHealth::Healthy;
    }
}

/// Per-shard outcome of `validate_shards`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardReport {
    pub shard_id: ShardId,
    pub head: ChainHead,
    pub audit: ChainAudit,
}

impl ShardReport {
    pub fn is_valid(&self) -> bool {
        self.audit.is_valid()
    }

    /// Why the first bad block failed, if any did.
    pub fn reason(&self) -> Option<&AuditFault> {
        self.audit.first_invalid.as_ref().map(|(_, fault)| fault)
    }
}
