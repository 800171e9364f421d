//! # Subsystem Container
//!
//! Owns every subsystem instance and wires their outbound ports.
//!
//! ## Initialization Order
//!
//! ```text
//! shared bus ─→ BusBridge
//!                  │
//!                  ├─→ ShardingManager (consensus + shard events)
//!                  │        │
//!                  │        └─→ ShardingStateProvider
//!                  │                  │
//!                  └─→ RollupBatchProcessor (batch events, anchors)
//!
//! shared bus ─→ CommitmentAnchor (subscriber)
//! ```
//!
//! Subsystems never hold references to each other except through ports:
//! rollup reads chain heads through `ShardingStateProvider`, everything
//! else flows over the bus.

use std::sync::Arc;

use shared_bus::InMemoryEventBus;
use ss_01_consensus::Ed25519SignatureVerifier;
use ss_02_sharding::ShardingManager;
use ss_03_rollup::{ProverAttestationVerifier, RollupBatchProcessor, RollupDependencies};
use ss_04_anchoring::{CommitmentAnchor, InMemoryContentStore, InMemoryContractGateway};
use tracing::info;

use crate::adapters::{BusBridge, ManualClock, ShardingStateProvider};
use crate::container::config::NodeConfig;

pub type NodeSharding = ShardingManager<Ed25519SignatureVerifier, BusBridge>;

pub type NodeShardState = ShardingStateProvider<Ed25519SignatureVerifier, BusBridge>;

pub type NodeRollup = RollupBatchProcessor<ProverAttestationVerifier, NodeShardState, BusBridge>;

pub type NodeAnchor = CommitmentAnchor<InMemoryContractGateway, InMemoryContentStore>;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    pub config: NodeConfig,
    pub bus: Arc<InMemoryEventBus>,
    pub sharding: Arc<NodeSharding>,
    pub rollup: Arc<NodeRollup>,
    pub anchor: Arc<NodeAnchor>,
    /// Contract collaborator; in-memory until a chain client is plugged in.
    pub gateway: Arc<InMemoryContractGateway>,
    pub content_store: Arc<InMemoryContentStore>,
}

impl SubsystemContainer {
    /// Wire subsystems using the system clock.
    pub fn new(config: NodeConfig) -> Self {
        Self::build(config, None)
    }

    /// Wire subsystems with a shared manual clock driving both consensus
    /// timestamps and rollup deadlines.
    pub fn with_clock(config: NodeConfig, clock: Arc<ManualClock>) -> Self {
        Self::build(config, Some(clock))
    }

    fn build(config: NodeConfig, clock: Option<Arc<ManualClock>>) -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let bridge = Arc::new(BusBridge::new(Arc::clone(&bus)));

        let mut sharding = ShardingManager::new(
            config.sharding.clone(),
            Arc::new(Ed25519SignatureVerifier),
            Arc::clone(&bridge),
        )
        .with_shard_events(Arc::clone(&bridge) as _);
        if let Some(clock) = &clock {
            sharding = sharding.with_time_source(Arc::clone(clock) as _);
        }
        let sharding = Arc::new(sharding);
        info!(max_shards = config.sharding.max_shards, "[node] Sharding manager ready");

        let mut rollup = RollupBatchProcessor::new(RollupDependencies {
            verifier: Arc::new(ProverAttestationVerifier::new(config.prover_keys.iter().cloned())),
            shard_state: Arc::new(ShardingStateProvider::new(Arc::clone(&sharding))),
            event_bus: Arc::clone(&bridge),
            config: config.rollup.clone(),
        });
        if let Some(clock) = &clock {
            rollup = rollup.with_time_source(Arc::clone(clock) as _);
        }
        let rollup = Arc::new(rollup);
        info!(
            provers = config.prover_keys.len(),
            max_batch_size = config.rollup.max_batch_size,
            "[node] Rollup processor ready"
        );

        let gateway = Arc::new(InMemoryContractGateway::new());
        let content_store = Arc::new(InMemoryContentStore::new());
        let anchor = Arc::new(CommitmentAnchor::new(
            config.anchor.clone(),
            Arc::clone(&gateway),
            Arc::clone(&content_store),
            Arc::clone(&bus),
        ));

        Self {
            config,
            bus,
            sharding,
            rollup,
            anchor,
            gateway,
            content_store,
        }
    }
}
