//! # Event Bus Bridge
//!
//! Every subsystem publishes through its own outbound port. The bridge
//! implements all of them on top of the shared [`InMemoryEventBus`], so
//! anchoring and any other subscriber see one ordered stream of
//! [`LedgerEvent`]s.

use std::sync::Arc;

use shared_bus::{InMemoryEventBus, LedgerEvent};
use ss_01_consensus::{
    BlockCommittedEvent, BlockRejectedEvent, EventBus as ConsensusEventBus, ValidatorSlashedEvent,
};
use ss_02_sharding::{ShardEvent, ShardEventSink};
use ss_03_rollup::{BatchFinalizedEvent, BatchResolvedEvent, EventBus as RollupEventBus};
use tracing::trace;

/// Publishes subsystem events onto the shared bus.
///
/// Publishing never fails: an event nobody is subscribed to is dropped.
#[derive(Clone)]
pub struct BusBridge {
    bus: Arc<InMemoryEventBus>,
}

impl BusBridge {
    pub fn new(bus: Arc<InMemoryEventBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    fn forward(&self, event: LedgerEvent) -> Result<(), String> {
        let receivers = self.bus.publish_now(event);
        trace!(receivers, "Event forwarded to bus");
        Ok(())
    }
}

impl ConsensusEventBus for BusBridge {
    fn publish_block_committed(&self, event: BlockCommittedEvent) -> Result<(), String> {
        self.forward(LedgerEvent::BlockCommitted {
            shard_id: event.shard_id,
            height: event.height,
            block_hash: event.block_hash,
            merkle_root: event.merkle_root,
            proposer: event.proposer,
            transaction_count: event.transaction_count,
        })
    }

    fn publish_block_rejected(&self, event: BlockRejectedEvent) -> Result<(), String> {
        self.forward(LedgerEvent::BlockRejected {
            shard_id: event.shard_id,
            height: event.height,
            block_hash: event.block_hash,
            stage: format!("{:?}", event.stage),
            reason: event.reason,
        })
    }

    fn publish_validator_slashed(&self, event: ValidatorSlashedEvent) -> Result<(), String> {
        let evidence = event.evidence;
        self.forward(LedgerEvent::ValidatorSlashed {
            shard_id: evidence.shard_id,
            validator: evidence.validator,
            height: evidence.height,
            committed_hash: evidence.committed_hash,
            conflicting_hash: evidence.conflicting_hash,
        })
    }
}

impl ShardEventSink for BusBridge {
    fn publish(&self, event: ShardEvent) -> Result<(), String> {
        self.forward(match event {
            ShardEvent::Created {
                shard_id,
                genesis_hash,
            } => LedgerEvent::ShardCreated {
                shard_id,
                genesis_hash,
            },
            ShardEvent::Corrupted {
                shard_id,
                first_invalid_height,
            } => LedgerEvent::ShardCorrupted {
                shard_id,
                first_invalid_height,
            },
            ShardEvent::Recovered {
                shard_id,
                head_height,
            } => LedgerEvent::ShardRecovered {
                shard_id,
                head_height,
            },
        })
    }
}

impl RollupEventBus for BusBridge {
    fn publish_batch_finalized(&self, event: BatchFinalizedEvent) -> Result<(), String> {
        self.forward(LedgerEvent::BatchFinalized {
            batch_id: event.batch_id,
            shard_id: event.shard_id,
            transaction_count: event.transaction_count,
            prior_state_root: event.prior_state_root,
            state_root: event.state_root,
            anchor_height: event.anchor_height,
            anchor_hash: event.anchor_hash,
        })
    }

    fn publish_batch_resolved(&self, event: BatchResolvedEvent) -> Result<(), String> {
        self.forward(LedgerEvent::BatchResolved {
            batch_id: event.batch_id,
            shard_id: event.shard_id,
            verified: event.rejection.is_none(),
            reason: event.rejection.map(|r| r.as_str().to_string()),
        })
    }
}
