//! # Ledger Events
//!
//! Every event that flows through the shared bus.

use serde::{Deserialize, Serialize};
use shared_types::{Address, BatchId, Hash, ShardId};

/// Subsystem identifiers used as event sources.
pub mod source {
    /// Consensus engine.
    pub const CONSENSUS: u8 = 1;
    /// Sharding manager.
    pub const SHARDING: u8 = 2;
    /// Rollup batch processor.
    pub const ROLLUP: u8 = 3;
    /// Commitment anchoring.
    pub const ANCHORING: u8 = 4;
}

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // CONSENSUS
    // =========================================================================
    /// A block was appended to a shard chain.
    BlockCommitted {
        shard_id: ShardId,
        height: u64,
        block_hash: Hash,
        merkle_root: Hash,
        proposer: Address,
        transaction_count: usize,
    },

    /// A block was refused.
    BlockRejected {
        shard_id: ShardId,
        height: u64,
        block_hash: Hash,
        /// Stage at which validation stopped.
        stage: String,
        reason: String,
    },

    /// A validator was removed for equivocating.
    ValidatorSlashed {
        shard_id: ShardId,
        validator: Address,
        height: u64,
        /// Hash of the committed block at `height`.
        committed_hash: Hash,
        /// Hash of the conflicting block the validator also signed.
        conflicting_hash: Hash,
    },

    // =========================================================================
    // SHARDING
    // =========================================================================
    /// A shard was created with its genesis block.
    ShardCreated { shard_id: ShardId, genesis_hash: Hash },

    /// A shard chain failed its integrity audit and was quarantined.
    ShardCorrupted {
        shard_id: ShardId,
        first_invalid_height: u64,
    },

    /// A corrupted shard was truncated back to its last valid block.
    ShardRecovered { shard_id: ShardId, head_height: u64 },

    // =========================================================================
    // ROLLUP
    // =========================================================================
    /// A batch was sealed and awaits proof verification.
    BatchFinalized {
        batch_id: BatchId,
        shard_id: ShardId,
        transaction_count: usize,
        prior_state_root: Hash,
        state_root: Hash,
        anchor_height: u64,
        anchor_hash: Hash,
    },

    /// A batch reached a terminal status.
    BatchResolved {
        batch_id: BatchId,
        shard_id: ShardId,
        verified: bool,
        /// Rejection reason, absent when verified.
        reason: Option<String>,
    },

    // =========================================================================
    // ANCHORING
    // =========================================================================
    /// A commitment was stored and submitted to the settlement contract.
    CommitmentAnchored {
        /// Contract method invoked.
        method: String,
        /// Content identifier returned by the content store.
        content_id: String,
        /// Receipt returned by the contract gateway.
        receipt: String,
    },

    /// Anchoring a commitment failed.
    AnchorFailed { method: String, error: String },

    /// The anchor fell behind the bus and never saw `missed` events.
    AnchorLagged { missed: u64 },

    // =========================================================================
    // CRITICAL EVENTS
    // =========================================================================
    /// Critical error requiring operator attention.
    CriticalError { subsystem_id: u8, error: String },
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BlockCommitted { .. }
            | Self::BlockRejected { .. }
            | Self::ValidatorSlashed { .. } => EventTopic::Consensus,
            Self::ShardCreated { .. }
            | Self::ShardCorrupted { .. }
            | Self::ShardRecovered { .. } => EventTopic::Sharding,
            Self::BatchFinalized { .. } | Self::BatchResolved { .. } => EventTopic::Rollup,
            Self::CommitmentAnchored { .. }
            | Self::AnchorFailed { .. }
            | Self::AnchorLagged { .. } => EventTopic::Anchoring,
            Self::CriticalError { .. } => EventTopic::DeadLetterQueue,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::BlockCommitted { .. }
            | Self::BlockRejected { .. }
            | Self::ValidatorSlashed { .. } => source::CONSENSUS,
            Self::ShardCreated { .. }
            | Self::ShardCorrupted { .. }
            | Self::ShardRecovered { .. } => source::SHARDING,
            Self::BatchFinalized { .. } | Self::BatchResolved { .. } => source::ROLLUP,
            Self::CommitmentAnchored { .. }
            | Self::AnchorFailed { .. }
            | Self::AnchorLagged { .. } => source::ANCHORING,
            Self::CriticalError { subsystem_id, .. } => *subsystem_id,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Consensus,
    Sharding,
    Rollup,
    Anchoring,
    /// Critical errors.
    DeadLetterQueue,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed() -> LedgerEvent {
        LedgerEvent::BlockCommitted {
            shard_id: 0,
            height: 1,
            block_hash: [1u8; 32],
            merkle_root: [2u8; 32],
            proposer: [3u8; 20],
            transaction_count: 2,
        }
    }

    fn resolved() -> LedgerEvent {
        LedgerEvent::BatchResolved {
            batch_id: 1,
            shard_id: 0,
            verified: true,
            reason: None,
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(committed().topic(), EventTopic::Consensus);
        assert_eq!(committed().source_subsystem(), source::CONSENSUS);
        assert_eq!(resolved().topic(), EventTopic::Rollup);
        assert_eq!(resolved().source_subsystem(), source::ROLLUP);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&committed()));
        assert!(EventFilter::topics(vec![EventTopic::All]).matches(&resolved()));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Consensus]);
        assert!(filter.matches(&committed()));
        assert!(!filter.matches(&resolved()));
    }

    #[test]
    fn test_filter_by_subsystem() {
        let filter = EventFilter::from_subsystems(vec![source::ROLLUP]);
        assert!(filter.matches(&resolved()));
        assert!(!filter.matches(&committed()));
    }

    #[test]
    fn test_critical_error_source_is_carried() {
        let event = LedgerEvent::CriticalError {
            subsystem_id: 9,
            error: "disk".into(),
        };
        assert_eq!(event.topic(), EventTopic::DeadLetterQueue);
        assert_eq!(event.source_subsystem(), 9);
    }

    #[test]
    fn test_events_serialize() {
        let json = serde_json::to_string(&committed()).unwrap();
        let back: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, committed());
    }
}
