//! Event Bus adapter
//!
//! Records every published event in memory. Used standalone and in tests;
//! the node wires the engine to the shared bus instead.

use crate::events::{BlockCommittedEvent, BlockRejectedEvent, ValidatorSlashedEvent};
use crate::ports::EventBus;
use parking_lot::RwLock;

#[derive(Default)]
pub struct InMemoryEventBus {
    committed: RwLock<Vec<BlockCommittedEvent>>,
    rejected: RwLock<Vec<BlockRejectedEvent>>,
    slashed: RwLock<Vec<ValidatorSlashedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> Vec<BlockCommittedEvent> {
        self.committed.read().clone()
    }

    pub fn rejected(&self) -> Vec<BlockRejectedEvent> {
        self.rejected.read().clone()
    }

    pub fn slashed(&self) -> Vec<ValidatorSlashedEvent> {
        self.slashed.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.committed.read().len() + self.rejected.read().len() + self.slashed.read().len()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish_block_committed(&self, event: BlockCommittedEvent) -> Result<(), String> {
        self.committed.write().push(event);
        Ok(())
    }

    fn publish_block_rejected(&self, event: BlockRejectedEvent) -> Result<(), String> {
        self.rejected.write().push(event);
        Ok(())
    }

    fn publish_validator_slashed(&self, event: ValidatorSlashedEvent) -> Result<(), String> {
        self.slashed.write().push(event);
        Ok(())
    }
}
