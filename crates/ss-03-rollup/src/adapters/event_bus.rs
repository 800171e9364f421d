//! Event Bus adapter
//!
//! Records published rollup events in memory.

use crate::events::{BatchFinalizedEvent, BatchResolvedEvent};
use crate::ports::EventBus;
use parking_lot::RwLock;

#[derive(Default)]
pub struct InMemoryEventBus {
    finalized: RwLock<Vec<BatchFinalizedEvent>>,
    resolved: RwLock<Vec<BatchResolvedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finalized(&self) -> Vec<BatchFinalizedEvent> {
        self.finalized.read().clone()
    }

    pub fn resolved(&self) -> Vec<BatchResolvedEvent> {
        self.resolved.read().clone()
    }
}

impl EventBus for InMemoryEventBus {
    fn publish_batch_finalized(&self, event: BatchFinalizedEvent) -> Result<(), String> {
        self.finalized.write().push(event);
        Ok(())
    }

    fn publish_batch_resolved(&self, event: BatchResolvedEvent) -> Result<(), String> {
        self.resolved.write().push(event);
        Ok(())
    }
}
