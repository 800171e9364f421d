//! Shard event sinks

use crate::ports::{ShardEvent, ShardEventSink};
use parking_lot::RwLock;

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopShardEvents;

impl ShardEventSink for NoopShardEvents {
    fn publish(&self, _event: ShardEvent) -> Result<(), String> {
        Ok(())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingShardEvents {
    events: RwLock<Vec<ShardEvent>>,
}

impl RecordingShardEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ShardEvent> {
        self.events.read().clone()
    }
}

impl ShardEventSink for RecordingShardEvents {
    fn publish(&self, event: ShardEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}
