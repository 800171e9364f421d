//! # Adapters
//!
//! Port implementations that connect the subsystems to each other.

mod clock;
mod event_bus;
mod shard_state;

pub use clock::ManualClock;
pub use event_bus::BusBridge;
pub use shard_state::ShardingStateProvider;
