//! # SS-02 Sharding
//!
//! Owns one consensus engine per shard and routes work to them.
//!
//! ## Purpose
//!
//! - Create shards, each with its own genesis block and validator set
//! - Forward block submissions to the owning shard's engine
//! - Audit every shard chain from genesis (in parallel) and quarantine
//!   shards whose stored blocks no longer verify
//! - Route transactions to a shard by rendezvous hashing of their primary
//!   account
//! - Summarize all shard heads in a global state root
//!
//! Shards share nothing but the id → shard map, which is only locked long
//! enough to clone the shard handle. Cross-shard atomicity is not provided;
//! every transaction lives on exactly one shard.
//!
//! ## Module Structure
//!
//! ```text
//! ss-02-sharding/
//! ├── domain/          # ShardingConfig, Shard, ShardReport, ShardError
//! ├── algorithms/      # Rendezvous assignment, global state root
//! ├── ports/           # Shard lifecycle event sink
//! ├── adapters/        # Sink implementations
//! └── service          # ShardingManager
//! ```

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{NoopShardEvents, RecordingShardEvents};
pub use algorithms::{compute_global_state_root, rendezvous_assign};
pub use domain::{
    GlobalStateRoot, SeedValidator, Shard, ShardError, ShardHealth, ShardReport, ShardStateRoot,
    ShardingConfig,
};
pub use ports::{ShardEvent, ShardEventSink};
pub use service::ShardingManager;
