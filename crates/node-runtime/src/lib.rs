//! # Node Runtime Library
//!
//! Wires the Stakeshard subsystems into a runnable ledger node.
//!
//! ## Structure
//!
//! - `container/` - configuration and subsystem wiring
//! - `genesis/` - genesis validator sets
//! - `adapters/` - port implementations bridging subsystems
//! - `node` - the [`LedgerNode`] facade
//!
//! ## Event Flow
//!
//! ```text
//! ConsensusEngine ──┐
//! ShardingManager ──┼─→ BusBridge ─→ shared bus ─→ CommitmentAnchor
//! RollupProcessor ──┘                    │               │
//!                                        │               ↓
//!                                        │      ContentStore + ContractGateway
//!                                        ↓
//!                                  other subscribers
//! ```

pub mod adapters;
pub mod container;
pub mod genesis;
pub mod node;

pub use adapters::{BusBridge, ManualClock, ShardingStateProvider};
pub use container::{ConfigError, NodeConfig, SubsystemContainer};
pub use genesis::{parse_genesis_validators, DevGenesis, GenesisError};
pub use node::{BackgroundTasks, LedgerNode, NodeError};
