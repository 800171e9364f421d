//! # Subsystem Container
//!
//! Node configuration and the container that wires subsystems together.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig};
pub use subsystems::{NodeAnchor, NodeRollup, NodeShardState, NodeSharding, SubsystemContainer};
