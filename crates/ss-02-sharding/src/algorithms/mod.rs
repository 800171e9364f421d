//! # Sharding Algorithms

pub mod global_state;
pub mod shard_assignment;

pub use global_state::compute_global_state_root;
pub use shard_assignment::rendezvous_assign;
