//! Ports (hexagonal architecture)
//!
//! Capabilities the engine depends on; adapters live in `crate::adapters`.

pub mod outbound;

pub use outbound::*;
