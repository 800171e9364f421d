//! # Genesis Module
//!
//! Genesis validator sets: parsed from configuration, or generated from
//! deterministic seeds for development networks.

pub mod builder;

pub use builder::{parse_genesis_validators, DevGenesis, GenesisError};
