//! Anchoring domain types

pub mod commitment;
pub mod config;
pub mod error;

pub use commitment::*;
pub use config::*;
pub use error::*;
