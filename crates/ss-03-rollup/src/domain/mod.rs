//! Rollup domain types and rules

pub mod accumulator;
pub mod batch;
pub mod config;
pub mod error;
pub mod ledger;

pub use accumulator::*;
pub use batch::*;
pub use config::*;
pub use error::*;
pub use ledger::*;
