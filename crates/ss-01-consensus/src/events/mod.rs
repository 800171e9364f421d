//! Events emitted by the consensus engine

pub mod published;

pub use published::*;
