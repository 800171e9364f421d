//! Events emitted by the batch processor

pub mod published;

pub use published::*;
