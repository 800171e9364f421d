//! # Shared Types Crate
//!
//! Identifiers, key and signature newtypes, account state and the
//! transaction variant used by every Stakeshard subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Validate at the Boundary**: Raw transaction bytes are decoded and
//!   validated by [`Transaction::decode`] before they reach any merkle-root or
//!   signature computation.
//! - **Scheme Agnostic Keys**: [`PublicKey`] and [`Signature`] carry raw bytes
//!   so the signature scheme can be swapped without touching block layout.

pub mod entities;
pub mod errors;
pub mod transaction;

pub use entities::*;
pub use errors::*;
pub use transaction::*;
