//! # Shared Crypto
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256 | Block, batch and state hashes |
//! | `merkle` | Keccak-256 binary tree | Transaction and account roots |
//! | `signatures` | Ed25519 | Block proposals, prover attestations, transfers |
//!
//! ## Merkle Convention
//!
//! An empty list commits to the zero hash, a single leaf is its own root and
//! an odd level duplicates its last node.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod merkle;
pub mod signatures;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{derive_address, hash_concat, keccak256, Keccak256Hasher};
pub use merkle::{build_merkle_proof, compute_merkle_root, verify_merkle_proof, Position, ProofNode};
pub use signatures::{
    verify_ed25519, verify_transaction, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
