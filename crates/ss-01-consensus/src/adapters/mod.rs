//! Adapters implementing the outbound ports

pub mod ed25519;
pub mod event_bus;

pub use ed25519::{Ed25519BlockSigner, Ed25519SignatureVerifier};
pub use event_bus::InMemoryEventBus;
