//! Adapters implementing the outbound ports

pub mod attestation;
pub mod event_bus;
pub mod shard_state;

pub use attestation::{ProverAttestationVerifier, ProverAttestor, ATTESTATION_LEN};
pub use event_bus::InMemoryEventBus;
pub use shard_state::StaticShardState;
