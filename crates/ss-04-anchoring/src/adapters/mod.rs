//! In-memory collaborators for standalone nodes and tests

pub mod contract;
pub mod content_store;

pub use content_store::InMemoryContentStore;
pub use contract::{ContractCall, InMemoryContractGateway};
