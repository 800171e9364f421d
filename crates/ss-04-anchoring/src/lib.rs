//! # ss-04-anchoring
//!
//! Publishes ledger commitments to the external collaborators: the
//! content-addressed store holds each serialized commitment and a registry
//! contract on the settlement ledger records its content id.
//!
//! ```text
//! shared bus ──→ CommitmentAnchor ──→ ContentStore::add_data ──→ content id
//!                       │                                            │
//!                       └──→ ContractGateway::interact_with_contract ←┘
//!                                 (commitBlock | commitBatch | resolveBatch)
//! ```
//!
//! Both collaborators sit behind async ports. The ledger core only
//! publishes events; it never waits on anchoring.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{ContractCall, InMemoryContentStore, InMemoryContractGateway};
pub use domain::{AnchorConfig, AnchorError, Commitment, DEFAULT_REGISTRY_ABI};
pub use ports::{ContentStore, ContractGateway};
pub use service::{AnchorReceipt, CommitmentAnchor};
