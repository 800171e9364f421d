//! # ss-01-consensus
//!
//! Proof-of-stake consensus for a single chain instance.
//!
//! ## Architecture
//!
//! Every submitted block walks a fixed pipeline and either reaches
//! `Committed` or stops at the first failing stage:
//!
//! ```text
//! Proposed ──→ SignatureChecked ──→ ProposerEligible ──→ LinkChecked ──→ Committed
//!    │                │                    │                  │              │
//!    └────────────────┴────────────────────┴──────────────────┴──→ Rejected ←┘
//! ```
//!
//! - **SignatureChecked**: the header hash is verified against the proposer's
//!   registered key through the pluggable [`SignatureVerifier`].
//! - **ProposerEligible**: [`StakeWeightedSelector`] is re-run over a fresh
//!   [`RegistrySnapshot`] with the seed derived from the block's height and
//!   parent hash; the result must be the declared proposer.
//! - **LinkChecked**: parent hash, height, shard id and timestamp against the
//!   current head.
//! - **Committed**: the merkle root is recomputed, the block appended and the
//!   proposer rewarded, all under the chain lock.
//!
//! A rejected block leaves the chain untouched. A proposer whose second,
//! validly signed block at an already committed height is seen gets slashed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ss_01_consensus::{ConsensusEngine, ConsensusConfig, ConsensusDependencies};
//!
//! let engine = ConsensusEngine::new(0, registry, ConsensusDependencies {
//!     verifier: Arc::new(Ed25519SignatureVerifier),
//!     event_bus: Arc::new(InMemoryEventBus::new()),
//!     config: ConsensusConfig::default(),
//! });
//! let receipt = engine.submit_block(block)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod validation;

// Re-export main types
pub use adapters::{Ed25519BlockSigner, Ed25519SignatureVerifier, InMemoryEventBus};
pub use domain::{
    derive_seed, AuditFault, Block, BlockHeader, BlockStage, Chain, ChainAudit, ChainHead,
    CommitReceipt, ConsensusConfig, EquivocationEvidence, LinkFault, PoolError, RegistrationError,
    RegistrySnapshot, RemovalReason, SelectionError, SlashingDB, SnapshotEntry,
    StakeWeightedSelector, TransactionPool, ValidationError, Validator, ValidatorRegistry,
    ValidatorStatus,
};
pub use events::{BlockCommittedEvent, BlockRejectedEvent, ValidatorSlashedEvent};
pub use ports::{BlockSigner, EventBus, ManualTimeSource, SignatureVerifier, SystemTimeSource, TimeSource};
pub use service::{ConsensusDependencies, ConsensusEngine};
pub use validation::BlockValidator;
