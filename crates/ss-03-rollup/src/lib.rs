//! # ss-03-rollup
//!
//! Rollup batch processing: per-shard transaction accumulation, state-root
//! commitments and proof-gated finalization.
//!
//! ## Batch lifecycle
//!
//! ```text
//! submit_batch ──→ accumulator ──(full | stale | flush)──→ Pending
//!                                                            │
//!                      verify_batch(proof ok) ───────────────┼──→ Verified
//!                      verify_batch(proof bad) ──────────────┼──→ Rejected(ProofInvalid)
//!                      proof timeout ────────────────────────┼──→ Rejected(Timeout)
//!                      earlier batch rejected ───────────────┴──→ Rejected(ParentRejected)
//! ```
//!
//! Finalizing applies the transactions to the shard's account ledger on top
//! of the newest Pending batch (or the committed state) and records
//! `state_root = keccak(transactions_root || accounts_root)`. Batches of a
//! shard verify strictly in order; a verified batch becomes the committed
//! state. Terminal statuses never change, and a rejected batch can only be
//! retried under a new id with [`RollupBatchProcessor::resubmit_batch`].
//!
//! Proof checking is the pluggable [`ProofVerifier`]; the bundled
//! [`ProverAttestationVerifier`] accepts Ed25519 attestations from a fixed
//! prover set.

pub mod adapters;
pub mod domain;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{
    InMemoryEventBus, ProverAttestationVerifier, ProverAttestor, StaticShardState, ATTESTATION_LEN,
};
pub use domain::{
    compute_state_root, compute_transactions_root, AccountLedger, Accumulator, ApplyError, Batch,
    BatchError, BatchProof, BatchResult, BatchStatement, BatchStatus, RejectionReason,
    RollupConfig, ShardAnchor, ShardLedger, TxOutcome,
};
pub use events::{BatchFinalizedEvent, BatchResolvedEvent};
pub use ports::{EventBus, ManualTimeSource, ProofVerifier, ShardStateProvider, SystemTimeSource, TimeSource};
pub use service::{RollupBatchProcessor, RollupDependencies, SweepReport};
