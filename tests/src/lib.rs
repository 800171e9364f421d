//! # Stakeshard Test Suite
//!
//! Cross-crate tests run against a fully wired [`node_runtime::LedgerNode`].
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs     # node harness with dev validators and a prover
//!     ├── consensus.rs    # selection, signatures, chain integrity
//!     ├── sharding.rs     # tamper detection, quarantine, shard isolation
//!     ├── rollup.rs       # batch idempotence, finality, timeouts
//!     └── anchoring.rs    # commitments reaching the collaborators
//!
//! tests/benches/
//! └── ledger_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ss-tests
//! cargo test -p ss-tests integration::rollup::
//! cargo bench -p ss-tests
//! ```

pub mod integration;
