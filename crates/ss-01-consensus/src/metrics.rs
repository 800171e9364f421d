//! # Consensus Metrics
//!
//! Prometheus metrics for block validation.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! ss-01-consensus = { workspace = true, features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `consensus_blocks_committed_total` - Counter of committed blocks
//! - `consensus_blocks_rejected_total` - Counter of rejected blocks (by reason)
//! - `consensus_validation_latency_seconds` - Histogram of validation times
//! - `consensus_validators_slashed_total` - Counter of equivocation slashings

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_counter_vec, register_histogram, register_int_counter, CounterVec, Histogram,
    IntCounter,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Total blocks committed
    pub static ref BLOCKS_COMMITTED: IntCounter = register_int_counter!(
        "consensus_blocks_committed_total",
        "Total number of blocks committed"
    )
    .expect("Failed to create BLOCKS_COMMITTED metric");

    /// Total blocks rejected, labeled by rejection reason
    pub static ref BLOCKS_REJECTED: CounterVec = register_counter_vec!(
        "consensus_blocks_rejected_total",
        "Total number of blocks rejected",
        &["reason"]
    )
    .expect("Failed to create BLOCKS_REJECTED metric");

    /// Histogram of block validation latency
    pub static ref VALIDATION_LATENCY: Histogram = register_histogram!(
        "consensus_validation_latency_seconds",
        "Time taken to validate a block in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to create VALIDATION_LATENCY metric");

    /// Total validators slashed
    pub static ref VALIDATORS_SLASHED: IntCounter = register_int_counter!(
        "consensus_validators_slashed_total",
        "Total number of validators slashed for equivocation"
    )
    .expect("Failed to create VALIDATORS_SLASHED metric");
}

#[cfg(feature = "metrics")]
pub fn record_block_committed() {
    BLOCKS_COMMITTED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_block_rejected(reason: &str) {
    BLOCKS_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_validation_latency(seconds: f64) {
    VALIDATION_LATENCY.observe(seconds);
}

#[cfg(feature = "metrics")]
pub fn record_validator_slashed() {
    VALIDATORS_SLASHED.inc();
}

// No-op implementations when metrics feature is disabled
#[cfg(not(feature = "metrics"))]
pub fn record_block_committed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_block_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_validation_latency(_seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_validator_slashed() {}
