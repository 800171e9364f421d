//! # Rollup Metrics
//!
//! Enable with the `metrics` feature. Exported:
//!
//! - `rollup_batches_finalized_total` - Counter of finalized batches
//! - `rollup_batches_resolved_total` - Counter of resolved batches (by outcome)

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref BATCHES_FINALIZED: IntCounter = register_int_counter!(
        "rollup_batches_finalized_total",
        "Total number of batches finalized"
    )
    .expect("Failed to create BATCHES_FINALIZED metric");

    /// Labeled `verified`, `proof_invalid`, `timeout` or `parent_rejected`
    pub static ref BATCHES_RESOLVED: CounterVec = register_counter_vec!(
        "rollup_batches_resolved_total",
        "Total number of batches that reached a terminal status",
        &["outcome"]
    )
    .expect("Failed to create BATCHES_RESOLVED metric");
}

#[cfg(feature = "metrics")]
pub fn record_batch_finalized() {
    BATCHES_FINALIZED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_batch_resolved(outcome: &str) {
    BATCHES_RESOLVED.with_label_values(&[outcome]).inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_finalized() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_resolved(_outcome: &str) {}
