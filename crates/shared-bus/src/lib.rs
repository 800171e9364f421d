//! # Shared Bus - Ledger Event Bus
//!
//! Subsystems announce state changes (committed blocks, slashed validators,
//! finalized and resolved batches, anchored commitments) as [`LedgerEvent`]s.
//! Consumers subscribe with an [`EventFilter`] and never call the producer
//! directly.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Consensus /  │                    │  Anchoring   │
//! │ Rollup       │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Delivery is best effort: a subscriber that falls more than the channel
//! capacity behind skips the oldest events.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
