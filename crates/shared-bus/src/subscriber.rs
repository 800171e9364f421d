//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{EventFilter, LedgerEvent};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,

    /// The subscriber fell behind and this many events were overwritten
    /// before it read them. Receiving resumes with the oldest retained one.
    #[error("Subscriber lagged, {0} events lost")]
    Lagged(u64),
}

/// A subscription handle for receiving events.
pub struct Subscription {
    receiver: broadcast::Receiver<LedgerEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: broadcast::Receiver<LedgerEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event that matches the filter.
    ///
    /// Returns `None` once the bus is dropped. Lost events are logged and
    /// skipped; use [`Subscription::recv_checked`] to observe them.
    pub async fn recv(&mut self) -> Option<LedgerEvent> {
        loop {
            match self.recv_checked().await {
                Ok(event) => return Some(event),
                Err(SubscriptionError::Closed) => return None,
                Err(SubscriptionError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, some events dropped");
                }
            }
        }
    }

    /// Receive the next matching event, reporting lost events as
    /// `SubscriptionError::Lagged` instead of skipping them silently.
    ///
    /// Cancel safe: dropping the future loses no event.
    pub async fn recv_checked(&mut self) -> Result<LedgerEvent, SubscriptionError> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    return Err(SubscriptionError::Lagged(count))
                }
            };

            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Try to receive the next matching event without blocking.
    ///
    /// `Ok(None)` means nothing is queued right now.
    pub fn try_recv(&mut self) -> Result<Option<LedgerEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

/// Filtered event stream for use with stream combinators.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = LedgerEvent> + Send>>,
    filter: EventFilter,
}

impl EventStream {
    pub(crate) fn new(receiver: broadcast::Receiver<LedgerEvent>, filter: EventFilter) -> Self {
        let matcher = filter.clone();
        let inner = BroadcastStream::new(receiver).filter_map(move |item| match item {
            Ok(event) if matcher.matches(&event) => Some(event),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(count)) => {
                warn!(lagged = count, "Event stream lagged, some events dropped");
                None
            }
        });
        Self {
            inner: Box::pin(inner),
            filter,
        }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Stream for EventStream {
    type Item = LedgerEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
