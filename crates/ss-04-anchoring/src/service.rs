//! Commitment Anchor
//!
//! Listens on the shared bus and, for every committed block and every
//! finalized or resolved batch, stores the serialized commitment in the
//! content store and records its content id in the registry contract.
//! Results go back onto the bus as `CommitmentAnchored` / `AnchorFailed`.
//!
//! Commitments are anchored one at a time in bus order, so a batch is
//! always committed before its resolution. A reader task moves bus events
//! into an unbounded queue as they arrive, so slow contract calls do not
//! make the subscription lag. Events the reader still loses are counted
//! and reported as `AnchorLagged`.

use crate::domain::{AnchorConfig, AnchorError, Commitment};
use crate::ports::{ContentStore, ContractGateway};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent, SubscriptionError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of one successful anchoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnchorReceipt {
    pub correlation_id: Uuid,
    pub method: &'static str,
    pub content_id: String,
    pub receipt: String,
}

/// Work handed from the bus reader to the anchoring loop.
enum AnchorInput {
    Commitment(Commitment),
    Missed(u64),
}

pub struct CommitmentAnchor<G, S>
where
    G: ContractGateway,
    S: ContentStore,
{
    config: AnchorConfig,
    gateway: Arc<G>,
    store: Arc<S>,
    bus: Arc<InMemoryEventBus>,
    anchored: AtomicU64,
    failed: AtomicU64,
    missed: AtomicU64,
}

impl<G, S> CommitmentAnchor<G, S>
where
    G: ContractGateway,
    S: ContentStore,
{
    pub fn new(config: AnchorConfig, gateway: Arc<G>, store: Arc<S>, bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            config,
            gateway,
            store,
            bus,
            anchored: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            missed: AtomicU64::new(0),
        }
    }

    pub fn anchored_count(&self) -> u64 {
        self.anchored.load(Ordering::Relaxed)
    }

    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Bus events lost before the anchor read them.
    pub fn missed_count(&self) -> u64 {
        self.missed.load(Ordering::Relaxed)
    }

    /// Store `commitment` and record it in the registry contract.
    pub async fn anchor(&self, commitment: &Commitment) -> Result<AnchorReceipt, AnchorError> {
        let correlation_id = Uuid::new_v4();
        let method = commitment.method();
        debug!(%correlation_id, method, "[ss-04] Anchoring commitment");

        let content_id = self.store.add_data(commitment.to_bytes()?).await?;
        let args = commitment.contract_args(&content_id);
        let receipt = self
            .gateway
            .interact_with_contract(
                &self.config.registry_address,
                &self.config.registry_abi,
                method,
                &args,
            )
            .await?;

        Ok(AnchorReceipt {
            correlation_id,
            method,
            content_id,
            receipt,
        })
    }

    /// Fetch and decode a previously stored commitment.
    pub async fn load(&self, content_id: &str) -> Result<Commitment, AnchorError> {
        let bytes = self.store.get_data(content_id).await?;
        Commitment::from_bytes(&bytes)
    }

    async fn handle(&self, commitment: Commitment) {
        let method = commitment.method();
        match self.anchor(&commitment).await {
            Ok(receipt) => {
                self.anchored.fetch_add(1, Ordering::Relaxed);
                info!(
                    correlation_id = %receipt.correlation_id,
                    method,
                    content_id = %receipt.content_id,
                    "[ss-04] Commitment anchored"
                );
                self.bus.publish_now(LedgerEvent::CommitmentAnchored {
                    method: method.to_string(),
                    content_id: receipt.content_id,
                    receipt: receipt.receipt,
                });
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(method, "[ss-04] Anchoring failed: {}", e);
                self.bus.publish_now(LedgerEvent::AnchorFailed {
                    method: method.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    fn handle_missed(&self, missed: u64) {
        self.missed.fetch_add(missed, Ordering::Relaxed);
        warn!(missed, "[ss-04] Anchor fell behind the bus, events were not anchored");
        self.bus.publish_now(LedgerEvent::AnchorLagged { missed });
    }

    /// Start anchoring bus events on background tasks.
    ///
    /// The subscription is taken before this returns, so every event
    /// published afterwards is either anchored or counted as missed. The
    /// returned handle is the anchoring loop; aborting it also stops the
    /// bus reader.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()>
    where
        G: 'static,
        S: 'static,
    {
        let mut subscription = self
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Consensus, EventTopic::Rollup]));
        let (queue, mut pending) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let input = tokio::select! {
                    _ = queue.closed() => break,
                    received = subscription.recv_checked() => match received {
                        Ok(event) => match Commitment::from_event(&event) {
                            Some(commitment) => AnchorInput::Commitment(commitment),
                            None => continue,
                        },
                        Err(SubscriptionError::Lagged(missed)) => AnchorInput::Missed(missed),
                        Err(SubscriptionError::Closed) => break,
                    },
                };
                if queue.send(input).is_err() {
                    break;
                }
            }
            debug!("[ss-04] Bus reader exiting");
        });

        let anchor = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(input) = pending.recv().await {
                match input {
                    AnchorInput::Commitment(commitment) => anchor.handle(commitment).await,
                    AnchorInput::Missed(missed) => anchor.handle_missed(missed),
                }
                // Our own results share the bus ring with the reader.
                tokio::task::yield_now().await;
            }
            debug!("[ss-04] Event bus closed, anchor exiting");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryContentStore, InMemoryContractGateway};
    use shared_bus::Subscription;
    use std::time::Duration;

    type Anchor = CommitmentAnchor<InMemoryContractGateway, InMemoryContentStore>;

    fn setup() -> (Arc<Anchor>, Arc<InMemoryContractGateway>, Arc<InMemoryEventBus>) {
        setup_with_bus(InMemoryEventBus::new())
    }

    fn setup_with_bus(bus: InMemoryEventBus) -> (Arc<Anchor>, Arc<InMemoryContractGateway>, Arc<InMemoryEventBus>) {
        let gateway = Arc::new(InMemoryContractGateway::new());
        let bus = Arc::new(bus);
        let anchor = Arc::new(CommitmentAnchor::new(
            AnchorConfig::default(),
            Arc::clone(&gateway),
            Arc::new(InMemoryContentStore::new()),
            Arc::clone(&bus),
        ));
        (anchor, gateway, bus)
    }

    fn committed(height: u64) -> LedgerEvent {
        LedgerEvent::BlockCommitted {
            shard_id: 0,
            height,
            block_hash: [height as u8; 32],
            merkle_root: [0u8; 32],
            proposer: [1u8; 20],
            transaction_count: 0,
        }
    }

    fn finalized() -> LedgerEvent {
        LedgerEvent::BatchFinalized {
            batch_id: 1,
            shard_id: 0,
            transaction_count: 2,
            prior_state_root: [0u8; 32],
            state_root: [5u8; 32],
            anchor_height: 3,
            anchor_hash: [3u8; 32],
        }
    }

    async fn next(subscription: &mut Subscription) -> LedgerEvent {
        tokio::time::timeout(Duration::from_secs(5), subscription.recv())
            .await
            .expect("timed out waiting for anchoring event")
            .expect("bus closed")
    }

    #[tokio::test]
    async fn test_anchor_stores_then_calls_registry() {
        let (anchor, gateway, _bus) = setup();
        let commitment = Commitment::from_event(&finalized()).unwrap();

        let receipt = anchor.anchor(&commitment).await.unwrap();
        assert_eq!(receipt.method, "commitBatch");
        assert_eq!(anchor.load(&receipt.content_id).await.unwrap(), commitment);

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].address, AnchorConfig::default().registry_address);
        assert_eq!(calls[0].args.last(), Some(&receipt.content_id));
        assert_eq!(calls[0].receipt, receipt.receipt);
    }

    #[tokio::test]
    async fn test_spawned_anchor_reports_on_bus() {
        let (anchor, gateway, bus) = setup();
        let mut results = bus.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));
        let handle = anchor.spawn();

        bus.publish_now(LedgerEvent::ShardCreated {
            shard_id: 0,
            genesis_hash: [0u8; 32],
        });
        bus.publish_now(committed(1));

        match next(&mut results).await {
            LedgerEvent::CommitmentAnchored { method, .. } => assert_eq!(method, "commitBlock"),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(gateway.calls().len(), 1);
        assert_eq!(anchor.anchored_count(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_gateway_failure_reported() {
        let (anchor, gateway, bus) = setup();
        gateway.fail_method("commitBatch");
        let mut results = bus.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));
        let handle = anchor.spawn();

        bus.publish_now(finalized());
        match next(&mut results).await {
            LedgerEvent::AnchorFailed { method, error } => {
                assert_eq!(method, "commitBatch");
                assert!(error.contains("reverted"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(anchor.failed_count(), 1);
        handle.abort();
    }

    #[tokio::test]
    async fn test_commitments_anchored_in_bus_order() {
        let (anchor, gateway, bus) = setup();
        let mut results = bus.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));
        let handle = anchor.spawn();

        bus.publish_now(finalized());
        bus.publish_now(LedgerEvent::BatchResolved {
            batch_id: 1,
            shard_id: 0,
            verified: true,
            reason: None,
        });
        next(&mut results).await;
        next(&mut results).await;

        let methods: Vec<String> = gateway.calls().into_iter().map(|c| c.method).collect();
        assert_eq!(methods, vec!["commitBatch", "resolveBatch"]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_burst_beyond_bus_capacity_is_accounted_for() {
        let (anchor, gateway, bus) = setup_with_bus(InMemoryEventBus::with_capacity(4));
        let handle = anchor.spawn();

        // Published without yielding, so the reader cannot keep up.
        for height in 1..=12 {
            bus.publish_now(committed(height));
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while anchor.anchored_count() + anchor.missed_count() < 12 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("every published commit anchored or reported missing");

        assert_eq!(anchor.anchored_count(), 4);
        assert_eq!(anchor.missed_count(), 8);
        assert_eq!(anchor.failed_count(), 0);
        let heights: Vec<String> = gateway
            .calls()
            .into_iter()
            .map(|call| call.args[1].clone())
            .collect();
        assert_eq!(heights, vec!["9", "10", "11", "12"]);
        handle.abort();
    }

    #[tokio::test]
    async fn test_missed_events_are_reported_on_bus() {
        let (anchor, _gateway, bus) = setup();
        let mut results = bus.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));

        anchor.handle_missed(3);
        assert_eq!(next(&mut results).await, LedgerEvent::AnchorLagged { missed: 3 });
        assert_eq!(anchor.missed_count(), 3);
        assert_eq!(anchor.failed_count(), 0);
    }
}
