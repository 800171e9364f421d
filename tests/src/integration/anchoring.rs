//! # Anchoring Flow
//!
//! Committed blocks and rollup batches reach the content store and the
//! registry contract through the node's background anchor task.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shared_bus::{EventFilter, EventTopic, LedgerEvent, Subscription};
    use ss_04_anchoring::Commitment;
    use tokio::time::timeout;

    use crate::integration::fixtures::{mint, TestNode};

    /// Next anchoring outcome as `(method, content id)`, or the failure.
    async fn next_anchored(sub: &mut Subscription) -> Result<(String, String), String> {
        match timeout(Duration::from_secs(5), sub.recv()).await {
            Ok(Some(LedgerEvent::CommitmentAnchored {
                method, content_id, ..
            })) => Ok((method, content_id)),
            Ok(Some(LedgerEvent::AnchorFailed { method, error })) => Err(format!("{method}: {error}")),
            other => panic!("no anchoring outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_block_and_batch_lifecycle_is_anchored_in_order() {
        let t = TestNode::new();
        let mut anchored = t.node.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));
        let tasks = t.node.start();

        let receipt = t.produce(0);
        t.node.submit_batch(0, vec![mint(1, 10)]).unwrap();
        let id = t.node.flush_batch(0).unwrap().unwrap();
        t.node.verify_batch(id, &t.prove(id)).unwrap();

        let (method, block_content) = next_anchored(&mut anchored).await.unwrap();
        assert_eq!(method, "commitBlock");
        let (method, _) = next_anchored(&mut anchored).await.unwrap();
        assert_eq!(method, "commitBatch");
        let (method, resolution_content) = next_anchored(&mut anchored).await.unwrap();
        assert_eq!(method, "resolveBatch");

        let anchor = &t.node.container().anchor;
        match anchor.load(&block_content).await.unwrap() {
            Commitment::Block {
                shard_id,
                height,
                block_hash,
                ..
            } => {
                assert_eq!((shard_id, height), (0, receipt.height));
                assert_eq!(block_hash, format!("0x{}", hex::encode(receipt.block_hash)));
            }
            other => panic!("unexpected commitment: {other:?}"),
        }
        assert_eq!(
            anchor.load(&resolution_content).await.unwrap(),
            Commitment::Resolution {
                batch_id: id,
                shard_id: 0,
                verified: true,
                reason: None,
            }
        );

        let calls = t.node.container().gateway.calls();
        let methods: Vec<_> = calls.iter().map(|call| call.method.as_str()).collect();
        assert_eq!(methods, vec!["commitBlock", "commitBatch", "resolveBatch"]);
        assert!(calls
            .iter()
            .all(|call| call.address == t.node.config().anchor.registry_address));

        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_contract_failure_is_reported_and_does_not_block_the_ledger() {
        let t = TestNode::new();
        let mut anchored = t.node.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));
        t.node.container().gateway.fail_method("commitBlock");
        let tasks = t.node.start();

        t.produce(1);
        let failure = next_anchored(&mut anchored).await.unwrap_err();
        assert!(failure.starts_with("commitBlock"));

        // The shard kept going regardless.
        assert_eq!(t.produce(1).height, 2);
        assert!(next_anchored(&mut anchored).await.is_err());

        t.node.container().gateway.clear_failures();
        t.produce(1);
        let (method, _) = next_anchored(&mut anchored).await.unwrap();
        assert_eq!(method, "commitBlock");
        assert_eq!(t.node.container().anchor.failed_count(), 2);

        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_timed_out_batch_is_anchored_as_rejected() {
        let t = TestNode::new();
        let mut anchored = t.node.subscribe(EventFilter::topics(vec![EventTopic::Anchoring]));
        let tasks = t.node.start();

        t.node.submit_batch(1, vec![mint(2, 5)]).unwrap();
        let id = t.node.flush_batch(1).unwrap().unwrap();
        let (method, _) = next_anchored(&mut anchored).await.unwrap();
        assert_eq!(method, "commitBatch");

        t.clock.advance(t.node.config().rollup.proof_timeout_secs + 1);
        let (method, content_id) = next_anchored(&mut anchored).await.unwrap();
        assert_eq!(method, "resolveBatch");
        assert_eq!(
            t.node.container().anchor.load(&content_id).await.unwrap(),
            Commitment::Resolution {
                batch_id: id,
                shard_id: 1,
                verified: false,
                reason: Some("timeout".into()),
            }
        );

        tasks.shutdown().await;
    }
}
