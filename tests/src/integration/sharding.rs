//! # Sharding Properties
//!
//! Tamper detection, quarantine and recovery, and shard independence.

#[cfg(test)]
mod tests {
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use ss_01_consensus::AuditFault;
    use ss_02_sharding::{ShardError, ShardHealth};

    use crate::integration::fixtures::{mint, TestNode};

    #[test]
    fn test_untouched_shards_audit_clean() {
        let t = TestNode::new();
        for _ in 0..4 {
            t.produce(0);
            t.produce(1);
        }

        let reports = t.node.validate_shards();
        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert!(report.is_valid());
            assert_eq!(report.audit.blocks_checked, 5);
            assert_eq!(report.head.height, 4);
        }
    }

    #[test]
    fn test_flipped_byte_invalidates_block_and_descendants() {
        let t = TestNode::new();
        for _ in 0..5 {
            t.produce(0);
        }
        t.produce(1);

        assert!(t
            .node
            .sharding()
            .tamper_block(0, 3, |block| block.header.merkle_root[0] ^= 0x01)
            .unwrap());

        let reports = t.node.validate_shards();
        let broken = reports.iter().find(|r| r.shard_id == 0).unwrap();
        assert!(!broken.is_valid());
        assert_eq!(broken.audit.invalid_heights(), 3..6);
        assert_eq!(broken.reason(), Some(&AuditFault::HashMismatch));
        assert!(reports.iter().find(|r| r.shard_id == 1).unwrap().is_valid());
    }

    #[test]
    fn test_tampered_transaction_is_detected() {
        let t = TestNode::new();
        t.node.sharding().submit_transaction(0, mint(3, 10)).unwrap();
        t.produce(0);
        t.produce(0);

        t.node
            .sharding()
            .tamper_block(0, 1, |block| {
                block.transactions[0] = mint(3, 11);
            })
            .unwrap();

        let report = t
            .node
            .validate_shards()
            .into_iter()
            .find(|r| r.shard_id == 0)
            .unwrap();
        assert_eq!(report.audit.invalid_heights(), 1..3);
        assert_eq!(report.reason(), Some(&AuditFault::BadMerkleRoot));
    }

    #[tokio::test]
    async fn test_corrupted_shard_is_quarantined_until_recovered() {
        let t = TestNode::new();
        let mut events = t.node.subscribe(EventFilter::topics(vec![EventTopic::Sharding]));
        for _ in 0..4 {
            t.produce(0);
        }
        t.node
            .sharding()
            .tamper_block(0, 3, |block| block.header.timestamp += 1)
            .unwrap();
        t.node.validate_shards();

        assert_eq!(
            events.recv().await,
            Some(LedgerEvent::ShardCorrupted {
                shard_id: 0,
                first_invalid_height: 3,
            })
        );
        assert!(matches!(
            t.node.sharding().health(0).unwrap(),
            ShardHealth::Corrupted { first_invalid_height: 3, .. }
        ));

        let head = t.node.get_chain_head(0).unwrap();
        let block = t
            .node
            .sharding()
            .block_at(0, head.height)
            .unwrap()
            .unwrap();
        assert_eq!(t.node.submit_block(0, block), Err(ShardError::Corrupted(0)));

        // Still quarantined on a second audit; only recovery lifts it.
        t.node.validate_shards();
        assert!(!t.node.sharding().health(0).unwrap().is_healthy());

        let recovered = t.node.recover_shard(0).unwrap();
        assert_eq!(recovered.height, 2);
        assert_eq!(
            events.recv().await,
            Some(LedgerEvent::ShardRecovered {
                shard_id: 0,
                head_height: 2,
            })
        );

        assert_eq!(t.produce(0).height, 3);
        assert!(t.node.validate_shards().iter().all(|r| r.is_valid()));
    }

    #[test]
    fn test_shards_progress_in_parallel() {
        let t = TestNode::new();

        std::thread::scope(|scope| {
            for shard_id in [0, 1] {
                let t = &t;
                scope.spawn(move || {
                    for _ in 0..20 {
                        t.produce(shard_id);
                    }
                });
            }
        });

        assert_eq!(t.node.get_chain_head(0).unwrap().height, 20);
        assert_eq!(t.node.get_chain_head(1).unwrap().height, 20);
        assert_ne!(
            t.node.get_chain_head(0).unwrap().hash,
            t.node.get_chain_head(1).unwrap().hash
        );
    }

    #[test]
    fn test_created_shard_and_global_root() {
        let t = TestNode::new();
        let before = t.node.global_state_root();

        t.node.create_shard(5).unwrap();
        assert_eq!(t.node.create_shard(5), Err(ShardError::DuplicateShard(5)));
        assert_eq!(t.node.sharding().shard_ids(), vec![0, 1, 5]);

        let after = t.node.global_state_root();
        assert_eq!(after.shard_roots.len(), 3);
        assert_ne!(before.root, after.root);

        t.produce(5);
        assert_ne!(t.node.global_state_root().root, after.root);
    }

    #[test]
    fn test_routed_transactions_stay_on_one_shard() {
        let t = TestNode::new();
        let owner = t.node.submit_transaction(mint(8, 1)).unwrap();
        assert_eq!(t.node.submit_transaction(mint(8, 2)).unwrap(), owner);

        let other = if owner == 0 { 1 } else { 0 };
        assert_eq!(t.node.sharding().pending_transactions(owner).unwrap(), 2);
        assert_eq!(t.node.sharding().pending_transactions(other).unwrap(), 0);
    }
}
