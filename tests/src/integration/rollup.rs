//! # Rollup Properties
//!
//! Batch idempotence, rejection finality, timeouts and the batch chain,
//! driven through the node so batches anchor to real shard heads.

#[cfg(test)]
mod tests {
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use shared_types::{AccountState, Transaction, TransactionError};
    use ss_03_rollup::{BatchError, BatchProof, BatchStatus, RejectionReason, ATTESTATION_LEN};

    use crate::integration::fixtures::{account, account_key, mint, transfer, TestNode};

    fn resolved_events(sub: &mut shared_bus::Subscription) -> Vec<(u64, bool)> {
        let mut resolved = Vec::new();
        while let Ok(Some(event)) = sub.try_recv() {
            if let LedgerEvent::BatchResolved {
                batch_id, verified, ..
            } = event
            {
                resolved.push((batch_id, verified));
            }
        }
        resolved
    }

    #[test]
    fn test_verification_happens_exactly_once() {
        let t = TestNode::new();
        let mut sub = t.node.subscribe(EventFilter::topics(vec![EventTopic::Rollup]));

        t.node.submit_batch(0, vec![mint(1, 10), mint(2, 20)]).unwrap();
        let id = t.node.flush_batch(0).unwrap().unwrap();
        assert_eq!(t.node.get_batch_status(id).unwrap(), BatchStatus::Pending);

        let proof = t.prove(id);
        assert_eq!(t.node.verify_batch(id, &proof).unwrap(), BatchStatus::Verified);
        assert_eq!(t.node.verify_batch(id, &proof).unwrap(), BatchStatus::Verified);
        assert_eq!(
            t.node.verify_batch(id, &BatchProof(vec![0; ATTESTATION_LEN])).unwrap(),
            BatchStatus::Verified
        );

        assert_eq!(resolved_events(&mut sub), vec![(id, true)]);
        assert_eq!(
            t.node.rollup().account(0, &account(1)),
            Some(AccountState { balance: 10, nonce: 0 })
        );
    }

    #[test]
    fn test_rejected_batch_never_becomes_verified() {
        let t = TestNode::new();
        t.node.submit_batch(0, vec![mint(1, 10)]).unwrap();
        let id = t.node.flush_batch(0).unwrap().unwrap();

        let rejected = BatchStatus::Rejected(RejectionReason::ProofInvalid);
        assert_eq!(t.node.verify_batch(id, &BatchProof(vec![7; 3])).unwrap(), rejected);
        assert_eq!(t.node.verify_batch(id, &t.prove(id)).unwrap(), rejected);
        assert_eq!(t.node.get_batch_status(id).unwrap(), rejected);

        // Rejection leaves the committed rollup state untouched.
        assert_eq!(t.node.rollup().account(0, &account(1)), None);
    }

    #[test]
    fn test_proof_for_another_batch_is_refused() {
        let t = TestNode::new();
        t.node.submit_batch(0, vec![mint(1, 10)]).unwrap();
        let first = t.node.flush_batch(0).unwrap().unwrap();
        t.node.submit_batch(1, vec![mint(1, 10)]).unwrap();
        let second = t.node.flush_batch(1).unwrap().unwrap();

        assert_eq!(
            t.node.verify_batch(second, &t.prove(first)).unwrap(),
            BatchStatus::Rejected(RejectionReason::ProofInvalid)
        );
        assert_eq!(t.node.verify_batch(first, &t.prove(first)).unwrap(), BatchStatus::Verified);
    }

    #[test]
    fn test_resubmission_gets_a_fresh_id() {
        let t = TestNode::new();
        t.node.submit_batch(0, vec![mint(1, 10)]).unwrap();
        let id = t.node.flush_batch(0).unwrap().unwrap();
        t.node.verify_batch(id, &BatchProof(vec![])).unwrap();

        let retry = t.node.resubmit_batch(id).unwrap();
        assert!(retry > id);
        assert_eq!(t.node.get_batch(retry).unwrap().resubmission_of, Some(id));
        assert_eq!(t.node.verify_batch(retry, &t.prove(retry)).unwrap(), BatchStatus::Verified);

        assert_eq!(
            t.node.get_batch_status(id).unwrap(),
            BatchStatus::Rejected(RejectionReason::ProofInvalid)
        );
        assert!(matches!(t.node.resubmit_batch(retry), Err(BatchError::NotRejected(_))));
    }

    #[test]
    fn test_overdue_batch_times_out() {
        let t = TestNode::new();
        t.node.submit_batch(1, vec![mint(1, 10)]).unwrap();
        let id = t.node.flush_batch(1).unwrap().unwrap();

        t.clock.advance(t.node.config().rollup.proof_timeout_secs + 1);
        assert_eq!(
            t.node.verify_batch(id, &t.prove(id)).unwrap(),
            BatchStatus::Rejected(RejectionReason::Timeout)
        );
    }

    #[test]
    fn test_batches_verify_in_order_and_cascade() {
        let t = TestNode::new();
        t.node.submit_batch(0, vec![mint(1, 100)]).unwrap();
        let first = t.node.flush_batch(0).unwrap().unwrap();
        t.node.submit_batch(0, vec![transfer(1, 2, 40, 0)]).unwrap();
        let second = t.node.flush_batch(0).unwrap().unwrap();
        t.node.submit_batch(0, vec![transfer(2, 3, 10, 0)]).unwrap();
        let third = t.node.flush_batch(0).unwrap().unwrap();

        assert_eq!(
            t.node.verify_batch(second, &t.prove(second)),
            Err(BatchError::OutOfOrder(second))
        );

        assert_eq!(t.node.verify_batch(first, &t.prove(first)).unwrap(), BatchStatus::Verified);
        assert_eq!(
            t.node.verify_batch(second, &BatchProof(vec![])).unwrap(),
            BatchStatus::Rejected(RejectionReason::ProofInvalid)
        );
        assert_eq!(
            t.node.get_batch_status(third).unwrap(),
            BatchStatus::Rejected(RejectionReason::ParentRejected)
        );
        assert_eq!(
            t.node.rollup().account(0, &account(1)),
            Some(AccountState { balance: 100, nonce: 0 })
        );
    }

    #[test]
    fn test_full_accumulator_finalizes_and_anchors_to_head() {
        let t = TestNode::new();
        let head = t.produce(0);
        let max = t.node.config().rollup.max_batch_size;

        let txs: Vec<_> = (1..=max as u128).map(|i| mint(1, i)).collect();
        let id = t.node.submit_batch(0, txs).unwrap().unwrap();

        let batch = t.node.get_batch(id).unwrap();
        assert_eq!(batch.transactions.len(), max);
        assert_eq!(batch.anchor.height, head.height);
        assert_eq!(batch.anchor.head_hash, head.block_hash);
        assert_eq!(t.node.rollup().accumulated(0), 0);

        assert!(matches!(
            t.node.submit_batch(0, vec![mint(1, 1); max + 1]),
            Err(BatchError::Oversize { .. })
        ));
        assert_eq!(t.node.submit_batch(0, vec![]), Err(BatchError::EmptyBatch));
        assert_eq!(t.node.submit_batch(9, vec![mint(1, 1)]), Err(BatchError::UnknownShard(9)));
        assert_eq!(t.node.get_batch_status(999), Err(BatchError::NotFound(999)));
    }

    #[test]
    fn test_identical_batches_on_fresh_shards_share_a_root() {
        let t = TestNode::new();
        let txs = vec![mint(1, 5), transfer(1, 2, 3, 0)];
        t.node.submit_batch(0, txs.clone()).unwrap();
        t.node.submit_batch(1, txs).unwrap();
        let a = t.node.flush_batch(0).unwrap().unwrap();
        let b = t.node.flush_batch(1).unwrap().unwrap();

        let a = t.node.get_batch(a).unwrap();
        let b = t.node.get_batch(b).unwrap();
        assert_eq!(a.state_root, b.state_root);
        assert_eq!(a.transactions_root, b.transactions_root);
    }

    #[test]
    fn test_transfer_signed_by_another_key_cannot_drain_account() {
        let t = TestNode::new();
        t.node.submit_batch(0, vec![mint(1, 100)]).unwrap();
        t.node.flush_batch(0).unwrap().unwrap();

        let mut forged = account_key(6).sign_transfer(account(6), 100, 0, 0);
        if let Transaction::Transfer { from, .. } = &mut forged {
            *from = account(1);
        }
        assert_eq!(
            t.node.submit_batch(0, vec![forged]),
            Err(BatchError::InvalidTransaction {
                index: 0,
                source: TransactionError::SenderKeyMismatch,
            })
        );
        assert_eq!(t.node.rollup().accumulated(0), 0);
    }
}
