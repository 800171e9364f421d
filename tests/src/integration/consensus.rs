//! # Consensus Properties
//!
//! Stake-weighted selection, signature enforcement and chain integrity,
//! exercised through the node facade.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use shared_bus::{EventFilter, EventTopic, LedgerEvent};
    use shared_types::Signature;
    use ss_01_consensus::{
        BlockSigner, Ed25519BlockSigner, LinkFault, StakeWeightedSelector, ValidationError,
        ValidatorRegistry,
    };
    use ss_02_sharding::ShardError;

    use crate::integration::fixtures::{resign, TestNode};

    fn signer(seed: u8) -> Ed25519BlockSigner {
        Ed25519BlockSigner::from_seed([seed; 32])
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    #[test]
    fn test_selection_frequency_tracks_stake_share() {
        let stakes = [(signer(1), 1_000u128), (signer(2), 2_000), (signer(3), 3_000), (signer(4), 4_000)];
        let mut registry = ValidatorRegistry::new();
        for (s, stake) in &stakes {
            registry.register(s.address(), *stake, s.public_key()).unwrap();
        }
        let snapshot = registry.snapshot();
        let total: u128 = stakes.iter().map(|(_, stake)| stake).sum();

        let trials = 100_000;
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts: HashMap<_, u32> = HashMap::new();
        for _ in 0..trials {
            let chosen = StakeWeightedSelector::select(&snapshot, rng.gen::<u128>()).unwrap();
            *counts.entry(chosen.address).or_default() += 1;
        }

        for (s, stake) in &stakes {
            let expected = *stake as f64 / total as f64;
            let observed = f64::from(counts[&s.address()]) / f64::from(trials);
            assert!(
                (observed - expected).abs() < 0.01,
                "stake share {expected:.3}, observed {observed:.3}"
            );
        }
    }

    #[test]
    fn test_selection_is_deterministic_and_follows_stake_updates() {
        let a = signer(1);
        let b = signer(2);
        let mut registry = ValidatorRegistry::new();
        registry.register(a.address(), 1_000, a.public_key()).unwrap();
        registry.register(b.address(), 2_000, b.public_key()).unwrap();

        let before = registry.snapshot();
        let first = StakeWeightedSelector::select(&before, 1).unwrap().address;
        let second = StakeWeightedSelector::select(&before, 1).unwrap().address;
        assert_eq!(first, second);

        assert_eq!(registry.update_stake(&b.address(), -1_500).unwrap(), 500);
        let after = registry.snapshot();
        assert_eq!(after.total_active_stake().unwrap(), 1_500);
        assert_eq!(after.get(&b.address()).unwrap().stake, 500);

        // The earlier snapshot is unaffected by the update.
        assert_eq!(before.get(&b.address()).unwrap().stake, 2_000);
        let reselected = StakeWeightedSelector::select(&after, 1).unwrap().address;
        assert_eq!(reselected, StakeWeightedSelector::select(&after, 1).unwrap().address);
    }

    // =========================================================================
    // SIGNATURES
    // =========================================================================

    #[test]
    fn test_corrupted_signatures_never_commit() {
        let t = TestNode::new();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let mut block = t.next_block(0);
            let mut bytes = block.signature.as_bytes().to_vec();
            let index = rng.gen_range(0..bytes.len());
            bytes[index] ^= 1 << rng.gen_range(0..8);
            block.signature = Signature::from_bytes(bytes);

            assert!(matches!(
                t.node.submit_block(0, block),
                Err(ShardError::Rejected(ValidationError::BadSignature(_)))
            ));
            assert_eq!(t.node.get_chain_head(0).unwrap().height, 0);
        }
    }

    #[test]
    fn test_signature_must_come_from_declared_proposer() {
        let t = TestNode::new();
        let mut block = t.next_block(0);
        let impostor = t
            .genesis
            .signers
            .iter()
            .find(|s| s.address() != block.header.proposer)
            .unwrap();
        resign(&mut block, impostor);

        assert!(matches!(
            t.node.submit_block(0, block),
            Err(ShardError::Rejected(ValidationError::BadSignature(_)))
        ));

        let mut unsigned = t.next_block(0);
        unsigned.signature = Signature::empty();
        assert!(t.node.submit_block(0, unsigned).is_err());
        assert_eq!(t.node.get_chain_head(0).unwrap().height, 0);
    }

    // =========================================================================
    // CHAIN INTEGRITY
    // =========================================================================

    #[test]
    fn test_head_tracks_sequential_submissions() {
        let t = TestNode::new();
        let receipts: Vec<_> = (0..10).map(|_| t.produce(0)).collect();

        let head = t.node.get_chain_head(0).unwrap();
        assert_eq!(head.height, 10);
        assert_eq!(head.hash, receipts[9].block_hash);
        for (i, receipt) in receipts.iter().enumerate() {
            assert_eq!(receipt.height, i as u64 + 1);
        }
    }

    #[test]
    fn test_out_of_order_submissions_leave_head_unchanged() {
        let t = TestNode::new();
        let stale = t.next_block(0);
        t.produce(0);
        t.produce(0);
        let head = t.node.get_chain_head(0).unwrap();

        // Replaying an old height.
        assert!(matches!(
            t.node.submit_block(0, stale),
            Err(ShardError::Rejected(ValidationError::StaleHeight { head: 2, declared: 1 }))
        ));

        // Skipping a height.
        let mut ahead = t.next_block(0);
        ahead.header.height += 1;
        let signer = t.genesis.signer(&ahead.header.proposer).unwrap();
        resign(&mut ahead, signer);
        assert!(t.node.submit_block(0, ahead).is_err());

        // Declaring the wrong parent.
        let mut orphan = t.next_block(0);
        orphan.header.previous_hash = [0xAB; 32];
        let signer = t.genesis.signer(&orphan.header.proposer).unwrap();
        resign(&mut orphan, signer);
        assert!(t.node.submit_block(0, orphan).is_err());

        assert_eq!(t.node.get_chain_head(0).unwrap(), head);
    }

    #[test]
    fn test_block_for_another_shard_is_rejected() {
        let t = TestNode::new();
        let block = t.next_block(1);
        assert!(t.node.submit_block(0, block).is_err());
        assert_eq!(t.node.get_chain_head(0).unwrap().height, 0);
    }

    #[test]
    fn test_committed_block_replayed_on_sibling_shard_slashes_nobody() {
        let t = TestNode::new();
        let mut consensus = t.node.subscribe(EventFilter::topics(vec![EventTopic::Consensus]));

        // Advance both shards until one validator proposed the same height on each.
        let replay = (0..64)
            .find_map(|_| {
                let own = t.produce(0);
                let sibling = t.produce(1);
                let own = t.node.sharding().block_at(0, own.height).unwrap().unwrap();
                let sibling = t.node.sharding().block_at(1, sibling.height).unwrap().unwrap();
                (own.header.proposer == sibling.header.proposer).then_some(sibling)
            })
            .expect("some height shares a proposer across shards");
        let proposer = replay.header.proposer;
        let head = t.node.get_chain_head(0).unwrap();

        assert_eq!(
            t.node.submit_block(0, replay),
            Err(ShardError::Rejected(ValidationError::BrokenLink(
                LinkFault::ShardMismatch { expected: 0, declared: 1 }
            )))
        );
        assert_eq!(t.node.get_chain_head(0).unwrap(), head);

        while let Ok(Some(event)) = consensus.try_recv() {
            assert!(!matches!(event, LedgerEvent::ValidatorSlashed { .. }), "{event:?}");
        }
        let snapshot = t.node.sharding().validator_snapshot(0).unwrap();
        assert!(snapshot.active().any(|entry| entry.address == proposer));
        t.produce(0);
    }

    #[test]
    fn test_racing_proposals_commit_once_and_slash_equivocator() {
        let t = TestNode::new();
        let mut slashed = t.node.subscribe(EventFilter::topics(vec![EventTopic::Consensus]));

        let first = t.next_block(0);
        let mut second = first.clone();
        second.header.timestamp += 1;
        let proposer = first.header.proposer;
        resign(&mut second, t.genesis.signer(&proposer).unwrap());

        let results = std::thread::scope(|scope| {
            let a = scope.spawn(|| t.node.submit_block(0, first));
            let b = scope.spawn(|| t.node.submit_block(0, second));
            [a.join().unwrap(), b.join().unwrap()]
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = results.into_iter().find_map(Result::err).unwrap();
        assert!(matches!(
            loser,
            ShardError::Rejected(ValidationError::StaleHeight { head: 1, declared: 1 })
        ));
        assert_eq!(t.node.get_chain_head(0).unwrap().height, 1);

        let mut saw_slash = false;
        while let Ok(Some(event)) = slashed.try_recv() {
            if let LedgerEvent::ValidatorSlashed { validator, height, .. } = event {
                assert_eq!((validator, height), (proposer, 1));
                saw_slash = true;
            }
        }
        assert!(saw_slash);
        let snapshot = t.node.sharding().validator_snapshot(0).unwrap();
        assert!(snapshot.active().all(|entry| entry.address != proposer));
    }
}
