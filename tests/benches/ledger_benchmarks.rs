//! # Stakeshard Ledger Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | ss-01 Consensus | Stake-weighted selection over large validator sets |
//! | ss-01 Consensus | Full block submission (signature, link, merkle root) |
//! | ss-02 Sharding | Integrity audit of every shard |
//! | ss-03 Rollup | Batch finalization and proof verification |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use node_runtime::{DevGenesis, LedgerNode, ManualClock, NodeConfig};
use shared_types::{PublicKey, Transaction};
use ss_01_consensus::{StakeWeightedSelector, ValidatorRegistry};
use ss_03_rollup::ProverAttestor;

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-01-selection");
    let mut rng = StdRng::seed_from_u64(1);

    for size in [10usize, 100, 1_000, 10_000] {
        let mut registry = ValidatorRegistry::new();
        for i in 0..size {
            let mut address = [0u8; 20];
            address[..8].copy_from_slice(&(i as u64).to_le_bytes());
            registry
                .register(address, rng.gen_range(1..1_000_000), PublicKey::from_bytes(vec![1; 32]))
                .expect("unique address");
        }
        let snapshot = registry.snapshot();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("select", size), &snapshot, |b, snapshot| {
            b.iter(|| black_box(StakeWeightedSelector::select(snapshot, rng.gen::<u128>()).is_ok()))
        });
    }
    group.finish();
}

fn dev_node(max_txs_per_block: usize) -> (LedgerNode, DevGenesis, ProverAttestor) {
    let genesis = DevGenesis::new(8, 1_000);
    let prover = ProverAttestor::from_seed([9u8; 32]);
    let mut config = NodeConfig::for_testing();
    config.sharding.seed_validators = genesis.validators.clone();
    config.sharding.consensus.max_txs_per_block = max_txs_per_block;
    config.sharding.consensus.max_pending_transactions = max_txs_per_block * 2;
    config.rollup.max_batch_size = 10_000;
    config.prover_keys = vec![prover.public_key()];
    let node = LedgerNode::with_clock(config, Arc::new(ManualClock::new(4_000_000_000))).expect("node boots");
    (node, genesis, prover)
}

fn mints(count: usize) -> Vec<Transaction> {
    (1..=count as u128)
        .map(|amount| Transaction::Mint {
            to: [7u8; 20],
            amount,
        })
        .collect()
}

fn bench_block_submission(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-01-block-submission");

    for txs in [0usize, 100, 1_000] {
        let (node, genesis, _) = dev_node(txs.max(1));
        group.throughput(Throughput::Elements(txs.max(1) as u64));
        group.bench_function(BenchmarkId::new("submit_block", txs), |b| {
            b.iter(|| {
                for tx in mints(txs) {
                    node.sharding().submit_transaction(0, tx).expect("pool has room");
                }
                let head = node.get_chain_head(0).expect("shard 0");
                let proposer = node.sharding().expected_proposer(0).expect("proposer");
                let signer = genesis.signer(&proposer).expect("dev validator");
                let block = node
                    .sharding()
                    .build_block(0, signer, head.timestamp + 1)
                    .expect("healthy");
                black_box(node.submit_block(0, block).expect("valid block"))
            })
        });
    }
    group.finish();
}

fn bench_shard_audit(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-02-audit");
    group.sample_size(20);

    let (node, genesis, _) = dev_node(16);
    for _ in 0..500 {
        for shard_id in node.sharding().shard_ids() {
            let head = node.get_chain_head(shard_id).expect("shard");
            let proposer = node.sharding().expected_proposer(shard_id).expect("proposer");
            let signer = genesis.signer(&proposer).expect("dev validator");
            node.produce_block(shard_id, signer, head.timestamp + 1)
                .expect("valid block");
        }
    }

    group.bench_function("validate_shards_500_blocks", |b| {
        b.iter(|| black_box(node.validate_shards().len()))
    });
    group.finish();
}

fn bench_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("ss-03-rollup");

    for size in [10usize, 100, 1_000] {
        let (node, _, prover) = dev_node(16);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("finalize_and_verify", size), |b| {
            b.iter(|| {
                node.submit_batch(1, mints(size)).expect("valid batch");
                let id = node.flush_batch(1).expect("flush").expect("non-empty");
                let proof = prover.attest(&node.get_batch(id).expect("batch").statement());
                black_box(node.verify_batch(id, &proof).expect("known batch"))
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_selection,
    bench_block_submission,
    bench_shard_audit,
    bench_batches
);
criterion_main!(benches);
