//! Shared node harness.

use std::sync::Arc;

use node_runtime::{DevGenesis, LedgerNode, ManualClock, NodeConfig};
use shared_crypto::Ed25519KeyPair;
use shared_types::{Address, ShardId, Transaction};
use ss_01_consensus::{Block, BlockSigner, CommitReceipt, Ed25519BlockSigner};
use ss_03_rollup::{BatchProof, ProverAttestor};

/// Genesis timestamp of every shard under `ConsensusConfig::for_testing`.
pub const GENESIS_TIME: u64 = 1_000;

pub struct TestNode {
    pub node: LedgerNode,
    pub genesis: DevGenesis,
    pub prover: ProverAttestor,
    pub clock: Arc<ManualClock>,
}

impl TestNode {
    /// Shards 0 and 1, four equal-stake validators, one authorised prover.
    pub fn new() -> Self {
        Self::with_config(NodeConfig::for_testing())
    }

    pub fn with_config(mut config: NodeConfig) -> Self {
        let genesis = DevGenesis::new(4, 1_000);
        let prover = ProverAttestor::from_seed([9u8; 32]);
        config.sharding.seed_validators = genesis.validators.clone();
        config.prover_keys = vec![prover.public_key()];
        let clock = Arc::new(ManualClock::new(GENESIS_TIME + 3_600));
        let node = LedgerNode::with_clock(config, Arc::clone(&clock)).expect("test node boots");
        Self {
            node,
            genesis,
            prover,
            clock,
        }
    }

    /// Signer of the validator selected for the next block of `shard_id`.
    pub fn next_signer(&self, shard_id: ShardId) -> &Ed25519BlockSigner {
        let proposer = self
            .node
            .sharding()
            .expected_proposer(shard_id)
            .expect("shard has a proposer");
        self.genesis.signer(&proposer).expect("proposer is a dev validator")
    }

    /// Correctly built and signed next block, not yet submitted.
    pub fn next_block(&self, shard_id: ShardId) -> Block {
        let head = self.node.get_chain_head(shard_id).expect("shard exists");
        self.node
            .sharding()
            .build_block(shard_id, self.next_signer(shard_id), head.timestamp + 1)
            .expect("shard is healthy")
    }

    pub fn produce(&self, shard_id: ShardId) -> CommitReceipt {
        let block = self.next_block(shard_id);
        self.node.submit_block(shard_id, block).expect("valid block commits")
    }

    /// Valid proof for a finalized batch.
    pub fn prove(&self, batch_id: u64) -> BatchProof {
        let batch = self.node.get_batch(batch_id).expect("batch exists");
        self.prover.attest(&batch.statement())
    }
}

/// Re-sign `block` after its header was edited.
pub fn resign(block: &mut Block, signer: &dyn BlockSigner) {
    block.signature = signer.sign(&block.hash());
}

/// Key owning test account `n`.
pub fn account_key(n: u8) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([n; 32])
}

pub fn account(n: u8) -> Address {
    account_key(n).address()
}

pub fn mint(to: u8, amount: u128) -> Transaction {
    Transaction::Mint {
        to: account(to),
        amount,
    }
}

/// Fee-free transfer signed by the sender's key.
pub fn transfer(from: u8, to: u8, amount: u128, nonce: u64) -> Transaction {
    account_key(from).sign_transfer(account(to), amount, 0, nonce)
}
