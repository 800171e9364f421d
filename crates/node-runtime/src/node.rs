//! # Ledger Node
//!
//! The node facade: every externally exposed ledger operation, backed by
//! the subsystems in [`SubsystemContainer`].

use std::sync::Arc;

use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use shared_types::{BatchId, ShardId, Transaction, TransactionError};
use ss_01_consensus::{Block, BlockSigner, ChainHead, CommitReceipt};
use ss_02_sharding::{GlobalStateRoot, ShardError, ShardReport};
use ss_03_rollup::{Batch, BatchProof, BatchResult, BatchStatus};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::ManualClock;
use crate::container::{ConfigError, NodeConfig, NodeRollup, NodeSharding, SubsystemContainer};

/// Node-level failures outside the per-operation subsystem errors.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Shard error: {0}")]
    Shard(#[from] ShardError),

    #[error("Undecodable transaction: {0}")]
    Transaction(#[from] TransactionError),
}

/// Handles of the node's background tasks.
pub struct BackgroundTasks {
    sweeper: JoinHandle<()>,
    anchor: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Stop both tasks and wait for them to unwind.
    pub async fn shutdown(self) {
        self.sweeper.abort();
        self.anchor.abort();
        for (name, handle) in [("sweeper", self.sweeper), ("anchor", self.anchor)] {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(task = name, "[node] Background task failed: {}", e);
                }
            }
        }
        info!("[node] Background tasks stopped");
    }
}

pub struct LedgerNode {
    container: SubsystemContainer,
}

impl LedgerNode {
    /// Validate `config`, wire the subsystems and create the configured shards.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        Self::boot(SubsystemContainer::new(config))
    }

    /// As [`LedgerNode::new`], with `clock` driving consensus and rollup time.
    pub fn with_clock(config: NodeConfig, clock: Arc<ManualClock>) -> Result<Self, NodeError> {
        config.validate()?;
        Self::boot(SubsystemContainer::with_clock(config, clock))
    }

    fn boot(container: SubsystemContainer) -> Result<Self, NodeError> {
        for shard_id in container.config.shards.clone() {
            container.sharding.create_shard(shard_id)?;
        }
        info!(
            shards = container.config.shards.len(),
            validators = container.config.sharding.seed_validators.len(),
            "[node] Ledger node booted"
        );
        Ok(Self { container })
    }

    /// Spawn the rollup sweeper and the commitment anchor.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&self) -> BackgroundTasks {
        let tasks = BackgroundTasks {
            sweeper: self.container.rollup.spawn_sweeper(),
            anchor: self.container.anchor.spawn(),
        };
        info!("[node] Background tasks started");
        tasks
    }

    // === BLOCKS ===

    pub fn submit_block(&self, shard_id: ShardId, block: Block) -> Result<CommitReceipt, ShardError> {
        self.container.sharding.add_block_to_shard(shard_id, block)
    }

    pub fn get_chain_head(&self, shard_id: ShardId) -> Result<ChainHead, ShardError> {
        self.container.sharding.chain_head(shard_id)
    }

    /// Build the next block of `shard_id` from its pending transactions and submit it.
    pub fn produce_block(
        &self,
        shard_id: ShardId,
        signer: &dyn BlockSigner,
        timestamp: u64,
    ) -> Result<CommitReceipt, ShardError> {
        let block = self.container.sharding.build_block(shard_id, signer, timestamp)?;
        self.submit_block(shard_id, block)
    }

    // === SHARDS ===

    pub fn create_shard(&self, shard_id: ShardId) -> Result<ChainHead, ShardError> {
        self.container.sharding.create_shard(shard_id)
    }

    pub fn validate_shards(&self) -> Vec<ShardReport> {
        self.container.sharding.validate_shards()
    }

    pub fn recover_shard(&self, shard_id: ShardId) -> Result<ChainHead, ShardError> {
        self.container.sharding.recover_shard(shard_id)
    }

    pub fn global_state_root(&self) -> GlobalStateRoot {
        self.container.sharding.global_state_root()
    }

    // === TRANSACTIONS ===

    /// Queue a transaction on the shard that owns its primary account.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<ShardId, ShardError> {
        self.container.sharding.route_transaction(tx)
    }

    /// Decode a wire-encoded transaction and route it.
    pub fn submit_raw_transaction(&self, bytes: &[u8]) -> Result<ShardId, NodeError> {
        let tx = Transaction::decode(bytes)?;
        Ok(self.submit_transaction(tx)?)
    }

    // === ROLLUP ===

    /// Add transactions to the shard's rollup accumulator.
    ///
    /// Returns the id of the most recent batch this call finalized, or
    /// `None` while the accumulator is still filling.
    pub fn submit_batch(&self, shard_id: ShardId, transactions: Vec<Transaction>) -> BatchResult<Option<BatchId>> {
        let finalized = self.container.rollup.submit_batch(shard_id, transactions)?;
        Ok(finalized.last().map(|batch| batch.id))
    }

    /// Finalize whatever the shard's accumulator holds.
    pub fn flush_batch(&self, shard_id: ShardId) -> BatchResult<Option<BatchId>> {
        Ok(self.container.rollup.flush(shard_id)?.map(|batch| batch.id))
    }

    pub fn verify_batch(&self, batch_id: BatchId, proof: &BatchProof) -> BatchResult<BatchStatus> {
        self.container.rollup.verify_batch(batch_id, proof)
    }

    pub fn get_batch_status(&self, batch_id: BatchId) -> BatchResult<BatchStatus> {
        self.container.rollup.get_batch_status(batch_id)
    }

    pub fn get_batch(&self, batch_id: BatchId) -> BatchResult<Batch> {
        self.container.rollup.get_batch(batch_id)
    }

    /// Re-finalize a rejected batch's transactions under a new id.
    pub fn resubmit_batch(&self, batch_id: BatchId) -> BatchResult<BatchId> {
        Ok(self.container.rollup.resubmit_batch(batch_id)?.id)
    }

    // === ACCESSORS ===

    pub fn config(&self) -> &NodeConfig {
        &self.container.config
    }

    pub fn container(&self) -> &SubsystemContainer {
        &self.container
    }

    pub fn sharding(&self) -> &Arc<NodeSharding> {
        &self.container.sharding
    }

    pub fn rollup(&self) -> &Arc<NodeRollup> {
        &self.container.rollup
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.container.bus
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.container.bus.subscribe(filter)
    }
}
