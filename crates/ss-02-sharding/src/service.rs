//! # Sharding Manager
//!
//! Owns every shard exclusively. The shard map is read-mostly: it is
//! write-locked only to insert a shard, and readers clone the shard's `Arc`
//! and release the map before doing any work, so submissions to different
//! shards never contend.

use crate::adapters::NoopShardEvents;
use crate::algorithms::{compute_global_state_root, rendezvous_assign};
use crate::domain::{
    GlobalStateRoot, Shard, ShardError, ShardHealth, ShardReport, ShardStateRoot, ShardingConfig,
};
use crate::ports::{ShardEvent, ShardEventSink};
use parking_lot::RwLock;
use rayon::prelude::*;
use shared_types::{short_hex, Address, PublicKey, ShardId, Transaction};
use ss_01_consensus::{
    Block, BlockSigner, ChainHead, CommitReceipt, ConsensusDependencies, ConsensusEngine, EventBus,
    RegistrySnapshot, RemovalReason, SignatureVerifier, SystemTimeSource, TimeSource,
    ValidationError, Validator, ValidatorRegistry,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct ShardingManager<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    config: ShardingConfig,
    shards: RwLock<BTreeMap<ShardId, Arc<Shard<S, E>>>>,
    verifier: Arc<S>,
    event_bus: Arc<E>,
    shard_events: Arc<dyn ShardEventSink>,
    time_source: Arc<dyn TimeSource>,
}

impl<S, E> ShardingManager<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    /// `verifier` and `event_bus` are shared by every shard's engine.
    pub fn new(config: ShardingConfig, verifier: Arc<S>, event_bus: Arc<E>) -> Self {
        Self {
            config,
            shards: RwLock::new(BTreeMap::new()),
            verifier,
            event_bus,
            shard_events: Arc::new(NoopShardEvents),
            time_source: Arc::new(SystemTimeSource),
        }
    }

    pub fn with_shard_events(mut self, sink: Arc<dyn ShardEventSink>) -> Self {
        self.shard_events = sink;
        self
    }

    /// Clock handed to shards created afterwards.
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &ShardingConfig {
        &self.config
    }

    fn shard(&self, shard_id: ShardId) -> Result<Arc<Shard<S, E>>, ShardError> {
        self.shards
            .read()
            .get(&shard_id)
            .cloned()
            .ok_or(ShardError::NotFound(shard_id))
    }

    fn healthy_shard(&self, shard_id: ShardId) -> Result<Arc<Shard<S, E>>, ShardError> {
        let shard = self.shard(shard_id)?;
        if !shard.is_healthy() {
            return Err(ShardError::Corrupted(shard_id));
        }
        Ok(shard)
    }

    fn all_shards(&self) -> Vec<Arc<Shard<S, E>>> {
        self.shards.read().values().cloned().collect()
    }

    fn emit(&self, event: ShardEvent) {
        if let Err(e) = self.shard_events.publish(event) {
            warn!("[ss-02] Failed to publish shard event: {}", e);
        }
    }

    // === LIFECYCLE ===

    /// Create a shard with a fresh genesis block and the seed validators.
    pub fn create_shard(&self, shard_id: ShardId) -> Result<ChainHead, ShardError> {
        let mut registry = ValidatorRegistry::new();
        for seed in &self.config.seed_validators {
            registry.register(seed.address, seed.stake, seed.public_key.clone())?;
        }

        let head = {
            let mut shards = self.shards.write();
            if shards.contains_key(&shard_id) {
                return Err(ShardError::DuplicateShard(shard_id));
            }
            if shards.len() >= self.config.max_shards {
                return Err(ShardError::ShardLimit {
                    max: self.config.max_shards,
                });
            }

            let engine = ConsensusEngine::new(
                shard_id,
                registry,
                ConsensusDependencies {
                    verifier: Arc::clone(&self.verifier),
                    event_bus: Arc::clone(&self.event_bus),
                    config: self.config.consensus.clone(),
                },
            )
            .with_time_source(Arc::clone(&self.time_source));
            let head = engine.chain_head();
            shards.insert(shard_id, Arc::new(Shard::new(shard_id, engine)));
            head
        };

        info!(
            shard_id,
            validators = self.config.seed_validators.len(),
            "[ss-02] Shard created, genesis {}",
            short_hex(&head.hash)
        );
        self.emit(ShardEvent::Created {
            shard_id,
            genesis_hash: head.hash,
        });
        Ok(head)
    }

    pub fn shard_ids(&self) -> Vec<ShardId> {
        self.shards.read().keys().copied().collect()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.read().len()
    }

    pub fn health(&self, shard_id: ShardId) -> Result<ShardHealth, ShardError> {
        Ok(self.shard(shard_id)?.health())
    }

    // === BLOCKS ===

    /// Forward a block to its shard's engine.
    ///
    /// The health check here is a fast path; the engine re-checks its halt
    /// flag under the chain lock, so a shard quarantined mid-submission
    /// still refuses the block.
    pub fn add_block_to_shard(&self, shard_id: ShardId, block: Block) -> Result<CommitReceipt, ShardError> {
        let shard = self.healthy_shard(shard_id)?;
        match shard.engine().submit_block(block) {
            Err(ValidationError::ChainHalted(_)) => Err(ShardError::Corrupted(shard_id)),
            result => Ok(result?),
        }
    }

    pub fn chain_head(&self, shard_id: ShardId) -> Result<ChainHead, ShardError> {
        Ok(self.shard(shard_id)?.engine().chain_head())
    }

    pub fn block_at(&self, shard_id: ShardId, height: u64) -> Result<Option<Block>, ShardError> {
        Ok(self.shard(shard_id)?.engine().block_at(height))
    }

    pub fn build_block(
        &self,
        shard_id: ShardId,
        signer: &dyn BlockSigner,
        timestamp: u64,
    ) -> Result<Block, ShardError> {
        Ok(self.healthy_shard(shard_id)?.engine().build_block(signer, timestamp))
    }

    /// Mutate a stored block of `shard_id` in place, bypassing validation.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn tamper_block<F>(&self, shard_id: ShardId, height: u64, mutate: F) -> Result<bool, ShardError>
    where
        F: FnOnce(&mut Block),
    {
        Ok(self.shard(shard_id)?.engine().tamper_block(height, mutate))
    }

    /// Audit every shard from genesis, in parallel.
    ///
    /// Shards that fail are quarantined as `Corrupted`; shards already
    /// quarantined stay so even if they now pass.
    pub fn validate_shards(&self) -> Vec<ShardReport> {
        let reports: Vec<ShardReport> = self
            .all_shards()
            .par_iter()
            .map(|shard| {
                let audit = shard.engine().audit_and_halt();
                if let Some((height, fault)) = &audit.first_invalid {
                    if shard.mark_corrupted(*height, fault.clone()) {
                        error!(
                            shard_id = shard.id(),
                            height,
                            fault = ?fault,
                            "[ss-02] Shard failed integrity audit, quarantined"
                        );
                        self.emit(ShardEvent::Corrupted {
                            shard_id: shard.id(),
                            first_invalid_height: *height,
                        });
                    }
                }
                ShardReport {
                    shard_id: shard.id(),
                    head: shard.engine().chain_head(),
                    audit,
                }
            })
            .collect();

        let invalid = reports.iter().filter(|r| !r.is_valid()).count();
        info!(shards = reports.len(), invalid, "[ss-02] Shard audit complete");
        reports
    }

    /// Truncate a quarantined shard to its last valid block.
    ///
    /// Block rewards credited for the dropped blocks are taken back.
    pub fn recover_shard(&self, shard_id: ShardId) -> Result<ChainHead, ShardError> {
        let shard = self.shard(shard_id)?;
        if shard.is_healthy() {
            return Err(ShardError::NotCorrupted(shard_id));
        }

        let audit = shard.engine().audit();
        let Some(last_valid) = audit.last_valid_height() else {
            error!(shard_id, "[ss-02] Genesis block is invalid, shard cannot be recovered");
            return Err(ShardError::Unrecoverable(shard_id));
        };

        let head = shard.engine().truncate_to(last_valid);
        shard.mark_healthy();
        info!(shard_id, height = head.height, "[ss-02] Shard recovered");
        self.emit(ShardEvent::Recovered {
            shard_id,
            head_height: head.height,
        });
        Ok(head)
    }

    // === VALIDATORS ===

    pub fn register_validator(
        &self,
        shard_id: ShardId,
        address: Address,
        stake: u128,
        public_key: PublicKey,
    ) -> Result<(), ShardError> {
        Ok(self
            .shard(shard_id)?
            .engine()
            .register_validator(address, stake, public_key)?)
    }

    pub fn update_stake(&self, shard_id: ShardId, address: &Address, delta: i128) -> Result<u128, ShardError> {
        Ok(self.shard(shard_id)?.engine().update_stake(address, delta)?)
    }

    pub fn remove_validator(
        &self,
        shard_id: ShardId,
        address: &Address,
        reason: RemovalReason,
    ) -> Result<Validator, ShardError> {
        Ok(self.shard(shard_id)?.engine().remove_validator(address, reason)?)
    }

    pub fn delegate_stake(
        &self,
        shard_id: ShardId,
        delegator: Address,
        validator: &Address,
        amount: u128,
    ) -> Result<u128, ShardError> {
        Ok(self
            .shard(shard_id)?
            .engine()
            .delegate_stake(delegator, validator, amount)?)
    }

    pub fn revoke_delegation(
        &self,
        shard_id: ShardId,
        delegator: &Address,
        validator: &Address,
    ) -> Result<u128, ShardError> {
        Ok(self.shard(shard_id)?.engine().revoke_delegation(delegator, validator)?)
    }

    pub fn delegated_stake(&self, shard_id: ShardId, validator: &Address) -> Result<u128, ShardError> {
        Ok(self.shard(shard_id)?.engine().delegated_stake(validator)?)
    }

    pub fn delegators(&self, shard_id: ShardId, validator: &Address) -> Result<Vec<(Address, u128)>, ShardError> {
        Ok(self.shard(shard_id)?.engine().delegators(validator)?)
    }

    pub fn validator_snapshot(&self, shard_id: ShardId) -> Result<RegistrySnapshot, ShardError> {
        Ok(self.shard(shard_id)?.engine().snapshot())
    }

    pub fn expected_proposer(&self, shard_id: ShardId) -> Result<Address, ShardError> {
        Ok(self.shard(shard_id)?.engine().expected_proposer()?)
    }

    // === TRANSACTIONS ===

    /// Queue a transaction on the shard owning its primary account.
    pub fn route_transaction(&self, tx: Transaction) -> Result<ShardId, ShardError> {
        let shard_ids = self.shard_ids();
        let shard_id = rendezvous_assign(&tx.primary_account(), &shard_ids).ok_or(ShardError::NoShards)?;
        self.submit_transaction(shard_id, tx)?;
        Ok(shard_id)
    }

    /// Queue a transaction on a specific shard. Returns `false` for duplicates.
    pub fn submit_transaction(&self, shard_id: ShardId, tx: Transaction) -> Result<bool, ShardError> {
        Ok(self.healthy_shard(shard_id)?.engine().submit_transaction(tx)?)
    }

    pub fn pending_transactions(&self, shard_id: ShardId) -> Result<usize, ShardError> {
        Ok(self.shard(shard_id)?.engine().pending_transactions())
    }

    // === STATE ===

    pub fn shard_state_root(&self, shard_id: ShardId) -> Result<ShardStateRoot, ShardError> {
        let head = self.chain_head(shard_id)?;
        Ok(ShardStateRoot::new(shard_id, head.hash, head.height))
    }

    /// Merkle root over every shard head.
    pub fn global_state_root(&self) -> GlobalStateRoot {
        let roots: Vec<ShardStateRoot> = self
            .all_shards()
            .iter()
            .map(|shard| {
                let head = shard.engine().chain_head();
                ShardStateRoot::new(shard.id(), head.hash, head.height)
            })
            .collect();
        compute_global_state_root(&roots)
    }
}
