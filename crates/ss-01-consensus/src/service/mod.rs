//! Consensus Engine - one chain instance
//!
//! Owns the validator registry, the chain, the transaction pool and the
//! slashing record for a single shard.
//!
//! # Locking
//! - The chain mutex is the single-writer commit lock; at most one append
//!   is in flight and concurrent proposals for a height race on it.
//! - Lock order is chain, then slashing/pool/rewards, then registry. The
//!   registry lock is never held while another lock is taken.
//! - Signature verification runs before the chain lock is taken.
//! - A failed audit halts the chain under the chain lock, so nothing commits
//!   between the audit and the halt.

use crate::domain::{
    derive_seed, Block, BlockHeader, Chain, ChainAudit, ChainHead, CommitReceipt,
    ConsensusConfig, PoolError, RegistrationError, RegistrySnapshot, RemovalReason,
    SelectionError, SlashingDB, StakeWeightedSelector, TransactionPool, ValidationError,
    ValidationResult, Validator, ValidatorRegistry,
};
use crate::events::{BlockCommittedEvent, BlockRejectedEvent, ValidatorSlashedEvent};
use crate::ports::{BlockSigner, EventBus, SignatureVerifier, SystemTimeSource, TimeSource};
use crate::validation::BlockValidator;
use parking_lot::{Mutex, RwLock};
use shared_types::{short_hex, Address, Hash, PublicKey, ShardId, Transaction};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};


/// Dependencies for ConsensusEngine
pub struct ConsensusDependencies<S, E> {
    pub verifier: Arc<S>,
    pub event_bus: Arc<E>,
    pub config: ConsensusConfig,
}

/// Consensus engine for one shard chain.
pub struct ConsensusEngine<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    shard_id: ShardId,
    config: ConsensusConfig,
    registry: RwLock<ValidatorRegistry>,
    chain: Mutex<Chain>,
    pool: Mutex<TransactionPool>,
    slashing: Mutex<SlashingDB>,
    /// height -> (proposer, reward) credited at commit
    rewards: Mutex<BTreeMap<u64, (Address, u128)>>,
    verifier: Arc<S>,
    event_bus: Arc<E>,
    time_source: Arc<dyn TimeSource>,
}

impl<S, E> ConsensusEngine<S, E>
where
    S: SignatureVerifier,
    E: EventBus,
{
    /// Create an engine whose chain holds only the genesis block.
    pub fn new(shard_id: ShardId, registry: ValidatorRegistry, deps: ConsensusDependencies<S, E>) -> Self {
        let chain = Chain::new(shard_id, deps.config.genesis_timestamp);
        let pool = TransactionPool::new(deps.config.max_pending_transactions);
        Self {
            shard_id,
            config: deps.config,
            registry: RwLock::new(registry),
            chain: Mutex::new(chain),
            pool: Mutex::new(pool),
            slashing: Mutex::new(SlashingDB::new(shard_id)),
            rewards: Mutex::new(BTreeMap::new()),
            verifier: deps.verifier,
            event_bus: deps.event_bus,
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn shard_id(&self) -> ShardId {
        self.shard_id
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    // === CHAIN ===

    pub fn chain_head(&self) -> ChainHead {
        self.chain.lock().head()
    }

    pub fn block_at(&self, height: u64) -> Option<Block> {
        self.chain.lock().block_at(height).cloned()
    }

    /// Run a block through the validation pipeline and append it.
    ///
    /// On rejection the chain is unchanged and the error names the failing
    /// check; `ValidationError::stage` gives the stage it fired at.
    pub fn submit_block(&self, block: Block) -> ValidationResult<CommitReceipt> {
        let started = Instant::now();
        let block_hash = block.hash();
        let height = block.header.height;

        BlockValidator::validate_structure(&block, &self.config)
            .map_err(|e| self.reject(height, block_hash, e))?;
        debug!(shard_id = self.shard_id, height, "[ss-01] Block structure ok");

        let key = self.registry.read().public_key(&block.header.proposer).cloned();
        BlockValidator::check_signature(&block, key.as_ref(), self.verifier.as_ref())
            .map_err(|e| self.reject(height, block_hash, e))?;
        debug!(shard_id = self.shard_id, height, "[ss-01] Signature verified");

        let mut chain = self.chain.lock();
        if chain.is_halted() {
            drop(chain);
            return Err(self.reject(height, block_hash, ValidationError::ChainHalted(self.shard_id)));
        }
        if let Err(err) = self.check_against_head(&chain, &block) {
            drop(chain);
            self.check_equivocation(&block.header, block_hash);
            return Err(self.reject(height, block_hash, err));
        }

        let receipt = self.commit(&mut chain, block, block_hash);
        drop(chain);

        crate::metrics::record_block_committed();
        crate::metrics::record_validation_latency(started.elapsed().as_secs_f64());
        Ok(receipt)
    }

    /// Proposer, link and merkle checks. Called with the chain lock held.
    fn check_against_head(&self, chain: &Chain, block: &Block) -> ValidationResult<()> {
        let snapshot = self.registry.read().snapshot();
        BlockValidator::check_proposer(&block.header, &snapshot)?;
        debug!(shard_id = self.shard_id, height = block.header.height, "[ss-01] Proposer eligible");

        BlockValidator::check_link(
            &block.header,
            self.shard_id,
            &chain.head(),
            self.time_source.now(),
            &self.config,
        )?;
        debug!(shard_id = self.shard_id, height = block.header.height, "[ss-01] Link checked");

        BlockValidator::check_merkle_root(block)
    }

    fn commit(&self, chain: &mut Chain, block: Block, block_hash: Hash) -> CommitReceipt {
        let header = block.header.clone();
        let transaction_count = block.transactions.len();

        self.pool.lock().prune(&block.transactions);
        chain.append(block);

        {
            let mut slashing = self.slashing.lock();
            slashing.record_commit(&header, block_hash);
            slashing.prune_before(header.height.saturating_sub(self.config.slashing_window));
        }

        self.credit_reward(header.height, &header.proposer);

        info!(
            shard_id = self.shard_id,
            height = header.height,
            txs = transaction_count,
            proposer = %short_hex(&header.proposer),
            "[ss-01] Block committed {}",
            short_hex(&block_hash)
        );

        // Published under the chain lock so subscribers see commits in order.
        let event = BlockCommittedEvent {
            shard_id: self.shard_id,
            height: header.height,
            block_hash,
            merkle_root: header.merkle_root,
            proposer: header.proposer,
            transaction_count,
            timestamp: header.timestamp,
        };
        if let Err(e) = self.event_bus.publish_block_committed(event) {
            warn!(shard_id = self.shard_id, "[ss-01] Failed to publish commit: {}", e);
        }

        CommitReceipt {
            shard_id: self.shard_id,
            height: header.height,
            block_hash,
        }
    }

    fn credit_reward(&self, height: u64, proposer: &Address) {
        let reward = self.config.block_reward;
        if reward == 0 {
            return;
        }
        let Ok(delta) = i128::try_from(reward) else {
            warn!("[ss-01] Block reward exceeds the stake delta range, not credited");
            return;
        };
        let mut rewards = self.rewards.lock();
        match self.registry.write().update_stake(proposer, delta) {
            Ok(_) => {
                rewards.insert(height, (*proposer, reward));
            }
            Err(e) => warn!(proposer = %short_hex(proposer), "[ss-01] Reward not credited: {}", e),
        }
    }

    /// Take back the rewards credited for blocks above `height`.
    fn reverse_rewards_above(&self, height: u64) {
        let reversed = self.rewards.lock().split_off(&(height + 1));
        for (dropped, (proposer, reward)) in reversed {
            let Ok(delta) = i128::try_from(reward) else {
                continue;
            };
            match self.registry.write().update_stake(&proposer, -delta) {
                Ok(stake) => debug!(
                    shard_id = self.shard_id,
                    height = dropped,
                    proposer = %short_hex(&proposer),
                    stake,
                    "[ss-01] Reward reversed"
                ),
                Err(e) => warn!(
                    shard_id = self.shard_id,
                    height = dropped,
                    proposer = %short_hex(&proposer),
                    "[ss-01] Reward not reversed: {}",
                    e
                ),
            }
        }
    }

    /// Slash the proposer if it already committed a different block at this
    /// height on the same parent. Only reached for blocks whose signature
    /// verified; blocks addressed to another shard never count.
    fn check_equivocation(&self, header: &BlockHeader, block_hash: Hash) {
        if header.shard_id != self.shard_id {
            return;
        }
        let evidence = {
            let mut slashing = self.slashing.lock();
            match slashing.check_conflict(header, block_hash) {
                Some(_) => slashing.drain_pending(),
                None => return,
            }
        };

        for evidence in evidence {
            if let Err(e) = self
                .registry
                .write()
                .remove(&evidence.validator, RemovalReason::Slashed)
            {
                warn!(validator = %short_hex(&evidence.validator), "[ss-01] Slashing skipped: {}", e);
                continue;
            }

            crate::metrics::record_validator_slashed();
            warn!(
                shard_id = self.shard_id,
                height = evidence.height,
                validator = %short_hex(&evidence.validator),
                "[ss-01] Validator slashed for equivocation"
            );
            if let Err(e) = self
                .event_bus
                .publish_validator_slashed(ValidatorSlashedEvent { evidence })
            {
                warn!(shard_id = self.shard_id, "[ss-01] Failed to publish slashing: {}", e);
            }
        }
    }

    fn reject(&self, height: u64, block_hash: Hash, error: ValidationError) -> ValidationError {
        warn!(
            shard_id = self.shard_id,
            height,
            stage = ?error.stage(),
            reason = error.reason(),
            "[ss-01] Block rejected: {}",
            error
        );
        crate::metrics::record_block_rejected(error.reason());

        let event = BlockRejectedEvent {
            shard_id: self.shard_id,
            height,
            block_hash,
            stage: error.stage(),
            reason: error.to_string(),
        };
        if let Err(e) = self.event_bus.publish_block_rejected(event) {
            warn!(shard_id = self.shard_id, "[ss-01] Failed to publish rejection: {}", e);
        }
        error
    }

    /// Re-verify every stored block from genesis.
    ///
    /// Keys are resolved regardless of validator status so blocks by since
    /// exited or slashed proposers still verify.
    pub fn audit(&self) -> ChainAudit {
        self.audit_locked(&self.chain.lock())
    }

    /// Audit and, if any block fails, halt the chain before the lock is
    /// released. A halted chain refuses blocks with `ChainHalted` until
    /// `truncate_to` runs.
    pub fn audit_and_halt(&self) -> ChainAudit {
        let mut chain = self.chain.lock();
        let audit = self.audit_locked(&chain);
        if !audit.is_valid() && !chain.is_halted() {
            chain.halt();
            warn!(shard_id = self.shard_id, "[ss-01] Chain halted after failed audit");
        }
        audit
    }

    fn audit_locked(&self, chain: &Chain) -> ChainAudit {
        let registry = self.registry.read();
        chain.audit(
            |hash, block, key| self.verifier.verify(hash, &block.signature, key),
            |address| registry.public_key(address).cloned(),
        )
    }

    pub fn is_halted(&self) -> bool {
        self.chain.lock().is_halted()
    }

    /// Drop every block above `height`, forget their slashing records and
    /// take back their block rewards. Lifts a halt.
    pub fn truncate_to(&self, height: u64) -> ChainHead {
        let mut chain = self.chain.lock();
        chain.truncate(height);
        let head = chain.head();
        self.slashing.lock().forget_from(head.height + 1);
        self.reverse_rewards_above(head.height);
        info!(shard_id = self.shard_id, height = head.height, "[ss-01] Chain truncated");
        head
    }

    /// Mutate a stored block in place, bypassing validation.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn tamper_block<F>(&self, height: u64, mutate: F) -> bool
    where
        F: FnOnce(&mut Block),
    {
        match self.chain.lock().block_mut(height) {
            Some(block) => {
                mutate(block);
                true
            }
            None => false,
        }
    }

    // === VALIDATORS ===

    pub fn register_validator(
        &self,
        address: Address,
        stake: u128,
        public_key: PublicKey,
    ) -> Result<(), RegistrationError> {
        self.registry.write().register(address, stake, public_key)?;
        info!(shard_id = self.shard_id, validator = %short_hex(&address), stake, "[ss-01] Validator registered");
        Ok(())
    }

    pub fn update_stake(&self, address: &Address, delta: i128) -> Result<u128, RegistrationError> {
        self.registry.write().update_stake(address, delta)
    }

    pub fn remove_validator(
        &self,
        address: &Address,
        reason: RemovalReason,
    ) -> Result<Validator, RegistrationError> {
        let removed = self.registry.write().remove(address, reason)?;
        info!(shard_id = self.shard_id, validator = %short_hex(address), status = ?removed.status, "[ss-01] Validator removed");
        Ok(removed)
    }

    /// Bond stake to a validator; it weighs into selection from the next
    /// block on. Returns the delegator's total bond with that validator.
    pub fn delegate_stake(
        &self,
        delegator: Address,
        validator: &Address,
        amount: u128,
    ) -> Result<u128, RegistrationError> {
        let bonded = self.registry.write().delegate_stake(delegator, validator, amount)?;
        info!(
            shard_id = self.shard_id,
            delegator = %short_hex(&delegator),
            validator = %short_hex(validator),
            amount,
            bonded,
            "[ss-01] Stake delegated"
        );
        Ok(bonded)
    }

    pub fn revoke_delegation(&self, delegator: &Address, validator: &Address) -> Result<u128, RegistrationError> {
        let released = self.registry.write().revoke_delegation(delegator, validator)?;
        if released > 0 {
            info!(
                shard_id = self.shard_id,
                delegator = %short_hex(delegator),
                validator = %short_hex(validator),
                released,
                "[ss-01] Delegation revoked"
            );
        }
        Ok(released)
    }

    pub fn delegated_stake(&self, validator: &Address) -> Result<u128, RegistrationError> {
        self.registry.read().delegated_stake(validator)
    }

    pub fn delegators(&self, validator: &Address) -> Result<Vec<(Address, u128)>, RegistrationError> {
        self.registry.read().delegators(validator)
    }

    pub fn validator(&self, address: &Address) -> Option<Validator> {
        self.registry.read().get(address).cloned()
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.read().snapshot()
    }

    /// Proposer selected for the block on top of the current head.
    pub fn expected_proposer(&self) -> Result<Address, SelectionError> {
        let head = self.chain.lock().head();
        let snapshot = self.registry.read().snapshot();
        let seed = derive_seed(head.height + 1, &head.hash);
        StakeWeightedSelector::select(&snapshot, seed).map(|entry| entry.address)
    }

    pub fn total_slashings(&self) -> u64 {
        self.slashing.lock().total_slashings()
    }

    // === TRANSACTIONS ===

    /// Queue a transaction for a later block. Returns `false` for duplicates.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<bool, PoolError> {
        self.pool.lock().insert(tx)
    }

    pub fn pending_transactions(&self) -> usize {
        self.pool.lock().len()
    }

    /// Build and sign the next block from pending transactions.
    ///
    /// Transactions stay pooled until the block commits.
    pub fn build_block(&self, signer: &dyn BlockSigner, timestamp: u64) -> Block {
        let head = self.chain.lock().head();
        let transactions = self.pool.lock().peek(self.config.max_txs_per_block);
        let header = BlockHeader {
            shard_id: self.shard_id,
            height: head.height + 1,
            previous_hash: head.hash,
            merkle_root: Block::compute_merkle_root(&transactions),
            timestamp,
            proposer: signer.address(),
        };
        let signature = signer.sign(&header.hash());
        Block {
            header,
            transactions,
            signature,
        }
    }
}
