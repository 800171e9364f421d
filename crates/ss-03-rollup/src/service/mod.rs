//! Rollup Batch Processor
//!
//! Accumulates transactions per shard, finalizes them into Pending batches
//! and resolves batches against submitted proofs.
//!
//! # Locking
//! - Each shard has its own accumulator and ledger locks; shards never
//!   contend with each other.
//! - Lock order is accumulator, then ledger, then the batch table.
//! - Batch ids are assigned under the ledger lock, so within a shard ids
//!   follow finalization order.

use crate::domain::{
    compute_state_root, compute_transactions_root, Accumulator, Batch, BatchError, BatchProof,
    BatchResult, BatchStatus, RejectionReason, RollupConfig, ShardAnchor, ShardLedger, TxOutcome,
};
use crate::events::{BatchFinalizedEvent, BatchResolvedEvent};
use crate::ports::{EventBus, ProofVerifier, ShardStateProvider, SystemTimeSource, TimeSource};
use parking_lot::{Mutex, RwLock};
use shared_crypto::verify_transaction;
use shared_types::{short_hex, AccountState, Address, BatchId, Hash, ShardId, Transaction};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};


/// Dependencies for RollupBatchProcessor
pub struct RollupDependencies<V, P, E> {
    pub verifier: Arc<V>,
    pub shard_state: Arc<P>,
    pub event_bus: Arc<E>,
    pub config: RollupConfig,
}

#[derive(Default)]
struct ShardRollup {
    accumulator: Mutex<Accumulator>,
    ledger: Mutex<ShardLedger>,
}

/// What one sweep did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Batches finalized from stale accumulators
    pub finalized: Vec<BatchId>,
    /// Batches moved to Rejected, with the reason each got
    pub rejected: Vec<(BatchId, RejectionReason)>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.finalized.is_empty() && self.rejected.is_empty()
    }
}

pub struct RollupBatchProcessor<V, P, E>
where
    V: ProofVerifier,
    P: ShardStateProvider,
    E: EventBus,
{
    config: RollupConfig,
    shards: RwLock<BTreeMap<ShardId, Arc<ShardRollup>>>,
    batches: RwLock<BTreeMap<BatchId, Batch>>,
    next_batch_id: AtomicU64,
    verifier: Arc<V>,
    shard_state: Arc<P>,
    event_bus: Arc<E>,
    time_source: Arc<dyn TimeSource>,
}

impl<V, P, E> RollupBatchProcessor<V, P, E>
where
    V: ProofVerifier,
    P: ShardStateProvider,
    E: EventBus,
{
    pub fn new(deps: RollupDependencies<V, P, E>) -> Self {
        Self {
            config: deps.config,
            shards: RwLock::new(BTreeMap::new()),
            batches: RwLock::new(BTreeMap::new()),
            next_batch_id: AtomicU64::new(1),
            verifier: deps.verifier,
            shard_state: deps.shard_state,
            event_bus: deps.event_bus,
            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Set custom time source (for testing)
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &RollupConfig {
        &self.config
    }

    // === SUBMISSION ===

    /// Add transactions to the shard's accumulator.
    ///
    /// Every transaction is validated and transfer signatures are checked
    /// before any is accepted.
    /// A stale accumulator, or one the submission would overflow, is
    /// finalized first; the accumulator is finalized again once full.
    /// Returns the batches finalized by this call, oldest first.
    pub fn submit_batch(&self, shard_id: ShardId, transactions: Vec<Transaction>) -> BatchResult<Vec<Batch>> {
        if transactions.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        if transactions.len() > self.config.max_batch_size {
            return Err(BatchError::Oversize {
                count: transactions.len(),
                limit: self.config.max_batch_size,
            });
        }
        for (index, tx) in transactions.iter().enumerate() {
            tx.validate()
                .and_then(|()| verify_transaction(tx))
                .map_err(|source| BatchError::InvalidTransaction { index, source })?;
        }

        let anchor = self.anchor(shard_id)?;
        let rollup = self.shard_rollup(shard_id);
        let now = self.time_source.now();
        let mut finalized = Vec::new();

        let mut accumulator = rollup.accumulator.lock();
        let overflows = accumulator.len() + transactions.len() > self.config.max_batch_size;
        if !accumulator.is_empty() && (overflows || accumulator.is_stale(now, self.config.max_batch_age_secs)) {
            let sealed = accumulator.take();
            finalized.push(self.finalize(&rollup, anchor, sealed, now, None));
        }

        for tx in transactions {
            accumulator.push(tx, now);
        }
        if accumulator.len() >= self.config.max_batch_size {
            let sealed = accumulator.take();
            finalized.push(self.finalize(&rollup, anchor, sealed, now, None));
        } else {
            debug!(
                shard_id,
                pending = accumulator.len(),
                "[ss-03] Transactions accumulated"
            );
        }
        Ok(finalized)
    }

    /// Finalize the shard's accumulator now, if it holds anything.
    pub fn flush(&self, shard_id: ShardId) -> BatchResult<Option<Batch>> {
        let anchor = self.anchor(shard_id)?;
        let rollup = self.shard_rollup(shard_id);
        let mut accumulator = rollup.accumulator.lock();
        if accumulator.is_empty() {
            return Ok(None);
        }
        let sealed = accumulator.take();
        Ok(Some(self.finalize(&rollup, anchor, sealed, self.time_source.now(), None)))
    }

    /// Finalize a Rejected batch's transactions again under a new id.
    ///
    /// The old id stays Rejected.
    pub fn resubmit_batch(&self, batch_id: BatchId) -> BatchResult<Batch> {
        let (shard_id, transactions) = {
            let batches = self.batches.read();
            let batch = batches.get(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
            if !matches!(batch.status, BatchStatus::Rejected(_)) {
                return Err(BatchError::NotRejected(batch_id));
            }
            (batch.shard_id, batch.transactions.clone())
        };

        let anchor = self.anchor(shard_id)?;
        let rollup = self.shard_rollup(shard_id);
        let _accumulator = rollup.accumulator.lock();
        let batch = self.finalize(&rollup, anchor, transactions, self.time_source.now(), Some(batch_id));
        info!(
            batch_id = batch.id,
            resubmission_of = batch_id,
            "[ss-03] Rejected batch resubmitted"
        );
        Ok(batch)
    }

    /// Seal `transactions` into a Pending batch on top of the shard's tip.
    ///
    /// Called with the accumulator lock held.
    fn finalize(
        &self,
        rollup: &ShardRollup,
        anchor: ShardAnchor,
        transactions: Vec<Transaction>,
        now: u64,
        resubmission_of: Option<BatchId>,
    ) -> Batch {
        let transactions_root = compute_transactions_root(&transactions);

        let mut ledger = rollup.ledger.lock();
        let (prior_state_root, tip) = ledger.tip();
        let mut post = tip.clone();
        let outcomes: Vec<TxOutcome> = transactions
            .iter()
            .map(|tx| match post.apply(tx) {
                Ok(()) => TxOutcome::Applied,
                Err(e) => TxOutcome::Failed(e),
            })
            .collect();
        let state_root = compute_state_root(&transactions_root, &post.accounts_root());

        let id = self.next_batch_id.fetch_add(1, Ordering::SeqCst);
        ledger.push_pending(id, state_root, post);

        let batch = Batch {
            id,
            shard_id: anchor.shard_id,
            transactions,
            outcomes,
            prior_state_root,
            state_root,
            transactions_root,
            anchor,
            created_at: now,
            status: BatchStatus::Pending,
            resubmission_of,
        };
        self.batches.write().insert(id, batch.clone());
        drop(ledger);

        info!(
            batch_id = id,
            shard_id = anchor.shard_id,
            transactions = batch.transactions.len(),
            applied = batch.applied_count(),
            state_root = %short_hex(&state_root),
            "[ss-03] Batch finalized"
        );
        crate::metrics::record_batch_finalized();

        let event = BatchFinalizedEvent {
            batch_id: id,
            shard_id: anchor.shard_id,
            transaction_count: batch.transactions.len(),
            prior_state_root,
            state_root,
            anchor_height: anchor.height,
            anchor_hash: anchor.head_hash,
        };
        if let Err(e) = self.event_bus.publish_batch_finalized(event) {
            warn!(batch_id = id, "[ss-03] Failed to publish finalization: {}", e);
        }
        batch
    }

    // === VERIFICATION ===

    /// Resolve a Pending batch with `proof`.
    ///
    /// A terminal batch returns its cached status and `proof` is ignored.
    /// A batch past the proof timeout is Rejected(Timeout) without
    /// consulting the verifier. Fails with `OutOfOrder` while an earlier
    /// batch of the same shard is still Pending.
    pub fn verify_batch(&self, batch_id: BatchId, proof: &BatchProof) -> BatchResult<BatchStatus> {
        let shard_id = match self.cached_status(batch_id)? {
            (_, status) if status.is_terminal() => {
                debug!(batch_id, ?status, "[ss-03] Returning cached status");
                return Ok(status);
            }
            (shard_id, _) => shard_id,
        };
        let rollup = self
            .shards
            .read()
            .get(&shard_id)
            .cloned()
            .ok_or(BatchError::NotFound(batch_id))?;
        let now = self.time_source.now();

        let mut ledger = rollup.ledger.lock();
        // Status may have moved while the ledger lock was contended.
        let (statement, created_at) = {
            let batches = self.batches.read();
            let batch = batches.get(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
            if batch.status.is_terminal() {
                return Ok(batch.status);
            }
            (batch.statement(), batch.created_at)
        };

        if now.saturating_sub(created_at) >= self.config.proof_timeout_secs {
            self.reject(shard_id, &mut ledger, batch_id, RejectionReason::Timeout);
            return Ok(BatchStatus::Rejected(RejectionReason::Timeout));
        }
        if ledger.next_to_verify() != Some(batch_id)
            || statement.prior_state_root != ledger.committed_root()
        {
            return Err(BatchError::OutOfOrder(batch_id));
        }

        if !self.verifier.verify(&statement, proof) {
            self.reject(shard_id, &mut ledger, batch_id, RejectionReason::ProofInvalid);
            return Ok(BatchStatus::Rejected(RejectionReason::ProofInvalid));
        }

        ledger.commit(batch_id);
        if let Some(batch) = self.batches.write().get_mut(&batch_id) {
            batch.status = BatchStatus::Verified;
        }
        drop(ledger);

        info!(
            batch_id,
            shard_id,
            state_root = %short_hex(&statement.state_root),
            "[ss-03] Batch verified"
        );
        crate::metrics::record_batch_resolved("verified");
        self.publish_resolved(batch_id, shard_id, None);
        Ok(BatchStatus::Verified)
    }

    /// Reject `batch_id` and every later Pending batch of the shard.
    ///
    /// Called with the shard's ledger lock held. Returns every batch that
    /// changed status.
    fn reject(
        &self,
        shard_id: ShardId,
        ledger: &mut ShardLedger,
        batch_id: BatchId,
        reason: RejectionReason,
    ) -> Vec<(BatchId, RejectionReason)> {
        let descendants = ledger.discard_from(batch_id);
        let mut resolved = Vec::with_capacity(descendants.len() + 1);
        {
            let mut batches = self.batches.write();
            let targets = std::iter::once((batch_id, reason))
                .chain(descendants.into_iter().map(|id| (id, RejectionReason::ParentRejected)));
            for (id, reason) in targets {
                if let Some(batch) = batches.get_mut(&id) {
                    if !batch.status.is_terminal() {
                        batch.status = BatchStatus::Rejected(reason);
                        resolved.push((id, reason));
                    }
                }
            }
        }

        for &(id, reason) in &resolved {
            warn!(batch_id = id, shard_id, reason = reason.as_str(), "[ss-03] Batch rejected");
            crate::metrics::record_batch_resolved(reason.as_str());
            self.publish_resolved(id, shard_id, Some(reason));
        }
        resolved
    }

    fn publish_resolved(&self, batch_id: BatchId, shard_id: ShardId, rejection: Option<RejectionReason>) {
        let event = BatchResolvedEvent {
            batch_id,
            shard_id,
            rejection,
        };
        if let Err(e) = self.event_bus.publish_batch_resolved(event) {
            warn!(batch_id, "[ss-03] Failed to publish resolution: {}", e);
        }
    }

    // === QUERIES ===

    pub fn get_batch_status(&self, batch_id: BatchId) -> BatchResult<BatchStatus> {
        self.cached_status(batch_id).map(|(_, status)| status)
    }

    pub fn get_batch(&self, batch_id: BatchId) -> BatchResult<Batch> {
        self.batches
            .read()
            .get(&batch_id)
            .cloned()
            .ok_or(BatchError::NotFound(batch_id))
    }

    pub fn batch_count(&self) -> usize {
        self.batches.read().len()
    }

    /// Transactions waiting in the shard's accumulator.
    pub fn accumulated(&self, shard_id: ShardId) -> usize {
        self.shards
            .read()
            .get(&shard_id)
            .map_or(0, |rollup| rollup.accumulator.lock().len())
    }

    /// Root of the shard's last verified batch; zero before any.
    pub fn committed_state_root(&self, shard_id: ShardId) -> Hash {
        self.shards
            .read()
            .get(&shard_id)
            .map_or(shared_types::ZERO_HASH, |rollup| rollup.ledger.lock().committed_root())
    }

    /// Account as of the shard's last verified batch.
    pub fn account(&self, shard_id: ShardId, address: &Address) -> Option<AccountState> {
        let rollup = self.shards.read().get(&shard_id).cloned()?;
        let ledger = rollup.ledger.lock();
        ledger.committed().get(address).copied()
    }

    fn cached_status(&self, batch_id: BatchId) -> BatchResult<(ShardId, BatchStatus)> {
        self.batches
            .read()
            .get(&batch_id)
            .map(|batch| (batch.shard_id, batch.status))
            .ok_or(BatchError::NotFound(batch_id))
    }

    fn anchor(&self, shard_id: ShardId) -> BatchResult<ShardAnchor> {
        self.shard_state
            .shard_anchor(shard_id)
            .ok_or(BatchError::UnknownShard(shard_id))
    }

    fn shard_rollup(&self, shard_id: ShardId) -> Arc<ShardRollup> {
        if let Some(rollup) = self.shards.read().get(&shard_id) {
            return Arc::clone(rollup);
        }
        Arc::clone(self.shards.write().entry(shard_id).or_default())
    }

    // === SWEEPING ===

    /// Finalize stale accumulators and time out overdue Pending batches.
    pub fn sweep(&self, now: u64) -> SweepReport {
        let mut report = SweepReport::default();
        let shards: Vec<(ShardId, Arc<ShardRollup>)> = self
            .shards
            .read()
            .iter()
            .map(|(id, rollup)| (*id, Arc::clone(rollup)))
            .collect();

        for (shard_id, rollup) in shards {
            let mut accumulator = rollup.accumulator.lock();
            if accumulator.is_stale(now, self.config.max_batch_age_secs) {
                if let Some(anchor) = self.shard_state.shard_anchor(shard_id) {
                    let sealed = accumulator.take();
                    report.finalized.push(self.finalize(&rollup, anchor, sealed, now, None).id);
                }
            }
            drop(accumulator);

            let mut ledger = rollup.ledger.lock();
            let overdue = {
                let batches = self.batches.read();
                ledger.pending_ids().find(|id| {
                    batches.get(id).is_some_and(|batch| {
                        now.saturating_sub(batch.created_at) >= self.config.proof_timeout_secs
                    })
                })
            };
            if let Some(batch_id) = overdue {
                let resolved = self.reject(shard_id, &mut ledger, batch_id, RejectionReason::Timeout);
                report.rejected.extend(resolved);
            }
        }
        report
    }

    /// Run `sweep` on the configured interval until the processor is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()>
    where
        V: 'static,
        P: 'static,
        E: 'static,
    {
        let weak = Arc::downgrade(self);
        let period = Duration::from_millis(self.config.sweep_interval_ms.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(processor) = weak.upgrade() else {
                    debug!("[ss-03] Processor dropped, sweeper exiting");
                    break;
                };
                let report = processor.sweep(processor.time_source.now());
                if !report.is_empty() {
                    debug!(
                        finalized = report.finalized.len(),
                        rejected = report.rejected.len(),
                        "[ss-03] Sweep"
                    );
                }
            }
        })
    }
}
