//! Account ledgers
//!
//! `AccountLedger` applies transactions to balances. `ShardLedger` keeps a
//! shard's committed (verified) ledger plus the speculative post-states of
//! its Pending batches, newest last; the newest is the tip new batches
//! build on.

use super::ApplyError;
use serde::{Deserialize, Serialize};
use shared_crypto::compute_merkle_root;
use shared_types::{AccountState, Address, BatchId, Hash, Transaction, ZERO_HASH};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    accounts: BTreeMap<Address, AccountState>,
}

impl AccountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &Address) -> Option<&AccountState> {
        self.accounts.get(address)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Apply one transaction; on error the ledger is unchanged.
    ///
    /// Transfers burn their fee and bump the sender's nonce. Data
    /// transactions only reference an off-chain payload.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), ApplyError> {
        match tx {
            Transaction::Mint { to, amount } => {
                let account = self.accounts.entry(*to).or_default();
                account.balance = account
                    .balance
                    .checked_add(*amount)
                    .ok_or(ApplyError::BalanceOverflow)?;
                Ok(())
            }
            Transaction::Transfer {
                from,
                to,
                amount,
                fee,
                nonce,
                ..
            } => {
                let sender = self.accounts.get(from).copied().unwrap_or_default();
                if sender.nonce != *nonce {
                    return Err(ApplyError::NonceMismatch {
                        expected: sender.nonce,
                        actual: *nonce,
                    });
                }
                let needed = amount.checked_add(*fee).ok_or(ApplyError::BalanceOverflow)?;
                if sender.balance < needed {
                    return Err(ApplyError::InsufficientBalance {
                        needed,
                        available: sender.balance,
                    });
                }
                let recipient = self.accounts.get(to).copied().unwrap_or_default();
                let credited = recipient
                    .balance
                    .checked_add(*amount)
                    .ok_or(ApplyError::BalanceOverflow)?;

                self.accounts.insert(
                    *from,
                    AccountState {
                        balance: sender.balance - needed,
                        nonce: sender.nonce + 1,
                    },
                );
                self.accounts.insert(
                    *to,
                    AccountState {
                        balance: credited,
                        nonce: recipient.nonce,
                    },
                );
                Ok(())
            }
            Transaction::Data { .. } => Ok(()),
        }
    }

    /// Merkle root over account leaves in address order.
    pub fn accounts_root(&self) -> Hash {
        let leaves: Vec<Hash> = self
            .accounts
            .iter()
            .map(|(address, state)| state.leaf_hash(address))
            .collect();
        compute_merkle_root(&leaves)
    }
}

/// Committed ledger and pending post-states of one shard.
#[derive(Debug)]
pub struct ShardLedger {
    committed: AccountLedger,
    committed_root: Hash,
    pending: BTreeMap<BatchId, (Hash, AccountLedger)>,
}

impl Default for ShardLedger {
    fn default() -> Self {
        Self {
            committed: AccountLedger::new(),
            committed_root: ZERO_HASH,
            pending: BTreeMap::new(),
        }
    }
}

impl ShardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> &AccountLedger {
        &self.committed
    }

    pub fn committed_root(&self) -> Hash {
        self.committed_root
    }

    /// State root and ledger new batches build on.
    pub fn tip(&self) -> (Hash, &AccountLedger) {
        match self.pending.values().next_back() {
            Some((root, ledger)) => (*root, ledger),
            None => (self.committed_root, &self.committed),
        }
    }

    pub fn push_pending(&mut self, batch_id: BatchId, state_root: Hash, ledger: AccountLedger) {
        self.pending.insert(batch_id, (state_root, ledger));
    }

    /// Pending batch ids, oldest first.
    pub fn pending_ids(&self) -> impl Iterator<Item = BatchId> + '_ {
        self.pending.keys().copied()
    }

    /// Oldest Pending batch, the only one that can be verified next.
    pub fn next_to_verify(&self) -> Option<BatchId> {
        self.pending.keys().next().copied()
    }

    /// Promote the oldest Pending batch to committed.
    pub fn commit(&mut self, batch_id: BatchId) -> bool {
        if self.next_to_verify() != Some(batch_id) {
            return false;
        }
        match self.pending.remove(&batch_id) {
            Some((root, ledger)) => {
                self.committed = ledger;
                self.committed_root = root;
                true
            }
            None => false,
        }
    }

    /// Drop `batch_id` and every later pending post-state.
    ///
    /// Returns the later batch ids, which were built on the dropped one.
    pub fn discard_from(&mut self, batch_id: BatchId) -> Vec<BatchId> {
        let dropped = self.pending.split_off(&batch_id);
        dropped.into_keys().filter(|id| *id != batch_id).collect()
    }
}
