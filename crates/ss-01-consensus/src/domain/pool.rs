//! Pending transactions awaiting inclusion in a block

use super::PoolError;
use shared_crypto::verify_transaction;
use shared_types::{Hash, Transaction};
use std::collections::{HashSet, VecDeque};

/// FIFO pool of validated, signature-checked transactions, deduplicated by
/// hash.
#[derive(Debug)]
pub struct TransactionPool {
    pending: VecDeque<(Hash, Transaction)>,
    index: HashSet<Hash>,
    capacity: usize,
}

impl TransactionPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            index: HashSet::new(),
            capacity,
        }
    }

    /// Queue a transaction. Returns `false` if it was already pending.
    pub fn insert(&mut self, tx: Transaction) -> Result<bool, PoolError> {
        tx.validate()?;
        verify_transaction(&tx)?;
        let hash = tx.hash();
        if self.index.contains(&hash) {
            return Ok(false);
        }
        if self.pending.len() >= self.capacity {
            return Err(PoolError::Full {
                capacity: self.capacity,
            });
        }
        self.index.insert(hash);
        self.pending.push_back((hash, tx));
        Ok(true)
    }

    /// Oldest `max` transactions, left in the pool.
    pub fn peek(&self, max: usize) -> Vec<Transaction> {
        self.pending.iter().take(max).map(|(_, tx)| tx.clone()).collect()
    }

    /// Drop transactions that made it into a committed block.
    pub fn prune(&mut self, committed: &[Transaction]) {
        let committed: HashSet<Hash> = committed.iter().map(Transaction::hash).collect();
        if committed.is_empty() {
            return;
        }
        self.pending.retain(|(hash, _)| !committed.contains(hash));
        self.index.retain(|hash| !committed.contains(hash));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Ed25519KeyPair;
    use shared_types::TransactionError;

    fn mint(amount: u128) -> Transaction {
        Transaction::Mint {
            to: [1u8; 20],
            amount,
        }
    }

    #[test]
    fn test_dedup_and_order() {
        let mut pool = TransactionPool::new(10);
        assert_eq!(pool.insert(mint(1)), Ok(true));
        assert_eq!(pool.insert(mint(2)), Ok(true));
        assert_eq!(pool.insert(mint(1)), Ok(false));
        assert_eq!(pool.peek(10), vec![mint(1), mint(2)]);
        assert_eq!(pool.peek(1), vec![mint(1)]);
    }

    #[test]
    fn test_rejects_invalid_and_overflow() {
        let mut pool = TransactionPool::new(1);
        assert_eq!(
            pool.insert(mint(0)),
            Err(PoolError::Invalid(TransactionError::ZeroAmount))
        );
        pool.insert(mint(1)).unwrap();
        assert_eq!(pool.insert(mint(2)), Err(PoolError::Full { capacity: 1 }));
    }

    #[test]
    fn test_rejects_tampered_transfer() {
        let mut pool = TransactionPool::new(4);
        let sender = Ed25519KeyPair::from_seed([3u8; 32]);
        let signed = sender.sign_transfer([7u8; 20], 10, 1, 0);
        assert_eq!(pool.insert(signed.clone()), Ok(true));

        let mut redirected = signed;
        if let Transaction::Transfer { to, .. } = &mut redirected {
            *to = [8u8; 20];
        }
        assert_eq!(
            pool.insert(redirected),
            Err(PoolError::Invalid(TransactionError::BadSignature))
        );
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_prune_committed() {
        let mut pool = TransactionPool::new(10);
        for i in 1..=3 {
            pool.insert(mint(i)).unwrap();
        }
        pool.prune(&[mint(2)]);
        assert_eq!(pool.peek(10), vec![mint(1), mint(3)]);
        // Pruned transactions may be queued again.
        assert_eq!(pool.insert(mint(2)), Ok(true));
    }
}
