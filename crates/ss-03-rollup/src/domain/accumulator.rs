//! In-flight transactions of one shard

use shared_types::Transaction;

#[derive(Debug, Default)]
pub struct Accumulator {
    transactions: Vec<Transaction>,
    opened_at: Option<u64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tx: Transaction, now: u64) {
        self.opened_at.get_or_insert(now);
        self.transactions.push(tx);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Open for at least `max_age` seconds.
    pub fn is_stale(&self, now: u64, max_age: u64) -> bool {
        self.opened_at
            .is_some_and(|opened| now.saturating_sub(opened) >= max_age)
    }

    /// Swap the contents for a fresh, empty accumulator.
    pub fn take(&mut self) -> Vec<Transaction> {
        self.opened_at = None;
        std::mem::take(&mut self.transactions)
    }
}
