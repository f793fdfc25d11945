//! Retry bookkeeping for transactions with unreachable files.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ports::UnresolvableTransactionStore;
use shared_types::{StoreError, Timestamp, Transaction, UnresolvableTransaction};
use std::collections::BTreeMap;

/// Default delay factor: one minute.
pub const DEFAULT_RETRY_DELAY_FACTOR_MS: u64 = 60_000;

/// In-memory unresolvable transaction store keyed by transaction number.
#[derive(Debug)]
pub struct MemoryUnresolvableTransactionStore {
    retry_delay_factor_ms: u64,
    records: RwLock<BTreeMap<u64, UnresolvableTransaction>>,
}

impl Default for MemoryUnresolvableTransactionStore {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAY_FACTOR_MS)
    }
}

impl MemoryUnresolvableTransactionStore {
    /// Create a store with the given exponential backoff factor.
    pub fn new(retry_delay_factor_ms: u64) -> Self {
        Self {
            retry_delay_factor_ms,
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Current record of a transaction.
    pub fn get(&self, transaction_number: u64) -> Option<UnresolvableTransaction> {
        self.records.read().get(&transaction_number).cloned()
    }

    /// Number of tracked transactions.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UnresolvableTransactionStore for MemoryUnresolvableTransactionStore {
    async fn record_unresolvable_transaction_fetch_attempt(
        &self,
        transaction: &Transaction,
        now: Timestamp,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write();
        match records.get_mut(&transaction.transaction_number) {
            Some(record) => record.record_failed_attempt(self.retry_delay_factor_ms),
            None => {
                records.insert(
                    transaction.transaction_number,
                    UnresolvableTransaction::first_attempt(transaction.clone(), now),
                );
            }
        }
        Ok(())
    }

    async fn remove_unresolvable_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<(), StoreError> {
        self.records.write().remove(&transaction.transaction_number);
        Ok(())
    }

    async fn get_unresolvable_transactions_due_for_retry(
        &self,
        now: Timestamp,
        max_count: usize,
    ) -> Result<Vec<UnresolvableTransaction>, StoreError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|record| record.next_retry_time <= now)
            .take(max_count)
            .cloned()
            .collect())
    }

    async fn remove_unresolvable_transactions_later_than(
        &self,
        transaction_number: Option<u64>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write();
        match transaction_number {
            None => records.clear(),
            Some(last_kept) => records.retain(|number, _| *number <= last_kept),
        }
        Ok(())
    }
}
