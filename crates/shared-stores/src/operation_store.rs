//! Anchored operation store.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ports::OperationStore;
use shared_types::{AnchoredOperation, StoreError};
use std::collections::HashMap;

/// In-memory operation store keyed by identifier suffix.
#[derive(Debug, Default)]
pub struct MemoryOperationStore {
    operations: RwLock<HashMap<String, Vec<AnchoredOperation>>>,
}

impl MemoryOperationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored operations.
    pub fn len(&self) -> usize {
        self.operations.read().values().map(Vec::len).sum()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OperationStore for MemoryOperationStore {
    async fn insert_or_replace(
        &self,
        operations: Vec<AnchoredOperation>,
    ) -> Result<(), StoreError> {
        let mut store = self.operations.write();
        for operation in operations {
            let entries = store
                .entry(operation.did_unique_suffix.clone())
                .or_default();
            entries.retain(|existing| existing.order_key() != operation.order_key());
            entries.push(operation);
        }
        Ok(())
    }

    async fn get(&self, did_unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError> {
        Ok(self
            .operations
            .read()
            .get(did_unique_suffix)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete(&self, transaction_number: Option<u64>) -> Result<(), StoreError> {
        let mut store = self.operations.write();
        match transaction_number {
            None => store.clear(),
            Some(last_kept) => {
                for entries in store.values_mut() {
                    entries.retain(|op| op.transaction_number <= last_kept);
                }
                store.retain(|_, entries| !entries.is_empty());
            }
        }
        Ok(())
    }
}
