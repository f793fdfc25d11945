//! Batch writer submission log.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ports::ConfirmationStore;
use shared_types::{ConfirmationRecord, StoreError};

/// In-memory confirmation store holding only the most recent submission.
#[derive(Debug, Default)]
pub struct MemoryConfirmationStore {
    last: RwLock<Option<ConfirmationRecord>>,
}

impl MemoryConfirmationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows; at most one.
    pub fn records(&self) -> Vec<ConfirmationRecord> {
        self.last.read().iter().cloned().collect()
    }
}

#[async_trait]
impl ConfirmationStore for MemoryConfirmationStore {
    async fn get_last_submitted(&self) -> Result<Option<ConfirmationRecord>, StoreError> {
        Ok(self.last.read().clone())
    }

    async fn submit(&self, anchor_string: &str, submitted_at: u64) -> Result<(), StoreError> {
        *self.last.write() = Some(ConfirmationRecord {
            anchor_string: anchor_string.to_string(),
            submitted_at,
            confirmed_at: None,
        });
        Ok(())
    }

    async fn confirm(&self, anchor_string: &str, confirmed_at: u64) -> Result<(), StoreError> {
        if let Some(record) = self
            .last
            .write()
            .as_mut()
            .filter(|record| record.anchor_string == anchor_string)
        {
            record.confirmed_at = Some(confirmed_at);
        }
        Ok(())
    }

    async fn reset_after(&self, confirmed_at: Option<u64>) -> Result<(), StoreError> {
        let Some(limit) = confirmed_at else {
            return Ok(());
        };
        if let Some(record) = self.last.write().as_mut() {
            if record.confirmed_at.is_some_and(|at| at > limit) {
                record.confirmed_at = None;
            }
        }
        Ok(())
    }
}
