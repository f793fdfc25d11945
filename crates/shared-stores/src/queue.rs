//! FIFO operation queue.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::ports::OperationQueue;
use shared_types::{QueuedOperation, StoreError};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<QueuedOperation>,
    suffixes: HashSet<String>,
}

/// In-memory queue holding at most one operation per identifier.
#[derive(Debug, Default)]
pub struct MemoryOperationQueue {
    state: Mutex<QueueState>,
    fail_next_dequeue: AtomicBool,
}

impl MemoryOperationQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the next `dequeue` fail without removing anything.
    pub fn fail_next_dequeue(&self) {
        self.fail_next_dequeue.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl OperationQueue for MemoryOperationQueue {
    async fn enqueue(
        &self,
        did_unique_suffix: &str,
        operation_buffer: Vec<u8>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        if !state.suffixes.insert(did_unique_suffix.to_string()) {
            return Err(StoreError::AlreadyQueued {
                did_unique_suffix: did_unique_suffix.to_string(),
            });
        }
        state.entries.push_back(QueuedOperation {
            did_unique_suffix: did_unique_suffix.to_string(),
            operation_buffer,
        });
        Ok(())
    }

    async fn peek(&self, count: usize) -> Result<Vec<QueuedOperation>, StoreError> {
        Ok(self.state.lock().entries.iter().take(count).cloned().collect())
    }

    async fn dequeue(&self, count: usize) -> Result<Vec<QueuedOperation>, StoreError> {
        if self.fail_next_dequeue.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory queue dequeue failed".into()));
        }
        let mut state = self.state.lock();
        let count = count.min(state.entries.len());
        let removed: Vec<QueuedOperation> = state.entries.drain(..count).collect();
        for operation in &removed {
            state.suffixes.remove(&operation.did_unique_suffix);
        }
        Ok(removed)
    }

    async fn contains(&self, did_unique_suffix: &str) -> Result<bool, StoreError> {
        Ok(self.state.lock().suffixes.contains(did_unique_suffix))
    }
}
