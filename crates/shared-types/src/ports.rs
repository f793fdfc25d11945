//! # Outbound Ports
//!
//! Traits for the external collaborators of the node. Implementations live in
//! `shared-stores` (in-memory) or in the embedding application.
//!
//! | Port | Used by |
//! |------|---------|
//! | [`ContentAddressableStore`] | batch writer, transaction processor |
//! | [`BlockchainClient`] | batch writer, transaction processor |
//! | [`OperationQueue`] | operation pool, batch writer |
//! | [`OperationStore`] | transaction processor, resolver |
//! | [`ConfirmationStore`] | batch writer, observer |
//! | [`UnresolvableTransactionStore`] | observer |
//! | [`TimeSource`] | observer |

use crate::entities::{
    AnchoredOperation, BlockchainTime, ConfirmationRecord, QueuedOperation, Timestamp,
    Transaction, UnresolvableTransaction, ValueTimeLock,
};
use crate::errors::{BlockchainError, CasError, StoreError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Content-addressable storage for anchor files.
#[async_trait]
pub trait ContentAddressableStore: Send + Sync {
    /// Store `content` and return its URI.
    async fn write(&self, content: Vec<u8>) -> Result<String, CasError>;

    /// Read content of at most `max_size_in_bytes` bytes.
    async fn read(&self, uri: &str, max_size_in_bytes: usize) -> Result<Vec<u8>, CasError>;
}

/// The blockchain the node anchors to.
#[async_trait]
pub trait BlockchainClient: Send + Sync {
    /// Latest blockchain time.
    async fn get_latest_time(&self) -> Result<BlockchainTime, BlockchainError>;

    /// Normalized fee at `time`.
    async fn get_fee(&self, time: u64) -> Result<u64, BlockchainError>;

    /// Value time lock currently held by this node's writer, if any.
    async fn get_writer_value_time_lock(&self) -> Result<Option<ValueTimeLock>, BlockchainError>;

    /// Look up a value time lock by identifier.
    async fn get_value_time_lock(
        &self,
        identifier: &str,
    ) -> Result<Option<ValueTimeLock>, BlockchainError>;

    /// Write an anchor string paying `fee`.
    async fn write(&self, anchor_string: &str, fee: u64) -> Result<(), BlockchainError>;
}

/// FIFO queue of operations waiting to be batched.
#[async_trait]
pub trait OperationQueue: Send + Sync {
    /// Append an operation. Rejects a second entry for a queued identifier.
    async fn enqueue(
        &self,
        did_unique_suffix: &str,
        operation_buffer: Vec<u8>,
    ) -> Result<(), StoreError>;

    /// Read up to `count` operations from the head without removing them.
    async fn peek(&self, count: usize) -> Result<Vec<QueuedOperation>, StoreError>;

    /// Remove and return up to `count` operations from the head.
    async fn dequeue(&self, count: usize) -> Result<Vec<QueuedOperation>, StoreError>;

    /// Whether an operation for the identifier is queued.
    async fn contains(&self, did_unique_suffix: &str) -> Result<bool, StoreError>;
}

/// Store of anchored operations, keyed by identifier suffix.
#[async_trait]
pub trait OperationStore: Send + Sync {
    /// Insert operations, replacing any with the same suffix and ordering key.
    async fn insert_or_replace(&self, operations: Vec<AnchoredOperation>)
        -> Result<(), StoreError>;

    /// All operations of one identifier, in any order.
    async fn get(&self, did_unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError>;

    /// Delete operations anchored after `transaction_number`; `None` deletes all.
    async fn delete(&self, transaction_number: Option<u64>) -> Result<(), StoreError>;
}

/// Record of the batch writer's own submissions.
#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    /// Most recent submission, if any.
    async fn get_last_submitted(&self) -> Result<Option<ConfirmationRecord>, StoreError>;

    /// Record a submission at blockchain time `submitted_at`.
    async fn submit(&self, anchor_string: &str, submitted_at: u64) -> Result<(), StoreError>;

    /// Mark the submission with this anchor string as observed at `confirmed_at`.
    async fn confirm(&self, anchor_string: &str, confirmed_at: u64) -> Result<(), StoreError>;

    /// Clear confirmations later than `confirmed_at`; `None` leaves everything.
    async fn reset_after(&self, confirmed_at: Option<u64>) -> Result<(), StoreError>;
}

/// Transactions whose anchor files could not be fetched yet.
#[async_trait]
pub trait UnresolvableTransactionStore: Send + Sync {
    /// Record a failed fetch, scheduling the next retry.
    async fn record_unresolvable_transaction_fetch_attempt(
        &self,
        transaction: &Transaction,
        now: Timestamp,
    ) -> Result<(), StoreError>;

    /// Forget a transaction (resolved or permanently invalid).
    async fn remove_unresolvable_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<(), StoreError>;

    /// Transactions due at `now`, at most `max_count`, earliest first.
    async fn get_unresolvable_transactions_due_for_retry(
        &self,
        now: Timestamp,
        max_count: usize,
    ) -> Result<Vec<UnresolvableTransaction>, StoreError>;

    /// Remove transactions later than `transaction_number`; `None` removes all.
    async fn remove_unresolvable_transactions_later_than(
        &self,
        transaction_number: Option<u64>,
    ) -> Result<(), StoreError>;
}

/// Abstract time source for testability.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Bound a store query by `timeout_ms`.
pub async fn with_timeout<T, F>(timeout_ms: u64, query: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(Duration::from_millis(timeout_ms), query).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms, "Store query timed out");
            Err(StoreError::Timeout { timeout_ms })
        }
    }
}
