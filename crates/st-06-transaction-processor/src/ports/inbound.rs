//! # Inbound Ports

use crate::domain::{ObservationSummary, ProcessOutcome, TransactionProcessorError};
use async_trait::async_trait;
use shared_types::Transaction;

/// Turns one anchoring transaction into stored operations.
#[async_trait]
pub trait TransactionProcessorApi: Send + Sync {
    /// Download, validate, and store the operations of `transaction`.
    async fn process_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<ProcessOutcome, TransactionProcessorError>;
}

/// Follows the blockchain and keeps the stores in step with it.
#[async_trait]
pub trait ObserverApi: Send + Sync {
    /// Process newly observed transactions in order.
    async fn process_transactions(
        &self,
        transactions: &[Transaction],
    ) -> Result<ObservationSummary, TransactionProcessorError>;

    /// Re-process up to `max_count` unresolvable transactions that are due.
    async fn retry_unresolvable(
        &self,
        max_count: usize,
    ) -> Result<ObservationSummary, TransactionProcessorError>;

    /// Forget everything anchored after `last_valid`; `None` forgets all.
    async fn revert_to(
        &self,
        last_valid: Option<&Transaction>,
    ) -> Result<(), TransactionProcessorError>;
}
