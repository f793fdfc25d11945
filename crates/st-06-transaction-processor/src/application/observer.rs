//! # Observer Service
//!
//! Feeds observed transactions to the [`TransactionProcessor`] and keeps
//! the bookkeeping stores in step:
//!
//! - every observed anchor string confirms a matching batch writer submission
//! - transactions whose files are missing are scheduled for retry
//! - a blockchain reorganization reverts everything after the last valid
//!   transaction

use crate::application::TransactionProcessor;
use crate::config::TransactionProcessorConfig;
use crate::domain::{ObservationSummary, ProcessOutcome, TransactionProcessorError};
use crate::ports::ObserverApi;
use async_trait::async_trait;
use shared_types::ports::{
    with_timeout, ConfirmationStore, OperationStore, TimeSource, UnresolvableTransactionStore,
};
use shared_types::Transaction;
use std::sync::Arc;
use tracing::{debug, info};

/// Observer - drives transaction processing and retries.
pub struct Observer {
    config: TransactionProcessorConfig,
    processor: Arc<TransactionProcessor>,
    operation_store: Arc<dyn OperationStore>,
    confirmation_store: Arc<dyn ConfirmationStore>,
    unresolvable_store: Arc<dyn UnresolvableTransactionStore>,
    time_source: Arc<dyn TimeSource>,
}

impl Observer {
    /// Create a new observer.
    pub fn new(
        config: TransactionProcessorConfig,
        processor: Arc<TransactionProcessor>,
        operation_store: Arc<dyn OperationStore>,
        confirmation_store: Arc<dyn ConfirmationStore>,
        unresolvable_store: Arc<dyn UnresolvableTransactionStore>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            processor,
            operation_store,
            confirmation_store,
            unresolvable_store,
            time_source,
        }
    }

    /// Process newly observed transactions in order.
    pub async fn process_transactions(
        &self,
        transactions: &[Transaction],
    ) -> Result<ObservationSummary, TransactionProcessorError> {
        let timeout = self.config.query_timeout_ms;
        let mut summary = ObservationSummary::default();
        for transaction in transactions {
            with_timeout(
                timeout,
                self.confirmation_store
                    .confirm(&transaction.anchor_string, transaction.transaction_time),
            )
            .await?;
            let outcome = self.processor.process_transaction(transaction).await?;
            self.settle(transaction, outcome).await?;
            summary.record(outcome);
        }
        info!(
            transactions = transactions.len(),
            processed = summary.processed,
            invalid = summary.invalid,
            retry_later = summary.retry_later,
            "Observed transactions"
        );
        Ok(summary)
    }

    /// Re-process unresolvable transactions that are due.
    ///
    /// At most `max_count`, further capped by
    /// `max_unresolvable_retries_per_poll`.
    pub async fn retry_unresolvable(
        &self,
        max_count: usize,
    ) -> Result<ObservationSummary, TransactionProcessorError> {
        let max_count = max_count.min(self.config.max_unresolvable_retries_per_poll);
        let due = with_timeout(
            self.config.query_timeout_ms,
            self.unresolvable_store
                .get_unresolvable_transactions_due_for_retry(self.time_source.now(), max_count),
        )
        .await?;

        let mut summary = ObservationSummary::default();
        for record in &due {
            debug!(
                transaction_number = record.transaction.transaction_number,
                retry_attempts = record.retry_attempts,
                "Retrying unresolvable transaction"
            );
            let outcome = self.processor.process_transaction(&record.transaction).await?;
            self.settle(&record.transaction, outcome).await?;
            summary.record(outcome);
        }
        if !due.is_empty() {
            info!(
                retried = due.len(),
                resolved = summary.processed,
                invalid = summary.invalid,
                still_unresolvable = summary.retry_later,
                "Retried unresolvable transactions"
            );
        }
        Ok(summary)
    }

    /// Forget everything anchored after `last_valid`; `None` forgets all.
    pub async fn revert_to(
        &self,
        last_valid: Option<&Transaction>,
    ) -> Result<(), TransactionProcessorError> {
        let timeout = self.config.query_timeout_ms;
        let transaction_number = last_valid.map(|tx| tx.transaction_number);
        with_timeout(timeout, self.operation_store.delete(transaction_number)).await?;
        with_timeout(
            timeout,
            self.unresolvable_store
                .remove_unresolvable_transactions_later_than(transaction_number),
        )
        .await?;
        with_timeout(
            timeout,
            self.confirmation_store
                .reset_after(last_valid.map(|tx| tx.transaction_time)),
        )
        .await?;
        info!(?transaction_number, "Reverted to last valid transaction");
        Ok(())
    }

    async fn settle(
        &self,
        transaction: &Transaction,
        outcome: ProcessOutcome,
    ) -> Result<(), TransactionProcessorError> {
        let timeout = self.config.query_timeout_ms;
        match outcome {
            ProcessOutcome::Processed { .. } | ProcessOutcome::Invalid(_) => {
                with_timeout(
                    timeout,
                    self.unresolvable_store
                        .remove_unresolvable_transaction(transaction),
                )
                .await?;
            }
            ProcessOutcome::RetryLater => {
                with_timeout(
                    timeout,
                    self.unresolvable_store.record_unresolvable_transaction_fetch_attempt(
                        transaction,
                        self.time_source.now(),
                    ),
                )
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ObserverApi for Observer {
    async fn process_transactions(
        &self,
        transactions: &[Transaction],
    ) -> Result<ObservationSummary, TransactionProcessorError> {
        Observer::process_transactions(self, transactions).await
    }

    async fn retry_unresolvable(
        &self,
        max_count: usize,
    ) -> Result<ObservationSummary, TransactionProcessorError> {
        Observer::retry_unresolvable(self, max_count).await
    }

    async fn revert_to(
        &self,
        last_valid: Option<&Transaction>,
    ) -> Result<(), TransactionProcessorError> {
        Observer::revert_to(self, last_valid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{created, encode, transaction, EncodedBatch};
    use shared_stores::{
        ManualTimeSource, MemoryCas, MemoryConfirmationStore, MemoryOperationStore,
        MemoryUnresolvableTransactionStore, MockBlockchain,
    };
    use shared_types::ProtocolParameters;

    struct Harness {
        cas: Arc<MemoryCas>,
        operations: Arc<MemoryOperationStore>,
        confirmations: Arc<MemoryConfirmationStore>,
        unresolvable: Arc<MemoryUnresolvableTransactionStore>,
        clock: Arc<ManualTimeSource>,
        observer: Observer,
    }

    fn harness() -> Harness {
        let config = TransactionProcessorConfig::for_testing();
        let cas = Arc::new(MemoryCas::new());
        let operations = Arc::new(MemoryOperationStore::new());
        let confirmations = Arc::new(MemoryConfirmationStore::new());
        let unresolvable = Arc::new(MemoryUnresolvableTransactionStore::new(
            config.unresolvable_retry_delay_factor_ms,
        ));
        let clock = Arc::new(ManualTimeSource::new(1_000));
        let processor = Arc::new(TransactionProcessor::new(
            config.clone(),
            ProtocolParameters::default(),
            cas.clone(),
            Arc::new(MockBlockchain::new(100, 1_000)),
            operations.clone(),
        ));
        let observer = Observer::new(
            config,
            processor,
            operations.clone(),
            confirmations.clone(),
            unresolvable.clone(),
            clock.clone(),
        );
        Harness {
            cas,
            operations,
            confirmations,
            unresolvable,
            clock,
            observer,
        }
    }

    fn anchoring(number: u64, time: u64, batch: &EncodedBatch) -> Transaction {
        Transaction {
            anchor_string: batch.anchor_string(),
            ..transaction(number, time)
        }
    }

    #[tokio::test]
    async fn test_confirms_own_submission() {
        let h = harness();
        let batch = encode(&[created(1)], &[], &[], &[], None);
        batch.publish(&h.cas).await;
        h.confirmations.submit(&batch.anchor_string(), 40).await.unwrap();

        let summary = h
            .observer
            .process_transactions(&[anchoring(1, 42, &batch)])
            .await
            .unwrap();
        assert_eq!(summary.processed, 1);
        let last = h.confirmations.get_last_submitted().await.unwrap().unwrap();
        assert_eq!(last.confirmed_at, Some(42));
    }

    #[tokio::test]
    async fn test_unresolvable_transaction_is_retried_until_resolved() {
        let h = harness();
        let batch = encode(&[created(1)], &[], &[], &[], None);
        let tx = anchoring(5, 42, &batch);

        let summary = h.observer.process_transactions(&[tx.clone()]).await.unwrap();
        assert_eq!(summary.retry_later, 1);
        let record = h.unresolvable.get(5).unwrap();
        assert_eq!(record.retry_attempts, 0);
        assert_eq!(record.next_retry_time, 1_000);

        // Still missing: the next attempt backs off by the delay factor.
        let summary = h.observer.retry_unresolvable(10).await.unwrap();
        assert_eq!(summary.retry_later, 1);
        let record = h.unresolvable.get(5).unwrap();
        assert_eq!(record.retry_attempts, 1);
        assert_eq!(record.next_retry_time, 1_100);

        batch.publish(&h.cas).await;
        let summary = h.observer.retry_unresolvable(10).await.unwrap();
        assert_eq!(summary, ObservationSummary::default());

        h.clock.advance(100);
        let summary = h.observer.retry_unresolvable(10).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert!(h.unresolvable.is_empty());
        assert_eq!(h.operations.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_transaction_is_not_retried() {
        let h = harness();
        let tx = Transaction {
            anchor_string: "0.abc".into(),
            ..transaction(1, 42)
        };
        let summary = h.observer.process_transactions(&[tx]).await.unwrap();
        assert_eq!(summary.invalid, 1);
        assert!(h.unresolvable.is_empty());
    }

    #[tokio::test]
    async fn test_retry_count_is_capped() {
        let h = harness();
        let batches: Vec<_> = (1..=12)
            .map(|seed| encode(&[created(seed)], &[], &[], &[], None))
            .collect();
        let transactions: Vec<_> = batches
            .iter()
            .enumerate()
            .map(|(i, batch)| anchoring(i as u64 + 1, 42, batch))
            .collect();
        h.observer.process_transactions(&transactions).await.unwrap();
        assert_eq!(h.unresolvable.len(), 12);

        let summary = h.observer.retry_unresolvable(100).await.unwrap();
        assert_eq!(summary.retry_later, 10);
        let summary = h.observer.retry_unresolvable(1).await.unwrap();
        assert_eq!(summary.retry_later, 1);
    }

    #[tokio::test]
    async fn test_revert_drops_later_state() {
        let h = harness();
        let kept = encode(&[created(1)], &[], &[], &[], None);
        let reverted = encode(&[created(2)], &[], &[], &[], None);
        let missing = encode(&[created(3)], &[], &[], &[], None);
        kept.publish(&h.cas).await;
        reverted.publish(&h.cas).await;
        h.confirmations.submit(&reverted.anchor_string(), 45).await.unwrap();

        let first = anchoring(1, 42, &kept);
        h.observer
            .process_transactions(&[
                first.clone(),
                anchoring(2, 50, &reverted),
                anchoring(3, 51, &missing),
            ])
            .await
            .unwrap();
        assert_eq!(h.operations.len(), 2);
        assert_eq!(h.unresolvable.len(), 1);

        h.observer.revert_to(Some(&first)).await.unwrap();
        assert_eq!(h.operations.len(), 1);
        assert!(h.unresolvable.is_empty());
        let last = h.confirmations.get_last_submitted().await.unwrap().unwrap();
        assert_eq!(last.confirmed_at, None);

        h.observer.revert_to(None).await.unwrap();
        assert!(h.operations.is_empty());
    }

    #[tokio::test]
    async fn test_underpaid_transaction_clears_retry_record() {
        let h = harness();
        let batch = encode(&[created(1)], &[], &[], &[], None);
        let tx = anchoring(1, 42, &batch);
        h.observer.process_transactions(&[tx.clone()]).await.unwrap();
        assert_eq!(h.unresolvable.len(), 1);

        let underpaid = Transaction {
            transaction_fee_paid: 1,
            ..tx
        };
        let summary = h.observer.process_transactions(&[underpaid]).await.unwrap();
        assert_eq!(summary.invalid, 1);
        assert!(h.unresolvable.is_empty());
    }
}
