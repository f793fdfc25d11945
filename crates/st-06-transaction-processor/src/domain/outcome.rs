//! Results of processing transactions.

use shared_types::ErrorCode;

/// What became of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Operations were stored.
    Processed {
        /// Number of operations stored.
        operations: usize,
    },
    /// The transaction breaks a protocol rule and is ignored for good.
    Invalid(ErrorCode),
    /// Files could not be fetched; try again later.
    RetryLater,
}

/// Tally of one observer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservationSummary {
    /// Transactions whose operations were stored.
    pub processed: usize,
    /// Transactions rejected permanently.
    pub invalid: usize,
    /// Transactions scheduled for a retry.
    pub retry_later: usize,
}

impl ObservationSummary {
    pub(crate) fn record(&mut self, outcome: ProcessOutcome) {
        match outcome {
            ProcessOutcome::Processed { .. } => self.processed += 1,
            ProcessOutcome::Invalid(_) => self.invalid += 1,
            ProcessOutcome::RetryLater => self.retry_later += 1,
        }
    }
}
