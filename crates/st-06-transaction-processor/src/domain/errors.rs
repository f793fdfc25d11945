//! # Domain Errors

use shared_types::StoreError;
use thiserror::Error;

/// Errors that stop processing altogether.
///
/// Problems with a transaction's own data are reported through
/// [`ProcessOutcome`](super::ProcessOutcome) instead.
#[derive(Debug, Error)]
pub enum TransactionProcessorError {
    /// The operation, confirmation, or unresolvable store failed.
    #[error("Store call failed: {0}")]
    Store(#[from] StoreError),
}
