//! # Domain Errors

use shared_types::{OperationType, ProtocolError, StoreError};
use thiserror::Error;

/// Resolution errors.
///
/// Protocol-level invalidity of an operation is never an error here; it
/// shows up as "no state change" instead.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// Stored operation bytes or an identifier string are malformed.
    #[error("Malformed input: {0}")]
    Malformed(#[from] ProtocolError),

    /// The stored record disagrees with the bytes it carries.
    #[error("Stored {expected} operation for {did_unique_suffix} decodes as {actual}")]
    OperationTypeMismatch {
        /// Suffix the record is filed under.
        did_unique_suffix: String,
        /// Type recorded next to the bytes.
        expected: OperationType,
        /// Type found in the bytes.
        actual: OperationType,
    },

    /// The stored record targets another identifier.
    #[error("Stored operation filed under {expected} targets {actual}")]
    SuffixMismatch {
        /// Suffix the record is filed under.
        expected: String,
        /// Suffix found in the bytes.
        actual: String,
    },

    /// The operation store failed.
    #[error("Operation store failed: {0}")]
    Store(#[from] StoreError),
}
