//! # Domain Errors
//!
//! Error types for batching and ingestion.

use shared_types::{BlockchainError, CasError, ErrorCode, ProtocolError, StoreError};
use thiserror::Error;

/// Batch writer and operation pool errors.
#[derive(Debug, Error)]
pub enum BatchWriterError {
    /// An operation or file violated a protocol rule.
    #[error("Protocol rule violated: {0}")]
    Protocol(#[from] ProtocolError),

    /// Writing an anchor file failed.
    #[error("CAS write failed: {0}")]
    Cas(#[from] CasError),

    /// Reading chain state or anchoring failed.
    #[error("Blockchain call failed: {0}")]
    Blockchain(#[from] BlockchainError),

    /// Queue or confirmation store failed.
    #[error("Store call failed: {0}")]
    Store(#[from] StoreError),
}

impl BatchWriterError {
    /// Protocol error code, if this is a rule violation.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            BatchWriterError::Protocol(err) => Some(err.code),
            _ => None,
        }
    }
}
