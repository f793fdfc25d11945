//! # Inbound Ports
//!
//! APIs this crate exposes to the node's scheduler and request handlers.

use crate::domain::BatchWriterError;
use async_trait::async_trait;

/// One anchoring cycle.
#[async_trait]
pub trait BatchWriterApi: Send + Sync {
    /// Batch and anchor queued operations; returns how many were anchored.
    async fn write(&self) -> Result<usize, BatchWriterError>;
}

/// Intake of client operation requests.
#[async_trait]
pub trait OperationPoolApi: Send + Sync {
    /// Validate and queue an operation; returns its identifier suffix.
    async fn submit_operation(&self, operation_buffer: Vec<u8>)
        -> Result<String, BatchWriterError>;
}
