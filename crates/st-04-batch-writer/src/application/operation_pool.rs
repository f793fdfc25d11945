//! Ingestion of client operation requests into the queue.

use crate::config::BatchWriterConfig;
use crate::domain::BatchWriterError;
use crate::ports::OperationPoolApi;
use async_trait::async_trait;
use shared_types::ports::{with_timeout, OperationQueue};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters, StoreError};
use st_01_operations::Operation;
use std::sync::Arc;
use tracing::{debug, warn};

/// Validates operations and places them on the queue.
pub struct OperationPool {
    config: BatchWriterConfig,
    params: ProtocolParameters,
    queue: Arc<dyn OperationQueue>,
}

impl OperationPool {
    /// Create a new operation pool.
    pub fn new(
        config: BatchWriterConfig,
        params: ProtocolParameters,
        queue: Arc<dyn OperationQueue>,
    ) -> Self {
        Self {
            config,
            params,
            queue,
        }
    }

    /// Validate `operation_buffer` strictly and queue it.
    ///
    /// At most one operation per identifier may wait in the queue.
    pub async fn submit_operation(
        &self,
        operation_buffer: Vec<u8>,
    ) -> Result<String, BatchWriterError> {
        let operation = Operation::parse_for_ingestion(&operation_buffer, &self.params)
            .map_err(|err| {
                debug!(code = %err.code, "Rejected operation request");
                err
            })?;
        let did_unique_suffix = operation.did_unique_suffix().to_string();

        let enqueued = with_timeout(
            self.config.query_timeout_ms,
            self.queue.enqueue(&did_unique_suffix, operation_buffer),
        )
        .await;
        match enqueued {
            Ok(()) => {}
            Err(StoreError::AlreadyQueued { did_unique_suffix }) => {
                warn!(%did_unique_suffix, "Operation already queued for identifier");
                return Err(ProtocolError::new(
                    ErrorCode::QueueingMultipleOperationsPerDidNotAllowed,
                    format!("an operation for {} is already queued", did_unique_suffix),
                )
                .into());
            }
            Err(err) => return Err(err.into()),
        }

        debug!(
            %did_unique_suffix,
            operation_type = operation.operation_type().as_str(),
            "Queued operation"
        );
        Ok(did_unique_suffix)
    }
}

#[async_trait]
impl OperationPoolApi for OperationPool {
    async fn submit_operation(
        &self,
        operation_buffer: Vec<u8>,
    ) -> Result<String, BatchWriterError> {
        OperationPool::submit_operation(self, operation_buffer).await
    }
}
