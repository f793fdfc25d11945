//! # Batch Writer Service
//!
//! One invocation of [`BatchWriter::write`] is one anchoring cycle:
//!
//! 1. Read chain time, normalized fee, and the writer's value time lock.
//! 2. Peek up to `min(max_operations_per_batch, lock allowance)` operations.
//! 3. Skip the cycle while the previous anchor is not buried deep enough.
//! 4. Write core proof, provisional proof, chunk, provisional index, and
//!    core index files, in that order.
//! 5. Anchor `"<count>.<core index URI>"`, record the submission, dequeue.
//!
//! Nothing is dequeued unless the anchor was written. Cycles must not run
//! concurrently against the same queue.

use crate::config::BatchWriterConfig;
use crate::domain::{BatchWriterError, OperationBatch};
use crate::ports::BatchWriterApi;
use async_trait::async_trait;
use shared_types::ports::{
    with_timeout, BlockchainClient, ConfirmationStore, ContentAddressableStore, OperationQueue,
};
use shared_types::ProtocolParameters;
use st_02_anchor_files::{
    AnchoredData, AnchoredDataSerializer, ChunkFile, CoreIndexFile, CoreProofFile,
    ProvisionalIndexFile, ProvisionalProofFile,
};
use st_03_fee_manager::{FeeManager, ValueTimeLockVerifier};
use std::sync::Arc;
use tracing::{debug, info};

/// Batch Writer - anchors queued operations.
pub struct BatchWriter {
    config: BatchWriterConfig,
    params: ProtocolParameters,
    queue: Arc<dyn OperationQueue>,
    blockchain: Arc<dyn BlockchainClient>,
    cas: Arc<dyn ContentAddressableStore>,
    confirmation_store: Arc<dyn ConfirmationStore>,
    fee_manager: FeeManager,
    lock_verifier: ValueTimeLockVerifier,
}

impl BatchWriter {
    /// Create a new batch writer.
    pub fn new(
        config: BatchWriterConfig,
        params: ProtocolParameters,
        queue: Arc<dyn OperationQueue>,
        blockchain: Arc<dyn BlockchainClient>,
        cas: Arc<dyn ContentAddressableStore>,
        confirmation_store: Arc<dyn ConfirmationStore>,
    ) -> Self {
        Self {
            fee_manager: FeeManager::new(&params),
            lock_verifier: ValueTimeLockVerifier::new(&params),
            config,
            params,
            queue,
            blockchain,
            cas,
            confirmation_store,
        }
    }

    /// Run one anchoring cycle; returns the number of operations anchored.
    pub async fn write(&self) -> Result<usize, BatchWriterError> {
        let current_time = self.blockchain.get_latest_time().await?;
        let normalized_fee = self.blockchain.get_fee(current_time.time).await?;
        let writer_lock = self.blockchain.get_writer_value_time_lock().await?;
        let lock_allowance = self
            .lock_verifier
            .calculate_max_number_of_operations_allowed(writer_lock.as_ref());
        let max_operations = self.params.max_operations_per_batch.min(lock_allowance);

        let timeout = self.config.query_timeout_ms;
        let queued = with_timeout(timeout, self.queue.peek(max_operations)).await?;
        if queued.is_empty() {
            debug!("No queued operations to batch");
            return Ok(0);
        }

        if !self.previous_anchor_confirmed(current_time.time).await? {
            return Ok(0);
        }

        let batch = OperationBatch::from_queued(&queued, &self.params)?;
        let operation_count = batch.len();

        let core_proof_file_uri = self
            .write_file(
                "core proof",
                CoreProofFile::create_buffer(&batch.recovers, &batch.deactivates)?,
            )
            .await?;
        let provisional_proof_file_uri = self
            .write_file(
                "provisional proof",
                ProvisionalProofFile::create_buffer(&batch.updates)?,
            )
            .await?;
        let chunk_file_uri = self
            .write_file(
                "chunk",
                ChunkFile::create_buffer(&batch.creates, &batch.recovers, &batch.updates)?,
            )
            .await?;
        let provisional_index_file_uri = self
            .write_file(
                "provisional index",
                ProvisionalIndexFile::create_buffer(
                    chunk_file_uri.as_deref(),
                    provisional_proof_file_uri.as_deref(),
                    &batch.updates,
                )?,
            )
            .await?;
        let core_index_file = CoreIndexFile::create_buffer(
            writer_lock.as_ref().map(|lock| lock.identifier.as_str()),
            provisional_index_file_uri.as_deref(),
            core_proof_file_uri.as_deref(),
            &batch.creates,
            &batch.recovers,
            &batch.deactivates,
        )?;
        let core_index_file_uri = self.cas.write(core_index_file).await?;

        let anchor_string = AnchoredDataSerializer::serialize(&AnchoredData {
            core_index_file_uri: core_index_file_uri.clone(),
            number_of_operations: operation_count,
        });
        let fee = self
            .fee_manager
            .compute_minimum_transaction_fee(normalized_fee, operation_count)?;
        self.blockchain.write(&anchor_string, fee).await?;
        with_timeout(
            timeout,
            self.confirmation_store
                .submit(&anchor_string, current_time.time),
        )
        .await?;

        let dequeued = with_timeout(timeout, self.queue.dequeue(operation_count)).await?;
        info!(
            operations = operation_count,
            dequeued = dequeued.len(),
            creates = batch.creates.len(),
            recovers = batch.recovers.len(),
            deactivates = batch.deactivates.len(),
            updates = batch.updates.len(),
            core_index_file_uri = %core_index_file_uri,
            fee,
            "Anchored batch"
        );
        Ok(operation_count)
    }

    async fn previous_anchor_confirmed(&self, current_time: u64) -> Result<bool, BatchWriterError> {
        let last = with_timeout(
            self.config.query_timeout_ms,
            self.confirmation_store.get_last_submitted(),
        )
        .await?;
        let Some(last) = last else {
            return Ok(true);
        };
        match last.confirmed_at {
            None => {
                info!(
                    anchor_string = %last.anchor_string,
                    "Previous anchor not yet confirmed, skipping batch"
                );
                Ok(false)
            }
            Some(confirmed_at) => {
                let confirmations = current_time.saturating_sub(confirmed_at);
                if confirmations < self.params.min_confirmations_before_next_write {
                    info!(
                        anchor_string = %last.anchor_string,
                        confirmations,
                        required = self.params.min_confirmations_before_next_write,
                        "Previous anchor not buried deep enough, skipping batch"
                    );
                    return Ok(false);
                }
                Ok(true)
            }
        }
    }

    async fn write_file(
        &self,
        kind: &'static str,
        buffer: Option<Vec<u8>>,
    ) -> Result<Option<String>, BatchWriterError> {
        let Some(buffer) = buffer else {
            return Ok(None);
        };
        let size = buffer.len();
        let uri = self.cas.write(buffer).await?;
        debug!(file = kind, uri = %uri, size, "Wrote anchor file");
        Ok(Some(uri))
    }
}

#[async_trait]
impl BatchWriterApi for BatchWriter {
    async fn write(&self) -> Result<usize, BatchWriterError> {
        BatchWriter::write(self).await
    }
}
