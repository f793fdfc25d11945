//! # Transaction Processor Service
//!
//! Reads the anchor files of one transaction and stores the operations
//! they describe. A transaction either contributes all its operations or
//! none of them.
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | anchor string, fee, lock, or any file breaks a rule | [`ProcessOutcome::Invalid`] |
//! | CAS unreachable or content not found yet | [`ProcessOutcome::RetryLater`] |
//! | blockchain unreachable while looking up fee or lock | [`ProcessOutcome::RetryLater`] |
//! | operation store fails | `Err` |

use crate::config::TransactionProcessorConfig;
use crate::domain::{
    check_core_index_within_paid_limit, AnchorFileSet, ProcessOutcome, TransactionProcessorError,
};
use crate::ports::TransactionProcessorApi;
use async_trait::async_trait;
use shared_types::ports::{with_timeout, BlockchainClient, ContentAddressableStore, OperationStore};
use shared_types::{
    AnchoredOperation, BlockchainError, CasError, ErrorCode, ProtocolError, ProtocolParameters,
    Transaction, ValueTimeLock,
};
use st_02_anchor_files::{
    AnchoredDataSerializer, ChunkFile, CoreIndexFile, CoreProofFile, ProvisionalIndexFile,
    ProvisionalProofFile,
};
use st_03_fee_manager::{FeeManager, ValueTimeLockVerifier};
use std::sync::Arc;
use tracing::{debug, info, warn};

enum Rejection {
    Invalid(ProtocolError),
    RetryLater(String),
}

impl From<ProtocolError> for Rejection {
    fn from(error: ProtocolError) -> Self {
        Rejection::Invalid(error)
    }
}

/// Transaction Processor - turns anchoring transactions into stored operations.
pub struct TransactionProcessor {
    config: TransactionProcessorConfig,
    params: ProtocolParameters,
    cas: Arc<dyn ContentAddressableStore>,
    blockchain: Arc<dyn BlockchainClient>,
    operation_store: Arc<dyn OperationStore>,
    fee_manager: FeeManager,
    lock_verifier: ValueTimeLockVerifier,
}

impl TransactionProcessor {
    /// Create a new transaction processor.
    pub fn new(
        config: TransactionProcessorConfig,
        params: ProtocolParameters,
        cas: Arc<dyn ContentAddressableStore>,
        blockchain: Arc<dyn BlockchainClient>,
        operation_store: Arc<dyn OperationStore>,
    ) -> Self {
        Self {
            fee_manager: FeeManager::new(&params),
            lock_verifier: ValueTimeLockVerifier::new(&params),
            config,
            params,
            cas,
            blockchain,
            operation_store,
        }
    }

    /// Download, validate, and store the operations of `transaction`.
    pub async fn process_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<ProcessOutcome, TransactionProcessorError> {
        match self.download_and_compose(transaction).await {
            Ok(operations) => {
                let count = operations.len();
                with_timeout(
                    self.config.query_timeout_ms,
                    self.operation_store.insert_or_replace(operations),
                )
                .await?;
                info!(
                    transaction_number = transaction.transaction_number,
                    operations = count,
                    "Processed transaction"
                );
                Ok(ProcessOutcome::Processed { operations: count })
            }
            Err(Rejection::Invalid(error)) => {
                warn!(
                    transaction_number = transaction.transaction_number,
                    anchor_string = %transaction.anchor_string,
                    code = %error.code,
                    reason = %error.message,
                    "Ignoring invalid transaction"
                );
                Ok(ProcessOutcome::Invalid(error.code))
            }
            Err(Rejection::RetryLater(reason)) => {
                info!(
                    transaction_number = transaction.transaction_number,
                    reason = %reason,
                    "Transaction files unavailable, will retry"
                );
                Ok(ProcessOutcome::RetryLater)
            }
        }
    }

    async fn download_and_compose(
        &self,
        transaction: &Transaction,
    ) -> Result<Vec<AnchoredOperation>, Rejection> {
        let params = &self.params;
        let anchored = AnchoredDataSerializer::deserialize(&transaction.anchor_string, params)?;
        let paid_operation_count = anchored.number_of_operations;

        let normalized_fee = self.normalized_fee(transaction).await?;
        self.fee_manager.verify_transaction_fee_and_throw_on_error(
            transaction.transaction_fee_paid,
            paid_operation_count,
            normalized_fee,
        )?;

        let bytes = self
            .fetch(
                "core index",
                &anchored.core_index_file_uri,
                params.max_core_index_file_size_in_bytes,
            )
            .await?;
        let core_index = CoreIndexFile::parse(&bytes, params)?;
        check_core_index_within_paid_limit(&core_index, paid_operation_count)?;

        let lock = self.writer_lock(&core_index).await?;
        self.lock_verifier.verify_lock_amount_and_throw_on_error(
            lock.as_ref(),
            paid_operation_count,
            transaction.transaction_time,
            &transaction.writer,
        )?;

        let core_proof = match &core_index.model.core_proof_file_uri {
            Some(uri) => {
                let bytes = self
                    .fetch("core proof", uri, params.max_proof_file_size_in_bytes)
                    .await?;
                let deactivated: Vec<&str> = core_index.deactivate_did_suffixes().collect();
                Some(CoreProofFile::parse(&bytes, params, &deactivated)?)
            }
            None => None,
        };

        let provisional_index = match &core_index.model.provisional_index_file_uri {
            Some(uri) => {
                let bytes = self
                    .fetch(
                        "provisional index",
                        uri,
                        params.max_provisional_index_file_size_in_bytes,
                    )
                    .await?;
                Some(ProvisionalIndexFile::parse(&bytes, params)?)
            }
            None => None,
        };

        let mut provisional_proof = None;
        let mut chunk = None;
        if let Some(index) = &provisional_index {
            if let Some(uri) = &index.model.provisional_proof_file_uri {
                let bytes = self
                    .fetch("provisional proof", uri, params.max_proof_file_size_in_bytes)
                    .await?;
                provisional_proof = Some(ProvisionalProofFile::parse(&bytes, params)?);
            }
            let bytes = self
                .fetch("chunk", index.chunk_file_uri(), params.max_chunk_file_size_in_bytes)
                .await?;
            chunk = Some(ChunkFile::parse(&bytes, params)?);
        }

        let files = AnchorFileSet {
            core_index,
            core_proof,
            provisional_index,
            provisional_proof,
            chunk,
        };
        Ok(files.compose(transaction, paid_operation_count)?)
    }

    async fn normalized_fee(&self, transaction: &Transaction) -> Result<u64, Rejection> {
        if let Some(fee) = transaction.normalized_transaction_fee {
            return Ok(fee);
        }
        match self.blockchain.get_fee(transaction.transaction_time).await {
            Ok(fee) => Ok(fee),
            Err(BlockchainError::FeeUnavailable { time }) => Err(Rejection::Invalid(
                ProtocolError::new(
                    ErrorCode::NormalizedFeeUnavailable,
                    format!("no normalized fee known for time {}", time),
                ),
            )),
            Err(error) => Err(Rejection::RetryLater(format!("normalized fee: {}", error))),
        }
    }

    async fn writer_lock(
        &self,
        core_index: &CoreIndexFile,
    ) -> Result<Option<ValueTimeLock>, Rejection> {
        let Some(lock_id) = &core_index.model.writer_lock_id else {
            return Ok(None);
        };
        self.blockchain
            .get_value_time_lock(lock_id)
            .await
            .map_err(|error| Rejection::RetryLater(format!("value time lock {}: {}", lock_id, error)))
    }

    async fn fetch(
        &self,
        file: &'static str,
        uri: &str,
        max_size_in_bytes: usize,
    ) -> Result<Vec<u8>, Rejection> {
        let bytes = self
            .cas
            .read(uri, max_size_in_bytes)
            .await
            .map_err(|error| cas_rejection(file, error))?;
        debug!(file, uri, size = bytes.len(), "Downloaded anchor file");
        Ok(bytes)
    }
}

fn cas_rejection(file: &str, error: CasError) -> Rejection {
    let code = match &error {
        CasError::NotFound { .. } | CasError::NotReachable(_) => {
            return Rejection::RetryLater(format!("{} file: {}", file, error))
        }
        CasError::InvalidHash { .. } => ErrorCode::CasFileUriInvalid,
        CasError::MaxSizeExceeded { .. } => ErrorCode::CasFileExceedsMaxSize,
        CasError::NotAFile { .. } => ErrorCode::CasFileNotAFile,
    };
    Rejection::Invalid(ProtocolError::new(code, format!("{} file: {}", file, error)))
}

#[async_trait]
impl TransactionProcessorApi for TransactionProcessor {
    async fn process_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<ProcessOutcome, TransactionProcessorError> {
        TransactionProcessor::process_transaction(self, transaction).await
    }
}
