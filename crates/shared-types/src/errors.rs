//! # Error Types
//!
//! Protocol rule violations carry an [`ErrorCode`] naming the exact rule.
//! Port failures have their own enums so callers can tell transient
//! infrastructure trouble from permanently invalid data.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One code per protocol rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ErrorCode {
    // -------------------------------------------------------------------------
    // Encoding and hashing
    // -------------------------------------------------------------------------
    EncodedStringIncorrectEncoding,
    MultihashNotSupported,
    MultihashInvalid,
    CanonicalizationFailed,

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------
    OperationNotJson,
    OperationTypeUnknownOrMissing,
    CreateOperationMissingOrUnknownProperty,
    UpdateOperationMissingOrUnknownProperty,
    RecoverOperationMissingOrUnknownProperty,
    DeactivateOperationMissingOrUnknownProperty,
    DidSuffixIncorrectEncoding,
    SuffixDataMissingOrUnknownProperty,
    SuffixDataTypeInvalid,
    DeltaMissing,
    DeltaMissingOrUnknownProperty,
    DeltaExceedsMaximumSize,
    DeltaHashMismatch,
    RevealValueMismatch,
    UpdateSignedDataMissingOrUnknownProperty,
    RecoverSignedDataMissingOrUnknownProperty,
    DeactivateSignedDataMissingOrUnknownProperty,
    DeactivateDidSuffixMismatch,
    SignatureInvalid,

    // -------------------------------------------------------------------------
    // Keys and signatures
    // -------------------------------------------------------------------------
    JwkEs256kMissingOrUnknownProperty,
    JwkEs256kUnsupportedKeyTypeOrCurve,
    JwkEs256kInvalidCoordinate,
    JwsCompactIncorrectFormat,
    JwsProtectedHeaderMissingOrUnknownProperty,
    JwsProtectedHeaderUnsupportedAlgorithm,
    JwsPayloadNotJson,
    JwsSignatureIncorrectEncoding,

    // -------------------------------------------------------------------------
    // Document patches
    // -------------------------------------------------------------------------
    DocumentComposerPatchMissingOrUnknownAction,
    DocumentComposerPatchMissingOrUnknownProperty,
    DocumentComposerDocumentMissingOrUnknownProperty,
    DocumentComposerIdTooLong,
    DocumentComposerIdNotUsingBase64UrlCharacterSet,
    DocumentComposerIdDuplicated,
    DocumentComposerPublicKeyPurposesDuplicated,
    DocumentComposerPublicKeyPurposesEmpty,
    DocumentComposerPublicKeyJwkMissingOrIncorrectType,
    DocumentComposerServiceTypeTooLong,
    DocumentComposerServiceEndpointInvalid,
    DocumentComposerJsonPatchFailed,

    // -------------------------------------------------------------------------
    // Identifiers
    // -------------------------------------------------------------------------
    DidIncorrectPrefix,
    DidSuffixEmptyOrMalformed,
    DidLongFormCreateRequestNotJson,
    DidLongFormCreateRequestNotCanonical,
    DidUniqueSuffixFromInitialStateMismatch,

    // -------------------------------------------------------------------------
    // Compression and CAS references
    // -------------------------------------------------------------------------
    CompressorMaxAllowedDecompressedDataSizeExceeded,
    CompressorCompressionFailure,
    CasFileUriInvalid,
    CasFileUriExceedsMaxLength,
    CasFileExceedsMaxSize,
    CasFileNotAFile,

    // -------------------------------------------------------------------------
    // Anchored data
    // -------------------------------------------------------------------------
    AnchoredDataIncorrectFormat,
    AnchoredDataNumberOfOperationsNotPositiveInteger,
    AnchoredDataNumberOfOperationsGreaterThanMax,

    // -------------------------------------------------------------------------
    // Core index file
    // -------------------------------------------------------------------------
    CoreIndexFileDecompressionFailure,
    CoreIndexFileNotJson,
    CoreIndexFileSchemaInvalid,
    CoreIndexFileWriterLockIdExceededMaxSize,
    CoreIndexFileProvisionalIndexFileUriMissing,
    CoreIndexFileCoreProofFileUriMissing,
    CoreIndexFileCoreProofFileUriNotAllowed,
    CoreIndexFileMultipleOperationsForTheSameDid,
    CoreIndexFileOperationCountExceededPaidLimit,

    // -------------------------------------------------------------------------
    // Provisional index file
    // -------------------------------------------------------------------------
    ProvisionalIndexFileDecompressionFailure,
    ProvisionalIndexFileNotJson,
    ProvisionalIndexFileSchemaInvalid,
    ProvisionalIndexFileChunkCountIncorrect,
    ProvisionalIndexFileProvisionalProofFileUriNotAllowed,
    ProvisionalIndexFileProvisionalProofFileUriMissing,
    ProvisionalIndexFileDidReferenceDuplicate,
    ProvisionalIndexFileUpdateOperationCountExceededPaidLimit,

    // -------------------------------------------------------------------------
    // Chunk file
    // -------------------------------------------------------------------------
    ChunkFileDecompressionFailure,
    ChunkFileNotJson,
    ChunkFileSchemaInvalid,
    ChunkFileDeltaSizeExceedsLimit,
    ChunkFileDeltaMissing,
    ChunkFileDeltaCountIncorrect,

    // -------------------------------------------------------------------------
    // Proof files
    // -------------------------------------------------------------------------
    CoreProofFileDecompressionFailure,
    CoreProofFileNotJson,
    CoreProofFileSchemaInvalid,
    CoreProofFileHasNoProofs,
    CoreProofFileDeactivateDidSuffixMismatch,
    CoreProofFileOperationCountMismatch,
    ProvisionalProofFileDecompressionFailure,
    ProvisionalProofFileNotJson,
    ProvisionalProofFileSchemaInvalid,
    ProvisionalProofFileHasNoProofs,
    ProvisionalProofFileOperationCountMismatch,

    // -------------------------------------------------------------------------
    // Fees and value time locks
    // -------------------------------------------------------------------------
    OperationCountLessThanOrEqualToZero,
    TransactionFeePaidInvalid,
    NormalizedFeeUnavailable,
    ValueTimeLockVerifierTransactionWriterLockOwnerMismatch,
    ValueTimeLockVerifierTransactionTimeOutsideLockRange,
    ValueTimeLockVerifierInvalidNumberOfOperations,

    // -------------------------------------------------------------------------
    // Queue
    // -------------------------------------------------------------------------
    QueueingMultipleOperationsPerDidNotAllowed,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A protocol rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ProtocolError {
    /// The violated rule.
    pub code: ErrorCode,
    /// Human-readable detail.
    pub message: String,
}

impl ProtocolError {
    /// Create a new rule violation.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The violated rule.
    pub fn code(&self) -> ErrorCode {
        self.code
    }
}

/// Errors returned by the content-addressable store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CasError {
    /// No content is stored under this URI.
    #[error("CAS content not found: {uri}")]
    NotFound {
        /// Requested URI.
        uri: String,
    },

    /// Content exceeds the caller's size limit.
    #[error("CAS content {uri} exceeds max size {max_size}")]
    MaxSizeExceeded {
        /// Requested URI.
        uri: String,
        /// Size limit given by the caller.
        max_size: usize,
    },

    /// The URI is not a valid content hash.
    #[error("Invalid CAS URI: {uri}")]
    InvalidHash {
        /// Requested URI.
        uri: String,
    },

    /// The URI resolves to something that is not a file.
    #[error("CAS content {uri} is not a file")]
    NotAFile {
        /// Requested URI.
        uri: String,
    },

    /// The store could not be reached.
    #[error("CAS not reachable: {0}")]
    NotReachable(String),
}

impl CasError {
    /// Whether a later attempt may succeed.
    ///
    /// Missing content is treated as transient because it may not have
    /// propagated across the CAS network yet.
    pub fn is_transient(&self) -> bool {
        matches!(self, CasError::NotReachable(_) | CasError::NotFound { .. })
    }
}

/// Errors returned by the blockchain client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockchainError {
    /// The blockchain node could not be reached.
    #[error("Blockchain not reachable: {0}")]
    NotReachable(String),

    /// The blockchain refused the anchoring transaction.
    #[error("Blockchain write rejected: {0}")]
    WriteRejected(String),

    /// The normalized fee is not known for this time.
    #[error("Normalized fee unavailable at time {time}")]
    FeeUnavailable {
        /// Blockchain time asked for.
        time: u64,
    },
}

/// Errors returned by the persistent stores and the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The queue already holds an operation for this identifier.
    #[error("Queue already contains an operation for {did_unique_suffix}")]
    AlreadyQueued {
        /// The identifier suffix.
        did_unique_suffix: String,
    },

    /// The query did not finish in time.
    #[error("Store query timed out after {timeout_ms}ms")]
    Timeout {
        /// Applied time limit.
        timeout_ms: u64,
    },

    /// The backing store failed.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether a later attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Timeout { .. } | StoreError::Unavailable(_))
    }
}
