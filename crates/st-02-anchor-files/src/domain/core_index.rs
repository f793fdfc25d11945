//! # Core Index File
//!
//! The file the anchor string points at. It carries create, recover, and
//! deactivate references and links the provisional index and core proof
//! files.
//!
//! ```text
//! {
//!   "writerLockId"?: string,
//!   "provisionalIndexFileUri"?: uri,   // required unless only deactivates
//!   "coreProofFileUri"?: uri,          // iff recover or deactivate exist
//!   "operations"?: { "create"?, "recover"?, "deactivate"? }
//! }
//! ```

use super::codec::{first_duplicate, FileKind};
use super::references::{CreateReference, OperationReference};
use serde::{Deserialize, Serialize};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use st_01_operations::{
    validate_cas_uri, CreateOperation, DeactivateOperation, RecoverOperation,
};

const CORE_INDEX_FILE: FileKind = FileKind {
    name: "core index file",
    decompression_failure: ErrorCode::CoreIndexFileDecompressionFailure,
    not_json: ErrorCode::CoreIndexFileNotJson,
    schema_invalid: ErrorCode::CoreIndexFileSchemaInvalid,
    max_size: max_core_index_file_size,
};

fn max_core_index_file_size(params: &ProtocolParameters) -> usize {
    params.max_core_index_file_size_in_bytes
}

/// Operation references of a core index file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreOperations {
    /// Create references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<CreateReference>,
    /// Recover references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recover: Vec<OperationReference>,
    /// Deactivate references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deactivate: Vec<OperationReference>,
}

impl CoreOperations {
    fn is_empty(&self) -> bool {
        self.create.is_empty() && self.recover.is_empty() && self.deactivate.is_empty()
    }
}

/// Wire model of a core index file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CoreIndexFileModel {
    /// Value time lock of the writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer_lock_id: Option<String>,
    /// URI of the provisional index file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisional_index_file_uri: Option<String>,
    /// URI of the core proof file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_proof_file_uri: Option<String>,
    /// Operation references.
    #[serde(default, skip_serializing_if = "CoreOperations::is_empty")]
    pub operations: CoreOperations,
}

/// A parsed and validated core index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreIndexFile {
    /// The wire model.
    pub model: CoreIndexFileModel,
    /// Suffixes of the create references, in file order.
    pub create_did_suffixes: Vec<String>,
}

impl CoreIndexFile {
    /// Decompress, parse, and validate a core index file.
    pub fn parse(bytes: &[u8], params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let model: CoreIndexFileModel = CORE_INDEX_FILE.decode(bytes, params)?;

        if let Some(lock_id) = &model.writer_lock_id {
            if lock_id.len() > params.max_writer_lock_id_in_bytes {
                return Err(ProtocolError::new(
                    ErrorCode::CoreIndexFileWriterLockIdExceededMaxSize,
                    format!(
                        "writer lock id length {} exceeds {}",
                        lock_id.len(),
                        params.max_writer_lock_id_in_bytes
                    ),
                ));
            }
        }

        let operations = &model.operations;
        match &model.provisional_index_file_uri {
            Some(uri) => validate_cas_uri(uri, "provisional index file URI", params)?,
            None => {
                let only_deactivates = operations.create.is_empty()
                    && operations.recover.is_empty()
                    && !operations.deactivate.is_empty();
                if !only_deactivates {
                    return Err(ProtocolError::new(
                        ErrorCode::CoreIndexFileProvisionalIndexFileUriMissing,
                        "provisional index file URI is required unless the file only deactivates",
                    ));
                }
            }
        }

        let needs_proof = !operations.recover.is_empty() || !operations.deactivate.is_empty();
        match (&model.core_proof_file_uri, needs_proof) {
            (Some(uri), true) => validate_cas_uri(uri, "core proof file URI", params)?,
            (None, false) => {}
            (None, true) => {
                return Err(ProtocolError::new(
                    ErrorCode::CoreIndexFileCoreProofFileUriMissing,
                    "recover or deactivate references require a core proof file URI",
                ))
            }
            (Some(_), false) => {
                return Err(ProtocolError::new(
                    ErrorCode::CoreIndexFileCoreProofFileUriNotAllowed,
                    "core proof file URI given without recover or deactivate references",
                ))
            }
        }

        let create_did_suffixes = operations
            .create
            .iter()
            .map(|reference| {
                reference.suffix_data.validate(params)?;
                reference.suffix_data.compute_unique_suffix(params)
            })
            .collect::<Result<Vec<_>, _>>()?;
        for reference in operations.recover.iter().chain(&operations.deactivate) {
            reference.validate(params)?;
        }

        let file = Self {
            create_did_suffixes,
            model,
        };
        if let Some(duplicate) = first_duplicate(file.did_unique_suffixes()) {
            return Err(ProtocolError::new(
                ErrorCode::CoreIndexFileMultipleOperationsForTheSameDid,
                format!("suffix '{}' is referenced more than once", duplicate),
            ));
        }
        Ok(file)
    }

    /// Build a compressed core index file.
    pub fn create_buffer(
        writer_lock_id: Option<&str>,
        provisional_index_file_uri: Option<&str>,
        core_proof_file_uri: Option<&str>,
        creates: &[CreateOperation],
        recovers: &[RecoverOperation],
        deactivates: &[DeactivateOperation],
    ) -> Result<Vec<u8>, ProtocolError> {
        let model = CoreIndexFileModel {
            writer_lock_id: writer_lock_id.map(str::to_string),
            provisional_index_file_uri: provisional_index_file_uri.map(str::to_string),
            core_proof_file_uri: core_proof_file_uri.map(str::to_string),
            operations: CoreOperations {
                create: creates
                    .iter()
                    .map(|op| CreateReference {
                        suffix_data: op.suffix_data.clone(),
                    })
                    .collect(),
                recover: recovers.iter().map(OperationReference::from).collect(),
                deactivate: deactivates.iter().map(OperationReference::from).collect(),
            },
        };
        CORE_INDEX_FILE.encode(&model)
    }

    /// Suffixes in create, recover, deactivate order.
    pub fn did_unique_suffixes(&self) -> impl Iterator<Item = &str> {
        self.create_did_suffixes
            .iter()
            .map(String::as_str)
            .chain(self.recover_did_suffixes())
            .chain(self.deactivate_did_suffixes())
    }

    /// Suffixes of the recover references.
    pub fn recover_did_suffixes(&self) -> impl Iterator<Item = &str> {
        self.model
            .operations
            .recover
            .iter()
            .map(|r| r.did_suffix.as_str())
    }

    /// Suffixes of the deactivate references.
    pub fn deactivate_did_suffixes(&self) -> impl Iterator<Item = &str> {
        self.model
            .operations
            .deactivate
            .iter()
            .map(|r| r.did_suffix.as_str())
    }

    /// Operations referenced by this file.
    pub fn operation_count(&self) -> usize {
        let operations = &self.model.operations;
        operations.create.len() + operations.recover.len() + operations.deactivate.len()
    }
}
