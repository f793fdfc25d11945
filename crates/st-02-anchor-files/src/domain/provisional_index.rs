//! # Provisional Index File
//!
//! Carries update references and links the single chunk file and, when
//! updates exist, the provisional proof file.

use super::codec::{first_duplicate, FileKind};
use super::references::OperationReference;
use serde::{Deserialize, Serialize};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use st_01_operations::{validate_cas_uri, UpdateOperation};

const PROVISIONAL_INDEX_FILE: FileKind = FileKind {
    name: "provisional index file",
    decompression_failure: ErrorCode::ProvisionalIndexFileDecompressionFailure,
    not_json: ErrorCode::ProvisionalIndexFileNotJson,
    schema_invalid: ErrorCode::ProvisionalIndexFileSchemaInvalid,
    max_size: max_provisional_index_file_size,
};

fn max_provisional_index_file_size(params: &ProtocolParameters) -> usize {
    params.max_provisional_index_file_size_in_bytes
}

/// `{chunkFileUri}` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkReference {
    /// URI of the chunk file.
    pub chunk_file_uri: String,
}

/// Update references of a provisional index file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionalOperations {
    /// Update references.
    pub update: Vec<OperationReference>,
}

/// Wire model of a provisional index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProvisionalIndexFileModel {
    /// URI of the provisional proof file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisional_proof_file_uri: Option<String>,
    /// Chunk references; exactly one.
    pub chunks: Vec<ChunkReference>,
    /// Update references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<ProvisionalOperations>,
}

/// A parsed and validated provisional index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionalIndexFile {
    /// The wire model.
    pub model: ProvisionalIndexFileModel,
}

impl ProvisionalIndexFile {
    /// Decompress, parse, and validate a provisional index file.
    pub fn parse(bytes: &[u8], params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let model: ProvisionalIndexFileModel = PROVISIONAL_INDEX_FILE.decode(bytes, params)?;

        let [chunk] = model.chunks.as_slice() else {
            return Err(ProtocolError::new(
                ErrorCode::ProvisionalIndexFileChunkCountIncorrect,
                format!("expected exactly one chunk, found {}", model.chunks.len()),
            ));
        };
        validate_cas_uri(&chunk.chunk_file_uri, "chunk file URI", params)?;

        let file = Self { model };
        let has_updates = file.update_references().next().is_some();
        match (&file.model.provisional_proof_file_uri, has_updates) {
            (Some(uri), true) => validate_cas_uri(uri, "provisional proof file URI", params)?,
            (None, false) => {}
            (None, true) => {
                return Err(ProtocolError::new(
                    ErrorCode::ProvisionalIndexFileProvisionalProofFileUriMissing,
                    "update references require a provisional proof file URI",
                ))
            }
            (Some(_), false) => {
                return Err(ProtocolError::new(
                    ErrorCode::ProvisionalIndexFileProvisionalProofFileUriNotAllowed,
                    "provisional proof file URI given without update references",
                ))
            }
        }

        for reference in file.update_references() {
            reference.validate(params)?;
        }
        if let Some(duplicate) = first_duplicate(file.update_did_suffixes()) {
            return Err(ProtocolError::new(
                ErrorCode::ProvisionalIndexFileDidReferenceDuplicate,
                format!("suffix '{}' is referenced more than once", duplicate),
            ));
        }
        Ok(file)
    }

    /// Build a compressed provisional index file, or `None` without a chunk.
    pub fn create_buffer(
        chunk_file_uri: Option<&str>,
        provisional_proof_file_uri: Option<&str>,
        updates: &[UpdateOperation],
    ) -> Result<Option<Vec<u8>>, ProtocolError> {
        let Some(chunk_file_uri) = chunk_file_uri else {
            return Ok(None);
        };
        let operations = (!updates.is_empty()).then(|| ProvisionalOperations {
            update: updates.iter().map(OperationReference::from).collect(),
        });
        let model = ProvisionalIndexFileModel {
            provisional_proof_file_uri: provisional_proof_file_uri.map(str::to_string),
            chunks: vec![ChunkReference {
                chunk_file_uri: chunk_file_uri.to_string(),
            }],
            operations,
        };
        PROVISIONAL_INDEX_FILE.encode(&model).map(Some)
    }

    /// URI of the single chunk file.
    pub fn chunk_file_uri(&self) -> &str {
        self.model
            .chunks
            .first()
            .map(|chunk| chunk.chunk_file_uri.as_str())
            .unwrap_or_default()
    }

    /// Update references in file order.
    pub fn update_references(&self) -> impl Iterator<Item = &OperationReference> {
        self.model
            .operations
            .iter()
            .flat_map(|operations| operations.update.iter())
    }

    /// Suffixes of the update references.
    pub fn update_did_suffixes(&self) -> impl Iterator<Item = &str> {
        self.update_references().map(|r| r.did_suffix.as_str())
    }
}
