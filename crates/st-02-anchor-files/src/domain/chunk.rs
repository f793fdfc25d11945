//! # Chunk File
//!
//! `{"deltas": [...]}`: deltas of create, recover, then update operations,
//! positionally aligned with the references in the index files.

use super::codec::FileKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use st_01_operations::{CreateOperation, Delta, RecoverOperation, UpdateOperation};

const CHUNK_FILE: FileKind = FileKind {
    name: "chunk file",
    decompression_failure: ErrorCode::ChunkFileDecompressionFailure,
    not_json: ErrorCode::ChunkFileNotJson,
    schema_invalid: ErrorCode::ChunkFileSchemaInvalid,
    max_size: max_chunk_file_size,
};

fn max_chunk_file_size(params: &ProtocolParameters) -> usize {
    params.max_chunk_file_size_in_bytes
}

/// Wire model of a chunk file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkFileModel {
    /// Raw deltas. Each is validated when its operation is applied.
    pub deltas: Vec<Value>,
}

/// A parsed chunk file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    /// The wire model.
    pub model: ChunkFileModel,
}

impl ChunkFile {
    /// Decompress and parse a chunk file, bounding each delta's size.
    pub fn parse(bytes: &[u8], params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let model: ChunkFileModel = CHUNK_FILE.decode(bytes, params)?;
        for (index, delta) in model.deltas.iter().enumerate() {
            let size = Delta::canonical_size(delta)
                .map_err(|e| ProtocolError::new(ErrorCode::ChunkFileSchemaInvalid, e.message))?;
            if size > params.max_delta_size_in_bytes {
                return Err(ProtocolError::new(
                    ErrorCode::ChunkFileDeltaSizeExceedsLimit,
                    format!(
                        "delta {} is {} bytes, limit is {}",
                        index, size, params.max_delta_size_in_bytes
                    ),
                ));
            }
        }
        Ok(Self { model })
    }

    /// Build a compressed chunk file, or `None` when there are no deltas.
    pub fn create_buffer(
        creates: &[CreateOperation],
        recovers: &[RecoverOperation],
        updates: &[UpdateOperation],
    ) -> Result<Option<Vec<u8>>, ProtocolError> {
        let deltas = creates
            .iter()
            .map(|op| (op.did_unique_suffix.as_str(), op.delta.as_ref()))
            .chain(
                recovers
                    .iter()
                    .map(|op| (op.did_unique_suffix.as_str(), op.delta.as_ref())),
            )
            .chain(
                updates
                    .iter()
                    .map(|op| (op.did_unique_suffix.as_str(), op.delta.as_ref())),
            )
            .map(require_delta)
            .collect::<Result<Vec<_>, _>>()?;

        if deltas.is_empty() {
            return Ok(None);
        }
        CHUNK_FILE.encode(&ChunkFileModel { deltas }).map(Some)
    }

    /// Raw deltas in file order.
    pub fn deltas(&self) -> &[Value] {
        &self.model.deltas
    }
}

fn require_delta((suffix, delta): (&str, Option<&Delta>)) -> Result<Value, ProtocolError> {
    delta.map(|d| d.as_value().clone()).ok_or_else(|| {
        ProtocolError::new(
            ErrorCode::ChunkFileDeltaMissing,
            format!("operation for '{}' has no delta to batch", suffix),
        )
    })
}
