//! # Provisional Proof File
//!
//! Signed data of update operations, positionally aligned with the
//! provisional index file's update references.

use super::codec::FileKind;
use super::core_proof::max_proof_file_size;
use super::references::SignedDataReference;
use serde::{Deserialize, Serialize};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use st_01_operations::{SignedData, UpdateOperation, UpdateSignedData};

const PROVISIONAL_PROOF_FILE: FileKind = FileKind {
    name: "provisional proof file",
    decompression_failure: ErrorCode::ProvisionalProofFileDecompressionFailure,
    not_json: ErrorCode::ProvisionalProofFileNotJson,
    schema_invalid: ErrorCode::ProvisionalProofFileSchemaInvalid,
    max_size: max_proof_file_size,
};

/// Proofs of a provisional proof file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionalProofOperations {
    /// Update proofs.
    pub update: Vec<SignedDataReference>,
}

/// Wire model of a provisional proof file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionalProofFileModel {
    /// Proofs.
    pub operations: ProvisionalProofOperations,
}

/// A parsed provisional proof file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionalProofFile {
    /// Decoded update proofs.
    pub update_proofs: Vec<SignedData<UpdateSignedData>>,
}

impl ProvisionalProofFile {
    /// Decompress and parse a provisional proof file.
    pub fn parse(bytes: &[u8], params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let model: ProvisionalProofFileModel = PROVISIONAL_PROOF_FILE.decode(bytes, params)?;
        if model.operations.update.is_empty() {
            return Err(ProtocolError::new(
                ErrorCode::ProvisionalProofFileHasNoProofs,
                "provisional proof file carries no proofs",
            ));
        }
        let update_proofs = model
            .operations
            .update
            .iter()
            .map(|proof| SignedData::parse_update(&proof.signed_data, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { update_proofs })
    }

    /// Build a compressed provisional proof file, or `None` without updates.
    pub fn create_buffer(updates: &[UpdateOperation]) -> Result<Option<Vec<u8>>, ProtocolError> {
        if updates.is_empty() {
            return Ok(None);
        }
        let model = ProvisionalProofFileModel {
            operations: ProvisionalProofOperations {
                update: updates
                    .iter()
                    .map(|op| SignedDataReference {
                        signed_data: op.signed_data.jws.to_compact(),
                    })
                    .collect(),
            },
        };
        PROVISIONAL_PROOF_FILE.encode(&model).map(Some)
    }
}
