//! # Core Proof File
//!
//! Signed data of recover and deactivate operations, positionally aligned
//! with the core index file's recover and deactivate references.

use super::codec::FileKind;
use super::references::SignedDataReference;
use serde::{Deserialize, Serialize};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use st_01_operations::{
    DeactivateOperation, DeactivateSignedData, RecoverOperation, RecoverSignedData, SignedData,
};

const CORE_PROOF_FILE: FileKind = FileKind {
    name: "core proof file",
    decompression_failure: ErrorCode::CoreProofFileDecompressionFailure,
    not_json: ErrorCode::CoreProofFileNotJson,
    schema_invalid: ErrorCode::CoreProofFileSchemaInvalid,
    max_size: max_proof_file_size,
};

pub(crate) fn max_proof_file_size(params: &ProtocolParameters) -> usize {
    params.max_proof_file_size_in_bytes
}

/// Proofs of a core proof file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreProofOperations {
    /// Recover proofs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recover: Vec<SignedDataReference>,
    /// Deactivate proofs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deactivate: Vec<SignedDataReference>,
}

/// Wire model of a core proof file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreProofFileModel {
    /// Proofs.
    pub operations: CoreProofOperations,
}

/// A parsed core proof file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreProofFile {
    /// Decoded recover proofs.
    pub recover_proofs: Vec<SignedData<RecoverSignedData>>,
    /// Decoded deactivate proofs.
    pub deactivate_proofs: Vec<SignedData<DeactivateSignedData>>,
}

impl CoreProofFile {
    /// Decompress and parse a core proof file.
    ///
    /// Each deactivate proof must sign the suffix at the same position in
    /// `deactivate_did_suffixes`.
    pub fn parse(
        bytes: &[u8],
        params: &ProtocolParameters,
        deactivate_did_suffixes: &[&str],
    ) -> Result<Self, ProtocolError> {
        let model: CoreProofFileModel = CORE_PROOF_FILE.decode(bytes, params)?;
        let operations = model.operations;
        if operations.recover.is_empty() && operations.deactivate.is_empty() {
            return Err(ProtocolError::new(
                ErrorCode::CoreProofFileHasNoProofs,
                "core proof file carries no proofs",
            ));
        }

        let recover_proofs = operations
            .recover
            .iter()
            .map(|proof| SignedData::parse_recover(&proof.signed_data, params))
            .collect::<Result<Vec<_>, _>>()?;
        let deactivate_proofs = operations
            .deactivate
            .iter()
            .map(|proof| SignedData::parse_deactivate(&proof.signed_data, params))
            .collect::<Result<Vec<_>, _>>()?;

        for (index, (proof, expected)) in deactivate_proofs
            .iter()
            .zip(deactivate_did_suffixes)
            .enumerate()
        {
            if proof.payload.did_suffix != *expected {
                return Err(ProtocolError::new(
                    ErrorCode::CoreProofFileDeactivateDidSuffixMismatch,
                    format!(
                        "deactivate proof {} signs '{}', index references '{}'",
                        index, proof.payload.did_suffix, expected
                    ),
                ));
            }
        }

        Ok(Self {
            recover_proofs,
            deactivate_proofs,
        })
    }

    /// Build a compressed core proof file, or `None` without proofs.
    pub fn create_buffer(
        recovers: &[RecoverOperation],
        deactivates: &[DeactivateOperation],
    ) -> Result<Option<Vec<u8>>, ProtocolError> {
        if recovers.is_empty() && deactivates.is_empty() {
            return Ok(None);
        }
        let model = CoreProofFileModel {
            operations: CoreProofOperations {
                recover: recovers
                    .iter()
                    .map(|op| SignedDataReference {
                        signed_data: op.signed_data.jws.to_compact(),
                    })
                    .collect(),
                deactivate: deactivates
                    .iter()
                    .map(|op| SignedDataReference {
                        signed_data: op.signed_data.jws.to_compact(),
                    })
                    .collect(),
            },
        };
        CORE_PROOF_FILE.encode(&model).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compressor::compress;
    use crate::test_utils::{deactivated, recovered};
    use serde_json::json;

    #[test]
    fn test_roundtrip() {
        let recovers = vec![recovered(1)];
        let deactivates = vec![deactivated(2), deactivated(3)];
        let buffer = CoreProofFile::create_buffer(&recovers, &deactivates)
            .unwrap()
            .unwrap();
        let expected: Vec<&str> = deactivates
            .iter()
            .map(|op| op.did_unique_suffix.as_str())
            .collect();

        let file = CoreProofFile::parse(&buffer, &ProtocolParameters::default(), &expected).unwrap();
        assert_eq!(file.recover_proofs, vec![recovers[0].signed_data.clone()]);
        assert_eq!(file.deactivate_proofs.len(), 2);
        assert_eq!(file.deactivate_proofs[1].payload.did_suffix, expected[1]);
    }

    #[test]
    fn test_no_proofs() {
        assert!(CoreProofFile::create_buffer(&[], &[]).unwrap().is_none());
        let buffer =
            compress(&serde_json::to_vec(&json!({ "operations": {} })).unwrap()).unwrap();
        assert_eq!(
            CoreProofFile::parse(&buffer, &ProtocolParameters::default(), &[])
                .unwrap_err()
                .code,
            ErrorCode::CoreProofFileHasNoProofs
        );
    }

    #[test]
    fn test_deactivate_suffix_mismatch() {
        let deactivates = vec![deactivated(1)];
        let other = deactivated(2);
        let buffer = CoreProofFile::create_buffer(&[], &deactivates).unwrap().unwrap();
        assert_eq!(
            CoreProofFile::parse(
                &buffer,
                &ProtocolParameters::default(),
                &[other.did_unique_suffix.as_str()]
            )
            .unwrap_err()
            .code,
            ErrorCode::CoreProofFileDeactivateDidSuffixMismatch
        );
    }
}
