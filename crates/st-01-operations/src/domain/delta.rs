//! # Delta
//!
//! `{patches, updateCommitment}`: the document change of create, update,
//! and recover operations. The raw JSON is kept so hashes are computed over
//! exactly what was received.

use super::errors::{crypto_error, schema_error};
use super::patches::DocumentPatch;
use super::validation::validate_encoded_multihash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_crypto::{jcs, multihash};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DeltaModel {
    patches: Vec<Value>,
    update_commitment: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeltaOut<'a> {
    patches: &'a [DocumentPatch],
    update_commitment: &'a str,
}

/// A validated delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    /// Patches, in application order.
    pub patches: Vec<DocumentPatch>,
    /// Commitment for the next update.
    pub update_commitment: String,
    raw: Value,
}

impl Delta {
    /// Build a delta from typed parts.
    pub fn new(
        patches: Vec<DocumentPatch>,
        update_commitment: impl Into<String>,
    ) -> Result<Self, ProtocolError> {
        let update_commitment = update_commitment.into();
        let raw = serde_json::to_value(DeltaOut {
            patches: &patches,
            update_commitment: &update_commitment,
        })
        .map_err(|e| schema_error(ErrorCode::DeltaMissingOrUnknownProperty, "delta", e))?;
        Ok(Self {
            patches,
            update_commitment,
            raw,
        })
    }

    /// Parse and validate a delta.
    pub fn parse(value: &Value, params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let size = Self::canonical_size(value)?;
        if size > params.max_delta_size_in_bytes {
            return Err(ProtocolError::new(
                ErrorCode::DeltaExceedsMaximumSize,
                format!("delta size {} exceeds {}", size, params.max_delta_size_in_bytes),
            ));
        }

        let model: DeltaModel = serde_json::from_value(value.clone())
            .map_err(|e| schema_error(ErrorCode::DeltaMissingOrUnknownProperty, "delta", e))?;
        let patches = model
            .patches
            .iter()
            .map(DocumentPatch::parse)
            .collect::<Result<Vec<_>, _>>()?;
        validate_encoded_multihash(&model.update_commitment, "update commitment", params)?;

        Ok(Self {
            patches,
            update_commitment: model.update_commitment,
            raw: value.clone(),
        })
    }

    /// The delta JSON as received or built.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Size in bytes of the canonical form of a raw delta; the quantity
    /// bounded by `max_delta_size_in_bytes`.
    pub fn canonical_size(value: &Value) -> Result<usize, ProtocolError> {
        jcs::canonicalize(value)
            .map(|bytes| bytes.len())
            .map_err(crypto_error)
    }

    /// Whether `delta_hash` is the multihash of this delta.
    pub fn matches_hash(&self, delta_hash: &str) -> bool {
        multihash::canonicalize_and_verify(&self.raw, delta_hash)
    }

    /// Encoded multihash of this delta.
    pub fn hash(&self, params: &ProtocolParameters) -> Result<String, ProtocolError> {
        super::validation::canonicalize_then_hash_then_encode(&self.raw, params)
    }
}
