//! Suffix data of create operations and unique suffix derivation.

use super::errors::schema_error;
use super::validation::{canonicalize_then_hash_then_encode, validate_encoded_multihash};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_crypto::encoder;
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};

/// Maximum length of the optional identifier type.
pub const MAX_TYPE_LENGTH: usize = 4;

/// `{deltaHash, recoveryCommitment, type?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SuffixData {
    /// Hash of the initial delta.
    pub delta_hash: String,
    /// Commitment of the first recovery key.
    pub recovery_commitment: String,
    /// Optional identifier type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub did_type: Option<String>,
}

impl SuffixData {
    /// Parse and validate suffix data.
    pub fn parse(value: &Value, params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let suffix_data: SuffixData = serde_json::from_value(value.clone()).map_err(|e| {
            schema_error(ErrorCode::SuffixDataMissingOrUnknownProperty, "suffix data", e)
        })?;
        suffix_data.validate(params)?;
        Ok(suffix_data)
    }

    /// Validate hashes and the type.
    pub fn validate(&self, params: &ProtocolParameters) -> Result<(), ProtocolError> {
        validate_encoded_multihash(&self.delta_hash, "delta hash", params)?;
        validate_encoded_multihash(&self.recovery_commitment, "recovery commitment", params)?;
        if let Some(did_type) = &self.did_type {
            if did_type.len() > MAX_TYPE_LENGTH || !encoder::is_base64url_charset(did_type) {
                return Err(ProtocolError::new(
                    ErrorCode::SuffixDataTypeInvalid,
                    format!("type '{}' must be at most {} base64url characters", did_type, MAX_TYPE_LENGTH),
                ));
            }
        }
        Ok(())
    }

    /// The identifier suffix this suffix data produces.
    pub fn compute_unique_suffix(&self, params: &ProtocolParameters) -> Result<String, ProtocolError> {
        compute_unique_suffix(self, params)
    }
}

/// base64url(multihash(JCS(suffix data))).
pub fn compute_unique_suffix(
    suffix_data: &SuffixData,
    params: &ProtocolParameters,
) -> Result<String, ProtocolError> {
    canonicalize_then_hash_then_encode(suffix_data, params)
}
