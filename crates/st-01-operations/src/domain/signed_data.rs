//! # Signed Data
//!
//! Compact JWS payloads of update, recover, and deactivate operations.
//!
//! | Operation | Payload |
//! |-----------|---------|
//! | update | `{updateKey, deltaHash}` |
//! | recover | `{recoveryCommitment, recoveryKey, deltaHash}` |
//! | deactivate | `{didSuffix, recoveryKey}` |

use super::errors::{crypto_error, schema_error};
use super::validation::{validate_did_suffix, validate_encoded_multihash};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_crypto::{CompactJws, PublicKeyJwk};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};

/// Payload signed with the update key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSignedData {
    /// Key revealed by this update.
    pub update_key: PublicKeyJwk,
    /// Hash of the delta.
    pub delta_hash: String,
}

/// Payload signed with the recovery key of a recover operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecoverSignedData {
    /// Commitment of the next recovery key.
    pub recovery_commitment: String,
    /// Key revealed by this recovery.
    pub recovery_key: PublicKeyJwk,
    /// Hash of the delta.
    pub delta_hash: String,
}

/// Payload signed with the recovery key of a deactivate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeactivateSignedData {
    /// Suffix of the identifier being deactivated.
    pub did_suffix: String,
    /// Key revealed by this deactivation.
    pub recovery_key: PublicKeyJwk,
}

/// A compact JWS together with its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedData<T> {
    /// The JWS as received.
    pub jws: CompactJws,
    /// Decoded payload.
    pub payload: T,
}

impl<T> SignedData<T> {
    /// Whether the JWS verifies against `key`.
    pub fn is_signed_by(&self, key: &PublicKeyJwk) -> bool {
        self.jws.is_signed_by(key)
    }
}

impl SignedData<UpdateSignedData> {
    /// Parse the signed data of an update operation.
    pub fn parse_update(compact: &str, params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let signed: Self = parse_payload(compact, ErrorCode::UpdateSignedDataMissingOrUnknownProperty)?;
        signed.payload.update_key.validate().map_err(crypto_error)?;
        validate_encoded_multihash(&signed.payload.delta_hash, "delta hash", params)?;
        Ok(signed)
    }
}

impl SignedData<RecoverSignedData> {
    /// Parse the signed data of a recover operation.
    pub fn parse_recover(compact: &str, params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let signed: Self = parse_payload(compact, ErrorCode::RecoverSignedDataMissingOrUnknownProperty)?;
        signed.payload.recovery_key.validate().map_err(crypto_error)?;
        validate_encoded_multihash(&signed.payload.delta_hash, "delta hash", params)?;
        validate_encoded_multihash(
            &signed.payload.recovery_commitment,
            "recovery commitment",
            params,
        )?;
        Ok(signed)
    }
}

impl SignedData<DeactivateSignedData> {
    /// Parse the signed data of a deactivate operation.
    pub fn parse_deactivate(
        compact: &str,
        params: &ProtocolParameters,
    ) -> Result<Self, ProtocolError> {
        let signed: Self = parse_payload(
            compact,
            ErrorCode::DeactivateSignedDataMissingOrUnknownProperty,
        )?;
        signed.payload.recovery_key.validate().map_err(crypto_error)?;
        validate_did_suffix(&signed.payload.did_suffix, params)?;
        Ok(signed)
    }
}

fn parse_payload<T: DeserializeOwned>(
    compact: &str,
    code: ErrorCode,
) -> Result<SignedData<T>, ProtocolError> {
    let jws = CompactJws::parse(compact).map_err(crypto_error)?;
    let json = jws.payload_json().map_err(crypto_error)?;
    let payload = serde_json::from_value(json).map_err(|e| schema_error(code, "signed data", e))?;
    Ok(SignedData { jws, payload })
}
