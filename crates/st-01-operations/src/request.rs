//! # Request Builders
//!
//! Build signed operation requests for wallets, tooling, and tests. Every
//! builder produces bytes that pass [`Operation::parse_for_ingestion`].
//!
//! [`Operation::parse_for_ingestion`]: crate::Operation::parse_for_ingestion

use crate::domain::delta::Delta;
use crate::domain::errors::{crypto_error, schema_error};
use crate::domain::patches::DocumentPatch;
use crate::domain::signed_data::{DeactivateSignedData, RecoverSignedData, UpdateSignedData};
use crate::domain::suffix_data::SuffixData;
use crate::domain::validation::{canonicalize_then_hash_then_encode, commitment_for_key};
use serde::Serialize;
use serde_json::json;
use shared_crypto::{multihash, CompactJws, PublicKeyJwk, Secp256k1KeyPair};
use shared_types::{ErrorCode, OperationType, ProtocolError, ProtocolParameters};

/// A built request ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    /// Kind of the operation.
    pub operation_type: OperationType,
    /// Target identifier suffix.
    pub did_unique_suffix: String,
    /// Request bytes.
    pub operation_buffer: Vec<u8>,
}

/// The recovery and update key pairs of one identifier generation.
pub struct KeySet {
    recovery: Secp256k1KeyPair,
    update: Secp256k1KeyPair,
}

impl KeySet {
    /// Fresh random keys.
    pub fn generate() -> Self {
        Self {
            recovery: Secp256k1KeyPair::generate(),
            update: Secp256k1KeyPair::generate(),
        }
    }

    /// Deterministic keys derived from `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            recovery: derive_keypair(seed, b"recovery"),
            update: derive_keypair(seed, b"update"),
        }
    }

    /// Deterministic keys where one key pair serves as both the recovery
    /// and the update key.
    pub fn from_seed_shared(seed: u64) -> Self {
        Self {
            recovery: derive_keypair(seed, b"shared"),
            update: derive_keypair(seed, b"shared"),
        }
    }

    /// Recovery key pair.
    pub fn recovery_keypair(&self) -> &Secp256k1KeyPair {
        &self.recovery
    }

    /// Update key pair.
    pub fn update_keypair(&self) -> &Secp256k1KeyPair {
        &self.update
    }

    /// Recovery public key.
    pub fn recovery_public_jwk(&self) -> PublicKeyJwk {
        self.recovery.public_key_jwk()
    }

    /// Update public key.
    pub fn update_public_jwk(&self) -> PublicKeyJwk {
        self.update.public_key_jwk()
    }

    /// Commitment of the recovery key.
    pub fn recovery_commitment(&self, params: &ProtocolParameters) -> Result<String, ProtocolError> {
        commitment_for_key(&self.recovery_public_jwk(), params)
    }

    /// Commitment of the update key.
    pub fn update_commitment(&self, params: &ProtocolParameters) -> Result<String, ProtocolError> {
        commitment_for_key(&self.update_public_jwk(), params)
    }

    /// Reveal value of the recovery key.
    pub fn recovery_reveal_value(
        &self,
        params: &ProtocolParameters,
    ) -> Result<String, ProtocolError> {
        canonicalize_then_hash_then_encode(&self.recovery_public_jwk(), params)
    }

    /// Reveal value of the update key.
    pub fn update_reveal_value(&self, params: &ProtocolParameters) -> Result<String, ProtocolError> {
        canonicalize_then_hash_then_encode(&self.update_public_jwk(), params)
    }
}

/// Build a create request committing to `keys`.
pub fn create_request(
    keys: &KeySet,
    patches: Vec<DocumentPatch>,
    params: &ProtocolParameters,
) -> Result<OperationRequest, ProtocolError> {
    let delta = Delta::new(patches, keys.update_commitment(params)?)?;
    let suffix_data = SuffixData {
        delta_hash: delta.hash(params)?,
        recovery_commitment: keys.recovery_commitment(params)?,
        did_type: None,
    };
    let did_unique_suffix = suffix_data.compute_unique_suffix(params)?;
    let operation_buffer = to_buffer(&json!({
        "type": "create",
        "suffixData": suffix_data,
        "delta": delta.as_value(),
    }))?;

    Ok(OperationRequest {
        operation_type: OperationType::Create,
        did_unique_suffix,
        operation_buffer,
    })
}

/// Build an update signed by `current`, committing to `next`'s update key.
pub fn update_request(
    did_unique_suffix: &str,
    current: &KeySet,
    next: &KeySet,
    patches: Vec<DocumentPatch>,
    params: &ProtocolParameters,
) -> Result<OperationRequest, ProtocolError> {
    let delta = Delta::new(patches, next.update_commitment(params)?)?;
    let signed = UpdateSignedData {
        update_key: current.update_public_jwk(),
        delta_hash: delta.hash(params)?,
    };
    let jws = CompactJws::sign(&signed, current.update_keypair(), None).map_err(crypto_error)?;
    let operation_buffer = to_buffer(&json!({
        "type": "update",
        "didSuffix": did_unique_suffix,
        "revealValue": current.update_reveal_value(params)?,
        "delta": delta.as_value(),
        "signedData": jws.to_compact(),
    }))?;

    Ok(OperationRequest {
        operation_type: OperationType::Update,
        did_unique_suffix: did_unique_suffix.to_string(),
        operation_buffer,
    })
}

/// Build a recovery signed by `current`, committing to both keys of `next`.
pub fn recover_request(
    did_unique_suffix: &str,
    current: &KeySet,
    next: &KeySet,
    patches: Vec<DocumentPatch>,
    params: &ProtocolParameters,
) -> Result<OperationRequest, ProtocolError> {
    let delta = Delta::new(patches, next.update_commitment(params)?)?;
    let signed = RecoverSignedData {
        recovery_commitment: next.recovery_commitment(params)?,
        recovery_key: current.recovery_public_jwk(),
        delta_hash: delta.hash(params)?,
    };
    let jws = CompactJws::sign(&signed, current.recovery_keypair(), None).map_err(crypto_error)?;
    let operation_buffer = to_buffer(&json!({
        "type": "recover",
        "didSuffix": did_unique_suffix,
        "revealValue": current.recovery_reveal_value(params)?,
        "delta": delta.as_value(),
        "signedData": jws.to_compact(),
    }))?;

    Ok(OperationRequest {
        operation_type: OperationType::Recover,
        did_unique_suffix: did_unique_suffix.to_string(),
        operation_buffer,
    })
}

/// Build a deactivation signed by `current`'s recovery key.
pub fn deactivate_request(
    did_unique_suffix: &str,
    current: &KeySet,
    params: &ProtocolParameters,
) -> Result<OperationRequest, ProtocolError> {
    let signed = DeactivateSignedData {
        did_suffix: did_unique_suffix.to_string(),
        recovery_key: current.recovery_public_jwk(),
    };
    let jws = CompactJws::sign(&signed, current.recovery_keypair(), None).map_err(crypto_error)?;
    let operation_buffer = to_buffer(&json!({
        "type": "deactivate",
        "didSuffix": did_unique_suffix,
        "revealValue": current.recovery_reveal_value(params)?,
        "signedData": jws.to_compact(),
    }))?;

    Ok(OperationRequest {
        operation_type: OperationType::Deactivate,
        did_unique_suffix: did_unique_suffix.to_string(),
        operation_buffer,
    })
}

fn to_buffer<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(value)
        .map_err(|e| schema_error(ErrorCode::OperationNotJson, "operation request", e))
}

fn derive_keypair(seed: u64, tag: &[u8]) -> Secp256k1KeyPair {
    let mut material = seed.to_be_bytes().to_vec();
    material.extend_from_slice(tag);
    let secret = multihash::digest(&material, multihash::SHA2_256)
        .ok()
        .and_then(|digest| <[u8; 32]>::try_from(digest.as_slice()).ok())
        .and_then(|bytes| Secp256k1KeyPair::from_bytes(bytes).ok());
    secret.unwrap_or_else(Secp256k1KeyPair::generate)
}
