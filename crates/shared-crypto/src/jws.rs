//! # Compact JWS (ES256K)
//!
//! `base64url(header) . base64url(payload) . base64url(r || s)`
//!
//! The protected header may only carry `alg` (always `ES256K`) and an
//! optional `kid`. The payload is kept encoded; callers decode it into their
//! own signed-data schema.

use crate::{encoder, CryptoError, PublicKeyJwk, Secp256k1KeyPair, Secp256k1PublicKey};
use crate::ecdsa::Secp256k1Signature;
use serde::{Deserialize, Serialize};

/// The only supported signing algorithm.
pub const ES256K: &str = "ES256K";

/// JWS protected header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwsHeader {
    /// Signing algorithm.
    pub alg: String,
    /// Optional key identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// A parsed compact JWS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactJws {
    /// Decoded protected header.
    pub header: JwsHeader,
    protected: String,
    payload: String,
    signature: String,
}

impl CompactJws {
    /// Parse and structurally validate a compact JWS.
    pub fn parse(compact: &str) -> Result<Self, CryptoError> {
        let parts: Vec<&str> = compact.split('.').collect();
        let [protected, payload, signature] = parts.as_slice() else {
            return Err(CryptoError::InvalidJwsFormat(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        };

        let header_bytes = encoder::decode(protected)?;
        let header: JwsHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| CryptoError::InvalidJwsHeader(e.to_string()))?;
        if header.alg != ES256K {
            return Err(CryptoError::UnsupportedAlgorithm(header.alg));
        }

        encoder::decode(payload)?;
        encoder::decode(signature)?;

        Ok(Self {
            header,
            protected: protected.to_string(),
            payload: payload.to_string(),
            signature: signature.to_string(),
        })
    }

    /// Sign a JSON payload.
    pub fn sign<T: Serialize>(
        payload: &T,
        keypair: &Secp256k1KeyPair,
        kid: Option<&str>,
    ) -> Result<Self, CryptoError> {
        let header = JwsHeader {
            alg: ES256K.to_string(),
            kid: kid.map(str::to_string),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| CryptoError::InvalidJwsHeader(e.to_string()))?;
        let payload_json =
            serde_json::to_vec(payload).map_err(|e| CryptoError::PayloadNotJson(e.to_string()))?;

        let protected = encoder::encode(header_json);
        let payload = encoder::encode(payload_json);
        let signing_input = format!("{}.{}", protected, payload);
        let signature = encoder::encode(keypair.sign(signing_input.as_bytes()).as_bytes());

        Ok(Self {
            header,
            protected,
            payload,
            signature,
        })
    }

    /// Payload decoded as JSON.
    pub fn payload_json(&self) -> Result<serde_json::Value, CryptoError> {
        let bytes = encoder::decode(&self.payload)?;
        serde_json::from_slice(&bytes).map_err(|e| CryptoError::PayloadNotJson(e.to_string()))
    }

    /// Verify the signature against an ES256K public JWK.
    pub fn verify(&self, jwk: &PublicKeyJwk) -> Result<(), CryptoError> {
        let public_key = Secp256k1PublicKey::from_jwk(jwk)?;
        let signature = Secp256k1Signature::from_slice(&encoder::decode(&self.signature)?)?;
        let signing_input = format!("{}.{}", self.protected, self.payload);
        public_key.verify(signing_input.as_bytes(), &signature)
    }

    /// Whether the signature verifies against `jwk`.
    pub fn is_signed_by(&self, jwk: &PublicKeyJwk) -> bool {
        self.verify(jwk).is_ok()
    }

    /// Compact serialization.
    pub fn to_compact(&self) -> String {
        format!("{}.{}.{}", self.protected, self.payload, self.signature)
    }
}
