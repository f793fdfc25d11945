//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Input is not canonical base64url without padding
    #[error("Invalid base64url encoding: {0}")]
    InvalidEncoding(String),

    /// Multihash bytes are malformed
    #[error("Invalid multihash: {0}")]
    InvalidMultihash(String),

    /// Hash algorithm is not supported
    #[error("Unsupported multihash code: {code}")]
    UnsupportedHashAlgorithm {
        /// Multihash code that was requested or found
        code: u64,
    },

    /// JSON canonicalization failed
    #[error("Canonicalization failed: {0}")]
    CanonicalizationFailed(String),

    /// Public key JWK has unexpected members or values
    #[error("Invalid JWK: {0}")]
    InvalidJwk(String),

    /// JWK uses a key type or curve other than EC/secp256k1
    #[error("Unsupported JWK key type or curve: {kty}/{crv}")]
    UnsupportedKeyType {
        /// Key type member
        kty: String,
        /// Curve member
        crv: String,
    },

    /// Compact JWS does not have three base64url segments
    #[error("Invalid compact JWS: {0}")]
    InvalidJwsFormat(String),

    /// JWS protected header has unexpected members
    #[error("Invalid JWS protected header: {0}")]
    InvalidJwsHeader(String),

    /// JWS algorithm other than ES256K
    #[error("Unsupported JWS algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// JWS payload is not JSON
    #[error("JWS payload is not JSON: {0}")]
    PayloadNotJson(String),

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,
}
