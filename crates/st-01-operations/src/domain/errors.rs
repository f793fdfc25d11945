//! Mapping of crypto failures onto protocol error codes.

use shared_crypto::CryptoError;
use shared_types::{ErrorCode, ProtocolError};

/// Protocol error for a failed crypto primitive.
pub fn crypto_error(err: CryptoError) -> ProtocolError {
    let code = match &err {
        CryptoError::InvalidEncoding(_) => ErrorCode::EncodedStringIncorrectEncoding,
        CryptoError::InvalidMultihash(_) => ErrorCode::MultihashInvalid,
        CryptoError::UnsupportedHashAlgorithm { .. } => ErrorCode::MultihashNotSupported,
        CryptoError::CanonicalizationFailed(_) => ErrorCode::CanonicalizationFailed,
        CryptoError::InvalidJwk(_) => ErrorCode::JwkEs256kMissingOrUnknownProperty,
        CryptoError::UnsupportedKeyType { .. } => ErrorCode::JwkEs256kUnsupportedKeyTypeOrCurve,
        CryptoError::InvalidJwsFormat(_) => ErrorCode::JwsCompactIncorrectFormat,
        CryptoError::InvalidJwsHeader(_) => ErrorCode::JwsProtectedHeaderMissingOrUnknownProperty,
        CryptoError::UnsupportedAlgorithm(_) => ErrorCode::JwsProtectedHeaderUnsupportedAlgorithm,
        CryptoError::PayloadNotJson(_) => ErrorCode::JwsPayloadNotJson,
        CryptoError::SignatureVerificationFailed => ErrorCode::SignatureInvalid,
        CryptoError::InvalidSignatureFormat => ErrorCode::JwsSignatureIncorrectEncoding,
        CryptoError::InvalidPublicKey | CryptoError::InvalidPrivateKey => {
            ErrorCode::JwkEs256kInvalidCoordinate
        }
    };
    ProtocolError::new(code, err.to_string())
}

/// Protocol error for a schema violation reported by serde.
pub fn schema_error(code: ErrorCode, context: &str, err: serde_json::Error) -> ProtocolError {
    ProtocolError::new(code, format!("{}: {}", context, err))
}
