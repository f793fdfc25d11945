//! # base64url Encoder
//!
//! Every encoded value on the wire is base64url without padding. Decoding is
//! strict: padding, non-URL-safe characters, and non-zero trailing bits are
//! rejected so each byte string has exactly one encoding.

use crate::CryptoError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Encode bytes as base64url without padding.
pub fn encode(content: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(content)
}

/// Decode a base64url string.
pub fn decode(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))
}

/// Whether every character is in the base64url alphabet.
pub fn is_base64url_charset(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
