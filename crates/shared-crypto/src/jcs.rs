//! JSON Canonicalization Scheme (RFC 8785).

use crate::CryptoError;
use serde::Serialize;

/// Canonical UTF-8 bytes of `value`.
pub fn canonicalize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CryptoError> {
    serde_jcs::to_vec(value).map_err(|e| CryptoError::CanonicalizationFailed(e.to_string()))
}
