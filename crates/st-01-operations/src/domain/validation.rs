//! Input validators shared by operations and anchor file codecs.

use super::errors::crypto_error;
use serde::Serialize;
use shared_crypto::{multihash, Multihash};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};

/// Validate that `encoded` is a base64url multihash using the protocol's code.
pub fn validate_encoded_multihash(
    encoded: &str,
    name: &str,
    params: &ProtocolParameters,
) -> Result<Multihash, ProtocolError> {
    let decoded = Multihash::decode_encoded(encoded).map_err(|e| {
        let mut err = crypto_error(e);
        err.message = format!("{}: {}", name, err.message);
        err
    })?;
    if decoded.code != params.hash_algorithm_in_multihash_code {
        return Err(ProtocolError::new(
            ErrorCode::MultihashNotSupported,
            format!(
                "{} uses multihash code {}, expected {}",
                name, decoded.code, params.hash_algorithm_in_multihash_code
            ),
        ));
    }
    Ok(decoded)
}

/// Validate an identifier suffix.
pub fn validate_did_suffix(suffix: &str, params: &ProtocolParameters) -> Result<(), ProtocolError> {
    validate_encoded_multihash(suffix, "DID suffix", params)
        .map(|_| ())
        .map_err(|e| ProtocolError::new(ErrorCode::DidSuffixIncorrectEncoding, e.message))
}

/// Validate that `reveal_value` opens the commitment of `key`.
pub fn validate_reveal_value<T: Serialize>(
    reveal_value: &str,
    key: &T,
    params: &ProtocolParameters,
) -> Result<(), ProtocolError> {
    validate_encoded_multihash(reveal_value, "reveal value", params)?;
    if !multihash::canonicalize_and_verify(key, reveal_value) {
        return Err(ProtocolError::new(
            ErrorCode::RevealValueMismatch,
            "reveal value does not match the hash of the signed public key",
        ));
    }
    Ok(())
}

/// base64url(multihash(JCS(value))) with the protocol's hash code.
pub fn canonicalize_then_hash_then_encode<T: Serialize + ?Sized>(
    value: &T,
    params: &ProtocolParameters,
) -> Result<String, ProtocolError> {
    multihash::canonicalize_then_hash_then_encode(value, params.hash_algorithm_in_multihash_code)
        .map_err(crypto_error)
}

/// Commitment (double hash) of a public key with the protocol's hash code.
pub fn commitment_for_key<T: Serialize + ?Sized>(
    key: &T,
    params: &ProtocolParameters,
) -> Result<String, ProtocolError> {
    multihash::canonicalize_then_double_hash_then_encode(
        key,
        params.hash_algorithm_in_multihash_code,
    )
    .map_err(crypto_error)
}

/// The commitment a reveal value opens.
///
/// Hashes the digest carried by the reveal value with the same code, so
/// the result equals [`commitment_for_key`] of the revealed key.
pub fn commitment_from_reveal_value(
    reveal_value: &str,
    params: &ProtocolParameters,
) -> Result<String, ProtocolError> {
    let revealed = validate_encoded_multihash(reveal_value, "reveal value", params)?;
    multihash::hash_then_encode(&revealed.digest, revealed.code).map_err(crypto_error)
}

/// Validate a CAS URI referenced from an anchor file.
pub fn validate_cas_uri(
    uri: &str,
    name: &str,
    params: &ProtocolParameters,
) -> Result<(), ProtocolError> {
    if uri.len() > params.max_cas_uri_length {
        return Err(ProtocolError::new(
            ErrorCode::CasFileUriExceedsMaxLength,
            format!("{} length {} exceeds {}", name, uri.len(), params.max_cas_uri_length),
        ));
    }
    if uri.is_empty() || !uri.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(ProtocolError::new(
            ErrorCode::CasFileUriInvalid,
            format!("{} '{}' is not an alphanumeric CAS URI", name, uri),
        ));
    }
    Ok(())
}
