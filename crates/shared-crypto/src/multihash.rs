//! # Multihash
//!
//! Self-describing hashes: `varint(code) || varint(length) || digest`.
//!
//! Supported codes:
//!
//! | Code | Algorithm |
//! |------|-----------|
//! | `0x12` | SHA2-256 |
//! | `0x16` | SHA3-256 |

use crate::{encoder, jcs, CryptoError};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

/// SHA2-256 multihash code.
pub const SHA2_256: u64 = 0x12;

/// SHA3-256 multihash code.
pub const SHA3_256: u64 = 0x16;

/// A decoded multihash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multihash {
    /// Hash algorithm code.
    pub code: u64,
    /// Raw digest bytes.
    pub digest: Vec<u8>,
}

impl Multihash {
    /// Hash `content` with the algorithm identified by `code`.
    pub fn hash(content: &[u8], code: u64) -> Result<Self, CryptoError> {
        Ok(Self {
            code,
            digest: digest(content, code)?,
        })
    }

    /// Decode multihash bytes; the length prefix must match the digest.
    pub fn decode(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (code, rest) = read_varint(bytes)?;
        let (length, digest) = read_varint(rest)?;
        if digest.len() as u64 != length {
            return Err(CryptoError::InvalidMultihash(format!(
                "declared digest length {} but found {}",
                length,
                digest.len()
            )));
        }
        Ok(Self {
            code,
            digest: digest.to_vec(),
        })
    }

    /// Decode a base64url-encoded multihash.
    pub fn decode_encoded(encoded: &str) -> Result<Self, CryptoError> {
        Self::decode(&encoder::decode(encoded)?)
    }

    /// Multihash bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.digest.len() + 4);
        write_varint(self.code, &mut bytes);
        write_varint(self.digest.len() as u64, &mut bytes);
        bytes.extend_from_slice(&self.digest);
        bytes
    }

    /// base64url of the multihash bytes.
    pub fn encode(&self) -> String {
        encoder::encode(self.to_bytes())
    }
}

/// Raw digest of `content` for a supported code.
pub fn digest(content: &[u8], code: u64) -> Result<Vec<u8>, CryptoError> {
    match code {
        SHA2_256 => Ok(Sha256::digest(content).to_vec()),
        SHA3_256 => Ok(Sha3_256::digest(content).to_vec()),
        other => Err(CryptoError::UnsupportedHashAlgorithm { code: other }),
    }
}

/// Whether `code` names a supported algorithm.
pub fn is_supported(code: u64) -> bool {
    matches!(code, SHA2_256 | SHA3_256)
}

/// base64url(multihash(content)).
pub fn hash_then_encode(content: &[u8], code: u64) -> Result<String, CryptoError> {
    Ok(Multihash::hash(content, code)?.encode())
}

/// base64url(multihash(JCS(value))).
///
/// Used for unique suffixes, delta hashes, and reveal values.
pub fn canonicalize_then_hash_then_encode<T: Serialize + ?Sized>(
    value: &T,
    code: u64,
) -> Result<String, CryptoError> {
    hash_then_encode(&jcs::canonicalize(value)?, code)
}

/// base64url(multihash(H(JCS(value)))).
///
/// Used for commitments: the inner hash is the digest the reveal value exposes.
pub fn canonicalize_then_double_hash_then_encode<T: Serialize + ?Sized>(
    value: &T,
    code: u64,
) -> Result<String, CryptoError> {
    let inner = digest(&jcs::canonicalize(value)?, code)?;
    hash_then_encode(&inner, code)
}

/// Whether `encoded` is the multihash of `content` under its own code.
pub fn verify_encoded_multihash_for_content(content: &[u8], encoded: &str) -> bool {
    match Multihash::decode_encoded(encoded) {
        Ok(expected) => digest(content, expected.code)
            .map(|actual| actual == expected.digest)
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// Whether `encoded` is the multihash of JCS(`value`).
pub fn canonicalize_and_verify<T: Serialize + ?Sized>(value: &T, encoded: &str) -> bool {
    match jcs::canonicalize(value) {
        Ok(bytes) => verify_encoded_multihash_for_content(&bytes, encoded),
        Err(_) => false,
    }
}

/// Whether `commitment` is the double hash of JCS(`value`).
pub fn canonicalize_and_verify_double_hash<T: Serialize + ?Sized>(
    value: &T,
    commitment: &str,
) -> bool {
    let Ok(expected) = Multihash::decode_encoded(commitment) else {
        return false;
    };
    let Ok(bytes) = jcs::canonicalize(value) else {
        return false;
    };
    digest(&bytes, expected.code)
        .and_then(|inner| digest(&inner, expected.code))
        .map(|outer| outer == expected.digest)
        .unwrap_or(false)
}

/// Commitment that a reveal value opens.
pub fn commitment_from_reveal_value(reveal_value: &str) -> Result<String, CryptoError> {
    let revealed = Multihash::decode_encoded(reveal_value)?;
    hash_then_encode(&revealed.digest, revealed.code)
}

fn read_varint(bytes: &[u8]) -> Result<(u64, &[u8]), CryptoError> {
    let mut value: u64 = 0;
    for (i, byte) in bytes.iter().enumerate().take(9) {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, &bytes[i + 1..]));
        }
    }
    Err(CryptoError::InvalidMultihash("truncated varint".into()))
}

fn write_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
