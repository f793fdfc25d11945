//! # Shared Crypto - Hashing, Canonicalization, and Signatures
//!
//! Pure functions used by the operation model, the anchor file codecs, and
//! the operation processor. Nothing here performs I/O.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `encoder` | base64url (no padding) | Every encoded value on the wire |
//! | `multihash` | SHA2-256, SHA3-256 | Suffixes, delta hashes, reveal values, commitments |
//! | `jcs` | RFC 8785 | Canonical bytes before hashing |
//! | `jwk` | ES256K public JWK | Update and recovery keys |
//! | `jws` | Compact JWS, ES256K | Signed data of update/recover/deactivate |
//! | `ecdsa` | secp256k1 | Key pairs and raw signatures |
//!
//! ## Commitment Scheme
//!
//! ```text
//! public key ──JCS──► canonical bytes ──H──► D
//!   reveal value = base64url(multihash(D))
//!   commitment   = base64url(multihash(H(D)))
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod encoder;
pub mod errors;
pub mod jcs;
pub mod jwk;
pub mod jws;
pub mod multihash;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use jwk::PublicKeyJwk;
pub use jws::{CompactJws, JwsHeader};
pub use multihash::Multihash;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
