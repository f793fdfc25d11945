//! # ES256K Keys
//!
//! secp256k1 key pairs for update and recovery keys, and the raw `r || s`
//! signatures carried inside compact JWS values.
//!
//! Signing uses RFC 6979 nonces over a SHA-256 prehash, so the same key and
//! message always give the same signature. Verification rejects high-S
//! signatures.

use crate::{CryptoError, PublicKeyJwk};
use k256::ecdsa::signature::{Signer, Verifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

/// Public half of an update or recovery key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secp256k1PublicKey(VerifyingKey);

impl Secp256k1PublicKey {
    /// Decode the point of a JWK. The JWK is validated first and the point
    /// must lie on the curve.
    pub fn from_jwk(jwk: &PublicKeyJwk) -> Result<Self, CryptoError> {
        jwk.validate()?;
        VerifyingKey::from_sec1_bytes(&jwk.to_sec1_uncompressed()?)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }

    /// JWK with the affine coordinates of the point.
    pub fn to_jwk(&self) -> PublicKeyJwk {
        let point = self.0.to_encoded_point(false);
        let (x, y) = point.as_bytes()[1..].split_at(32);
        PublicKeyJwk::from_coordinates(x, y)
    }

    /// Check `signature` over `message`.
    pub fn verify(&self, message: &[u8], signature: &Secp256k1Signature) -> Result<(), CryptoError> {
        let signature =
            Signature::from_slice(&signature.0).map_err(|_| CryptoError::InvalidSignatureFormat)?;
        if signature.normalize_s().is_some() {
            return Err(CryptoError::SignatureVerificationFailed);
        }
        self.0
            .verify(message, &signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// Fixed-width `r || s` signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Secp256k1Signature([u8; 64]);

impl Secp256k1Signature {
    /// Parse the 64 bytes decoded from a JWS signature segment.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        <[u8; 64]>::try_from(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidSignatureFormat)
    }

    /// Bytes to place in a JWS signature segment.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Signing key; the secret scalar is wiped when the pair is dropped.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Fresh key pair from the thread RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Key pair from a 32-byte secret scalar. The copy passed in is wiped
    /// before returning.
    pub fn from_bytes(mut secret: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_bytes((&secret).into());
        secret.zeroize();
        Ok(Self {
            signing_key: signing_key.map_err(|_| CryptoError::InvalidPrivateKey)?,
        })
    }

    /// Public half.
    pub fn public_key(&self) -> Secp256k1PublicKey {
        Secp256k1PublicKey(*self.signing_key.verifying_key())
    }

    /// Public half as a JWK.
    pub fn public_key_jwk(&self) -> PublicKeyJwk {
        self.public_key().to_jwk()
    }

    /// Sign `message`. The result is always low-S.
    pub fn sign(&self, message: &[u8]) -> Secp256k1Signature {
        let signature: Signature = self.signing_key.sign(message);
        let signature = signature.normalize_s().unwrap_or(signature);
        Secp256k1Signature(signature.to_bytes().into())
    }
}
