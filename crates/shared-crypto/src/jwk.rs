//! ES256K public keys in JWK form.

use crate::{encoder, CryptoError};
use serde::{Deserialize, Serialize};

/// A secp256k1 public key as a JWK. Private members are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicKeyJwk {
    /// Key type, always `EC`.
    pub kty: String,
    /// Curve, always `secp256k1`.
    pub crv: String,
    /// base64url x coordinate.
    pub x: String,
    /// base64url y coordinate.
    pub y: String,
}

impl PublicKeyJwk {
    /// Build a JWK from raw affine coordinates.
    pub fn from_coordinates(x: &[u8], y: &[u8]) -> Self {
        Self {
            kty: "EC".to_string(),
            crv: "secp256k1".to_string(),
            x: encoder::encode(x),
            y: encoder::encode(y),
        }
    }

    /// Parse a JWK from JSON, rejecting unknown members such as `d`.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CryptoError> {
        let jwk: Self = serde_json::from_value(value.clone())
            .map_err(|e| CryptoError::InvalidJwk(e.to_string()))?;
        jwk.validate()?;
        Ok(jwk)
    }

    /// Check key type, curve, and coordinate encoding.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.kty != "EC" || self.crv != "secp256k1" {
            return Err(CryptoError::UnsupportedKeyType {
                kty: self.kty.clone(),
                crv: self.crv.clone(),
            });
        }
        self.coordinate("x", &self.x)?;
        self.coordinate("y", &self.y)?;
        Ok(())
    }

    /// Uncompressed SEC1 form: `0x04 || x || y`.
    pub fn to_sec1_uncompressed(&self) -> Result<[u8; 65], CryptoError> {
        let x = self.coordinate("x", &self.x)?;
        let y = self.coordinate("y", &self.y)?;
        let mut bytes = [0u8; 65];
        bytes[0] = 0x04;
        bytes[1..33].copy_from_slice(&x);
        bytes[33..].copy_from_slice(&y);
        Ok(bytes)
    }

    fn coordinate(&self, name: &str, encoded: &str) -> Result<[u8; 32], CryptoError> {
        let bytes = encoder::decode(encoded)?;
        <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
            CryptoError::InvalidJwk(format!("{} must be 32 bytes, got {}", name, bytes.len()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> PublicKeyJwk {
        PublicKeyJwk::from_coordinates(&[1u8; 32], &[2u8; 32])
    }

    #[test]
    fn test_valid_jwk() {
        let jwk = sample();
        assert!(jwk.validate().is_ok());
        let sec1 = jwk.to_sec1_uncompressed().unwrap();
        assert_eq!(sec1[0], 0x04);
        assert_eq!(&sec1[1..33], &[1u8; 32]);
    }

    #[test]
    fn test_rejects_private_member() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["d"] = json!("secret");
        assert!(matches!(
            PublicKeyJwk::from_value(&value),
            Err(CryptoError::InvalidJwk(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_curve() {
        let mut jwk = sample();
        jwk.crv = "P-256".into();
        assert!(matches!(
            jwk.validate(),
            Err(CryptoError::UnsupportedKeyType { .. })
        ));
    }

    #[test]
    fn test_rejects_short_coordinate() {
        let mut jwk = sample();
        jwk.x = encoder::encode([1u8; 31]);
        assert!(matches!(jwk.validate(), Err(CryptoError::InvalidJwk(_))));
    }
}
