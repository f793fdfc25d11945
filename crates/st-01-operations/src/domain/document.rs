//! # Document State
//!
//! The internal document the patches operate on: a set of public keys and a
//! set of service endpoints, each addressed by a short base64url id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_crypto::encoder;
use shared_types::{ErrorCode, ProtocolError};
use std::collections::HashSet;

/// Maximum length of a public key or service id.
pub const MAX_ID_LENGTH: usize = 50;

/// Maximum length of a service type.
pub const MAX_SERVICE_TYPE_LENGTH: usize = 30;

/// Verification relationships a public key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum PublicKeyPurpose {
    Authentication,
    AssertionMethod,
    CapabilityInvocation,
    CapabilityDelegation,
    KeyAgreement,
}

/// A public key entry of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PublicKeyEntry {
    /// Key id, unique within the document.
    pub id: String,
    /// Verification method type.
    #[serde(rename = "type")]
    pub key_type: String,
    /// Public key material.
    pub public_key_jwk: Value,
    /// Purposes; absent means the key is only referenced by id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purposes: Option<Vec<PublicKeyPurpose>>,
}

impl PublicKeyEntry {
    /// Validate id, key material, and purposes.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        validate_id(&self.id)?;

        match self.public_key_jwk.as_object() {
            Some(jwk) if !jwk.contains_key("d") => {}
            _ => {
                return Err(ProtocolError::new(
                    ErrorCode::DocumentComposerPublicKeyJwkMissingOrIncorrectType,
                    format!("public key '{}' must carry a public-only JWK object", self.id),
                ))
            }
        }

        if let Some(purposes) = &self.purposes {
            if purposes.is_empty() {
                return Err(ProtocolError::new(
                    ErrorCode::DocumentComposerPublicKeyPurposesEmpty,
                    format!("public key '{}' lists no purposes", self.id),
                ));
            }
            let unique: HashSet<_> = purposes.iter().collect();
            if unique.len() != purposes.len() {
                return Err(ProtocolError::new(
                    ErrorCode::DocumentComposerPublicKeyPurposesDuplicated,
                    format!("public key '{}' repeats a purpose", self.id),
                ));
            }
        }
        Ok(())
    }
}

/// A service endpoint entry of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceEntry {
    /// Service id, unique within the document.
    pub id: String,
    /// Service type.
    #[serde(rename = "type")]
    pub service_type: String,
    /// URI string or JSON object.
    pub service_endpoint: Value,
}

impl ServiceEntry {
    /// Validate id, type, and endpoint.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        validate_id(&self.id)?;

        if self.service_type.len() > MAX_SERVICE_TYPE_LENGTH {
            return Err(ProtocolError::new(
                ErrorCode::DocumentComposerServiceTypeTooLong,
                format!(
                    "service type length {} exceeds {}",
                    self.service_type.len(),
                    MAX_SERVICE_TYPE_LENGTH
                ),
            ));
        }

        let valid_endpoint = match &self.service_endpoint {
            Value::String(uri) => looks_like_uri(uri),
            Value::Object(_) => true,
            _ => false,
        };
        if !valid_endpoint {
            return Err(ProtocolError::new(
                ErrorCode::DocumentComposerServiceEndpointInvalid,
                format!("service '{}' endpoint must be a URI or an object", self.id),
            ));
        }
        Ok(())
    }
}

/// The document as maintained by the protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DocumentState {
    /// Public keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_keys: Vec<PublicKeyEntry>,
    /// Service endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceEntry>,
}

impl DocumentState {
    /// Validate every entry and the uniqueness of ids.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for key in &self.public_keys {
            key.validate()?;
        }
        ensure_unique_ids(self.public_keys.iter().map(|k| k.id.as_str()))?;

        for service in &self.services {
            service.validate()?;
        }
        ensure_unique_ids(self.services.iter().map(|s| s.id.as_str()))?;
        Ok(())
    }

    /// Look up a public key by id.
    pub fn public_key(&self, id: &str) -> Option<&PublicKeyEntry> {
        self.public_keys.iter().find(|key| key.id == id)
    }

    /// Look up a service by id.
    pub fn service(&self, id: &str) -> Option<&ServiceEntry> {
        self.services.iter().find(|service| service.id == id)
    }
}

/// Validate a key or service id.
pub fn validate_id(id: &str) -> Result<(), ProtocolError> {
    if id.len() > MAX_ID_LENGTH {
        return Err(ProtocolError::new(
            ErrorCode::DocumentComposerIdTooLong,
            format!("id length {} exceeds {}", id.len(), MAX_ID_LENGTH),
        ));
    }
    if id.is_empty() || !encoder::is_base64url_charset(id) {
        return Err(ProtocolError::new(
            ErrorCode::DocumentComposerIdNotUsingBase64UrlCharacterSet,
            format!("id '{}' is not base64url", id),
        ));
    }
    Ok(())
}

/// Reject repeated ids.
pub fn ensure_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), ProtocolError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ProtocolError::new(
                ErrorCode::DocumentComposerIdDuplicated,
                format!("id '{}' appears more than once", id),
            ));
        }
    }
    Ok(())
}

fn looks_like_uri(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    scheme_ok && !rest.is_empty() && !value.chars().any(char::is_whitespace)
}
