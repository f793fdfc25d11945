//! # Document Patches
//!
//! A delta carries a list of patches applied in order to the current
//! document. Application is all-or-nothing: if any patch fails, the caller
//! keeps the document it started with.
//!
//! | Action | Effect |
//! |--------|--------|
//! | `replace` | Replace the whole document |
//! | `add-public-keys` | Add keys, overwriting keys with the same id |
//! | `remove-public-keys` | Remove keys by id |
//! | `add-services` | Add services, overwriting services with the same id |
//! | `remove-services` | Remove services by id |
//! | `ietf-json-patch` | RFC 6902 patch over the document JSON |

use super::document::{
    ensure_unique_ids, validate_id, DocumentState, PublicKeyEntry, ServiceEntry,
};
use super::errors::schema_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ErrorCode, ProtocolError};

const ACTIONS: [&str; 6] = [
    "replace",
    "add-public-keys",
    "remove-public-keys",
    "add-services",
    "remove-services",
    "ietf-json-patch",
];

/// One patch of a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case", deny_unknown_fields)]
pub enum DocumentPatch {
    /// Replace the whole document.
    Replace {
        /// The new document.
        document: DocumentState,
    },
    /// Add or overwrite public keys.
    AddPublicKeys {
        /// Keys to add.
        #[serde(rename = "publicKeys")]
        public_keys: Vec<PublicKeyEntry>,
    },
    /// Remove public keys by id.
    RemovePublicKeys {
        /// Ids to remove.
        ids: Vec<String>,
    },
    /// Add or overwrite services.
    AddServices {
        /// Services to add.
        services: Vec<ServiceEntry>,
    },
    /// Remove services by id.
    RemoveServices {
        /// Ids to remove.
        ids: Vec<String>,
    },
    /// RFC 6902 operations over the document JSON.
    IetfJsonPatch {
        /// Raw JSON patch operations.
        patches: Vec<Value>,
    },
}

impl DocumentPatch {
    /// Parse and validate one patch.
    pub fn parse(value: &Value) -> Result<Self, ProtocolError> {
        let action = value.get("action").and_then(Value::as_str);
        match action {
            Some(action) if ACTIONS.contains(&action) => {}
            _ => {
                return Err(ProtocolError::new(
                    ErrorCode::DocumentComposerPatchMissingOrUnknownAction,
                    format!("patch action {:?} is missing or unknown", action),
                ))
            }
        }

        let patch: DocumentPatch = serde_json::from_value(value.clone()).map_err(|e| {
            schema_error(ErrorCode::DocumentComposerPatchMissingOrUnknownProperty, "patch", e)
        })?;
        patch.validate()?;
        Ok(patch)
    }

    /// Validate the patch content.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            DocumentPatch::Replace { document } => document.validate(),
            DocumentPatch::AddPublicKeys { public_keys } => {
                for key in public_keys {
                    key.validate()?;
                }
                ensure_unique_ids(public_keys.iter().map(|k| k.id.as_str()))
            }
            DocumentPatch::AddServices { services } => {
                for service in services {
                    service.validate()?;
                }
                ensure_unique_ids(services.iter().map(|s| s.id.as_str()))
            }
            DocumentPatch::RemovePublicKeys { ids } | DocumentPatch::RemoveServices { ids } => {
                ids.iter().try_for_each(|id| validate_id(id))
            }
            DocumentPatch::IetfJsonPatch { patches } => json_patch_operations(patches).map(|_| ()),
        }
    }

    /// Apply this patch to `document`.
    pub fn apply(&self, mut document: DocumentState) -> Result<DocumentState, ProtocolError> {
        match self {
            DocumentPatch::Replace { document: replacement } => Ok(replacement.clone()),
            DocumentPatch::AddPublicKeys { public_keys } => {
                for key in public_keys {
                    document.public_keys.retain(|existing| existing.id != key.id);
                    document.public_keys.push(key.clone());
                }
                Ok(document)
            }
            DocumentPatch::RemovePublicKeys { ids } => {
                document.public_keys.retain(|key| !ids.contains(&key.id));
                Ok(document)
            }
            DocumentPatch::AddServices { services } => {
                for service in services {
                    document.services.retain(|existing| existing.id != service.id);
                    document.services.push(service.clone());
                }
                Ok(document)
            }
            DocumentPatch::RemoveServices { ids } => {
                document.services.retain(|service| !ids.contains(&service.id));
                Ok(document)
            }
            DocumentPatch::IetfJsonPatch { patches } => apply_json_patch(&document, patches),
        }
    }
}

/// Apply `patches` in order; fails without partial effects.
pub fn apply_patches(
    document: &DocumentState,
    patches: &[DocumentPatch],
) -> Result<DocumentState, ProtocolError> {
    patches
        .iter()
        .try_fold(document.clone(), |current, patch| patch.apply(current))
}

fn json_patch_operations(patches: &[Value]) -> Result<json_patch::Patch, ProtocolError> {
    serde_json::from_value(Value::Array(patches.to_vec())).map_err(|e| {
        schema_error(
            ErrorCode::DocumentComposerPatchMissingOrUnknownProperty,
            "ietf-json-patch",
            e,
        )
    })
}

fn apply_json_patch(
    document: &DocumentState,
    patches: &[Value],
) -> Result<DocumentState, ProtocolError> {
    let operations = json_patch_operations(patches)?;
    let mut value = serde_json::to_value(document).map_err(|e| {
        schema_error(ErrorCode::DocumentComposerDocumentMissingOrUnknownProperty, "document", e)
    })?;
    json_patch::patch(&mut value, &operations).map_err(|e| {
        ProtocolError::new(ErrorCode::DocumentComposerJsonPatchFailed, e.to_string())
    })?;

    let patched: DocumentState = serde_json::from_value(value).map_err(|e| {
        schema_error(
            ErrorCode::DocumentComposerDocumentMissingOrUnknownProperty,
            "patched document",
            e,
        )
    })?;
    patched.validate()?;
    Ok(patched)
}
