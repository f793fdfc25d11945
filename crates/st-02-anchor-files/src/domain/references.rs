//! Operation references embedded in index and proof files.

use serde::{Deserialize, Serialize};
use shared_types::{ProtocolError, ProtocolParameters};
use st_01_operations::{
    validate_did_suffix, validate_encoded_multihash, DeactivateOperation, RecoverOperation,
    SuffixData, UpdateOperation,
};

/// `{suffixData}` of a create operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReference {
    /// Suffix data of the create operation.
    pub suffix_data: SuffixData,
}

/// `{didSuffix, revealValue}` of a recover, deactivate, or update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OperationReference {
    /// Target identifier suffix.
    pub did_suffix: String,
    /// Reveal value of the key authorizing the operation.
    pub reveal_value: String,
}

impl OperationReference {
    pub(crate) fn validate(&self, params: &ProtocolParameters) -> Result<(), ProtocolError> {
        validate_did_suffix(&self.did_suffix, params)?;
        validate_encoded_multihash(&self.reveal_value, "reveal value", params)?;
        Ok(())
    }
}

impl From<&RecoverOperation> for OperationReference {
    fn from(op: &RecoverOperation) -> Self {
        Self {
            did_suffix: op.did_unique_suffix.clone(),
            reveal_value: op.reveal_value.clone(),
        }
    }
}

impl From<&DeactivateOperation> for OperationReference {
    fn from(op: &DeactivateOperation) -> Self {
        Self {
            did_suffix: op.did_unique_suffix.clone(),
            reveal_value: op.reveal_value.clone(),
        }
    }
}

impl From<&UpdateOperation> for OperationReference {
    fn from(op: &UpdateOperation) -> Self {
        Self {
            did_suffix: op.did_unique_suffix.clone(),
            reveal_value: op.reveal_value.clone(),
        }
    }
}

/// `{signedData}` entry of a proof file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SignedDataReference {
    /// Compact JWS.
    pub signed_data: String,
}
