//! # Operations
//!
//! The four operation kinds as one sum type. Two parse modes exist:
//!
//! - [`Operation::parse`] reads operations composed from anchor files. A
//!   delta that fails validation is treated as absent, since the anchored
//!   operation still moves keys forward even when its document change is
//!   unusable.
//! - [`Operation::parse_for_ingestion`] is used before queueing. The delta
//!   must be present, valid, and match its hash, and the signature must
//!   verify.

use super::delta::Delta;
use super::errors::schema_error;
use super::signed_data::{
    DeactivateSignedData, RecoverSignedData, SignedData, UpdateSignedData,
};
use super::suffix_data::SuffixData;
use super::validation::{validate_did_suffix, validate_reveal_value};
use serde::Deserialize;
use serde_json::{Map, Value};
use shared_types::{ErrorCode, OperationType, ProtocolError, ProtocolParameters};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseMode {
    Anchored,
    Ingestion,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateRequest {
    suffix_data: Value,
    #[serde(default)]
    delta: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct SignedRequest {
    did_suffix: String,
    reveal_value: String,
    signed_data: String,
    #[serde(default)]
    delta: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct DeactivateRequest {
    did_suffix: String,
    reveal_value: String,
    signed_data: String,
}

/// A create operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation {
    /// Suffix derived from the suffix data.
    pub did_unique_suffix: String,
    /// Suffix data.
    pub suffix_data: SuffixData,
    /// Initial delta, if present and valid.
    pub delta: Option<Delta>,
    /// Raw operation bytes.
    pub operation_buffer: Vec<u8>,
}

/// An update operation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOperation {
    /// Target identifier suffix.
    pub did_unique_suffix: String,
    /// Reveal value of the update key.
    pub reveal_value: String,
    /// Signed `{updateKey, deltaHash}`.
    pub signed_data: SignedData<UpdateSignedData>,
    /// Delta, if present and valid.
    pub delta: Option<Delta>,
    /// Raw operation bytes.
    pub operation_buffer: Vec<u8>,
}

/// A recover operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverOperation {
    /// Target identifier suffix.
    pub did_unique_suffix: String,
    /// Reveal value of the recovery key.
    pub reveal_value: String,
    /// Signed `{recoveryCommitment, recoveryKey, deltaHash}`.
    pub signed_data: SignedData<RecoverSignedData>,
    /// Delta, if present and valid.
    pub delta: Option<Delta>,
    /// Raw operation bytes.
    pub operation_buffer: Vec<u8>,
}

/// A deactivate operation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeactivateOperation {
    /// Target identifier suffix.
    pub did_unique_suffix: String,
    /// Reveal value of the recovery key.
    pub reveal_value: String,
    /// Signed `{didSuffix, recoveryKey}`.
    pub signed_data: SignedData<DeactivateSignedData>,
    /// Raw operation bytes.
    pub operation_buffer: Vec<u8>,
}

/// Any operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// See [`CreateOperation`].
    Create(CreateOperation),
    /// See [`UpdateOperation`].
    Update(UpdateOperation),
    /// See [`RecoverOperation`].
    Recover(RecoverOperation),
    /// See [`DeactivateOperation`].
    Deactivate(DeactivateOperation),
}

impl Operation {
    /// Parse an anchored operation; an invalid delta becomes `None`.
    pub fn parse(buffer: &[u8], params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        Self::parse_with_mode(buffer, params, ParseMode::Anchored)
    }

    /// Parse an operation submitted for queueing.
    pub fn parse_for_ingestion(
        buffer: &[u8],
        params: &ProtocolParameters,
    ) -> Result<Self, ProtocolError> {
        let operation = Self::parse_with_mode(buffer, params, ParseMode::Ingestion)?;
        operation.verify_for_ingestion()?;
        Ok(operation)
    }

    fn parse_with_mode(
        buffer: &[u8],
        params: &ProtocolParameters,
        mode: ParseMode,
    ) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_slice(buffer)
            .map_err(|e| schema_error(ErrorCode::OperationNotJson, "operation", e))?;
        let Value::Object(mut object) = value else {
            return Err(ProtocolError::new(
                ErrorCode::OperationNotJson,
                "operation must be a JSON object",
            ));
        };

        let operation_type = object
            .remove("type")
            .and_then(|t| t.as_str().and_then(OperationType::from_wire))
            .ok_or_else(|| {
                ProtocolError::new(
                    ErrorCode::OperationTypeUnknownOrMissing,
                    "operation type is missing or unknown",
                )
            })?;

        let buffer = buffer.to_vec();
        match operation_type {
            OperationType::Create => {
                CreateOperation::from_object(object, buffer, params, mode).map(Operation::Create)
            }
            OperationType::Update => {
                UpdateOperation::from_object(object, buffer, params, mode).map(Operation::Update)
            }
            OperationType::Recover => {
                RecoverOperation::from_object(object, buffer, params, mode).map(Operation::Recover)
            }
            OperationType::Deactivate => {
                DeactivateOperation::from_object(object, buffer, params).map(Operation::Deactivate)
            }
        }
    }

    fn verify_for_ingestion(&self) -> Result<(), ProtocolError> {
        match self {
            Operation::Create(op) => {
                require_delta_hash(op.delta.as_ref(), &op.suffix_data.delta_hash)
            }
            Operation::Update(op) => {
                require_delta_hash(op.delta.as_ref(), &op.signed_data.payload.delta_hash)?;
                require_signature(op.signed_data.is_signed_by(&op.signed_data.payload.update_key))
            }
            Operation::Recover(op) => {
                require_delta_hash(op.delta.as_ref(), &op.signed_data.payload.delta_hash)?;
                require_signature(op.signed_data.is_signed_by(&op.signed_data.payload.recovery_key))
            }
            Operation::Deactivate(op) => {
                require_signature(op.signed_data.is_signed_by(&op.signed_data.payload.recovery_key))
            }
        }
    }

    /// Kind of the operation.
    pub fn operation_type(&self) -> OperationType {
        match self {
            Operation::Create(_) => OperationType::Create,
            Operation::Update(_) => OperationType::Update,
            Operation::Recover(_) => OperationType::Recover,
            Operation::Deactivate(_) => OperationType::Deactivate,
        }
    }

    /// Target identifier suffix.
    pub fn did_unique_suffix(&self) -> &str {
        match self {
            Operation::Create(op) => &op.did_unique_suffix,
            Operation::Update(op) => &op.did_unique_suffix,
            Operation::Recover(op) => &op.did_unique_suffix,
            Operation::Deactivate(op) => &op.did_unique_suffix,
        }
    }

    /// Raw operation bytes.
    pub fn operation_buffer(&self) -> &[u8] {
        match self {
            Operation::Create(op) => &op.operation_buffer,
            Operation::Update(op) => &op.operation_buffer,
            Operation::Recover(op) => &op.operation_buffer,
            Operation::Deactivate(op) => &op.operation_buffer,
        }
    }

    /// Delta, if the kind carries one and it is valid.
    pub fn delta(&self) -> Option<&Delta> {
        match self {
            Operation::Create(op) => op.delta.as_ref(),
            Operation::Update(op) => op.delta.as_ref(),
            Operation::Recover(op) => op.delta.as_ref(),
            Operation::Deactivate(_) => None,
        }
    }

    /// Reveal value, for every kind but create.
    pub fn reveal_value(&self) -> Option<&str> {
        match self {
            Operation::Create(_) => None,
            Operation::Update(op) => Some(&op.reveal_value),
            Operation::Recover(op) => Some(&op.reveal_value),
            Operation::Deactivate(op) => Some(&op.reveal_value),
        }
    }
}

impl CreateOperation {
    fn from_object(
        object: Map<String, Value>,
        operation_buffer: Vec<u8>,
        params: &ProtocolParameters,
        mode: ParseMode,
    ) -> Result<Self, ProtocolError> {
        let request: CreateRequest = serde_json::from_value(Value::Object(object)).map_err(|e| {
            schema_error(ErrorCode::CreateOperationMissingOrUnknownProperty, "create", e)
        })?;
        let suffix_data = SuffixData::parse(&request.suffix_data, params)?;
        let did_unique_suffix = suffix_data.compute_unique_suffix(params)?;
        let delta = parse_delta(request.delta.as_ref(), params, mode)?;

        Ok(Self {
            did_unique_suffix,
            suffix_data,
            delta,
            operation_buffer,
        })
    }
}

impl UpdateOperation {
    fn from_object(
        object: Map<String, Value>,
        operation_buffer: Vec<u8>,
        params: &ProtocolParameters,
        mode: ParseMode,
    ) -> Result<Self, ProtocolError> {
        let request: SignedRequest = serde_json::from_value(Value::Object(object)).map_err(|e| {
            schema_error(ErrorCode::UpdateOperationMissingOrUnknownProperty, "update", e)
        })?;
        validate_did_suffix(&request.did_suffix, params)?;
        let signed_data = SignedData::parse_update(&request.signed_data, params)?;
        validate_reveal_value(&request.reveal_value, &signed_data.payload.update_key, params)?;
        let delta = parse_delta(request.delta.as_ref(), params, mode)?;

        Ok(Self {
            did_unique_suffix: request.did_suffix,
            reveal_value: request.reveal_value,
            signed_data,
            delta,
            operation_buffer,
        })
    }
}

impl RecoverOperation {
    fn from_object(
        object: Map<String, Value>,
        operation_buffer: Vec<u8>,
        params: &ProtocolParameters,
        mode: ParseMode,
    ) -> Result<Self, ProtocolError> {
        let request: SignedRequest = serde_json::from_value(Value::Object(object)).map_err(|e| {
            schema_error(ErrorCode::RecoverOperationMissingOrUnknownProperty, "recover", e)
        })?;
        validate_did_suffix(&request.did_suffix, params)?;
        let signed_data = SignedData::parse_recover(&request.signed_data, params)?;
        validate_reveal_value(&request.reveal_value, &signed_data.payload.recovery_key, params)?;
        let delta = parse_delta(request.delta.as_ref(), params, mode)?;

        Ok(Self {
            did_unique_suffix: request.did_suffix,
            reveal_value: request.reveal_value,
            signed_data,
            delta,
            operation_buffer,
        })
    }
}

impl DeactivateOperation {
    fn from_object(
        object: Map<String, Value>,
        operation_buffer: Vec<u8>,
        params: &ProtocolParameters,
    ) -> Result<Self, ProtocolError> {
        let request: DeactivateRequest =
            serde_json::from_value(Value::Object(object)).map_err(|e| {
                schema_error(ErrorCode::DeactivateOperationMissingOrUnknownProperty, "deactivate", e)
            })?;
        validate_did_suffix(&request.did_suffix, params)?;
        let signed_data = SignedData::parse_deactivate(&request.signed_data, params)?;
        if signed_data.payload.did_suffix != request.did_suffix {
            return Err(ProtocolError::new(
                ErrorCode::DeactivateDidSuffixMismatch,
                "signed DID suffix does not match the operation's DID suffix",
            ));
        }
        validate_reveal_value(&request.reveal_value, &signed_data.payload.recovery_key, params)?;

        Ok(Self {
            did_unique_suffix: request.did_suffix,
            reveal_value: request.reveal_value,
            signed_data,
            operation_buffer,
        })
    }
}

fn parse_delta(
    value: Option<&Value>,
    params: &ProtocolParameters,
    mode: ParseMode,
) -> Result<Option<Delta>, ProtocolError> {
    let Some(value) = value else {
        return match mode {
            ParseMode::Anchored => Ok(None),
            ParseMode::Ingestion => Err(ProtocolError::new(
                ErrorCode::DeltaMissing,
                "operation must carry a delta",
            )),
        };
    };
    match (Delta::parse(value, params), mode) {
        (Ok(delta), _) => Ok(Some(delta)),
        (Err(err), ParseMode::Anchored) => {
            debug!(code = %err.code, "Ignoring invalid delta of anchored operation");
            Ok(None)
        }
        (Err(err), ParseMode::Ingestion) => Err(err),
    }
}

fn require_delta_hash(delta: Option<&Delta>, delta_hash: &str) -> Result<(), ProtocolError> {
    match delta {
        Some(delta) if delta.matches_hash(delta_hash) => Ok(()),
        Some(_) => Err(ProtocolError::new(
            ErrorCode::DeltaHashMismatch,
            "delta does not match the signed delta hash",
        )),
        None => Err(ProtocolError::new(
            ErrorCode::DeltaMissing,
            "operation must carry a delta",
        )),
    }
}

fn require_signature(valid: bool) -> Result<(), ProtocolError> {
    if valid {
        Ok(())
    } else {
        Err(ProtocolError::new(
            ErrorCode::SignatureInvalid,
            "signed data does not verify against the revealed key",
        ))
    }
}
