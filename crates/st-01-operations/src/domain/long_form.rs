//! # Identifiers
//!
//! Short form: `did:<method>:<suffix>`.
//! Long form: `did:<method>:<suffix>:<base64url(JCS({suffixData, delta}))>`,
//! which lets a client resolve an identifier before it is anchored.

use super::errors::{crypto_error, schema_error};
use super::operation::{CreateOperation, Operation};
use super::validation::validate_did_suffix;
use crate::request::OperationRequest;
use serde::Deserialize;
use serde_json::{json, Value};
use shared_crypto::{encoder, jcs};
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LongFormCreateRequest {
    suffix_data: Value,
    delta: Value,
}

/// A parsed identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Did {
    /// `did:<method>:<suffix>`.
    pub short_form: String,
    /// The unique suffix.
    pub did_unique_suffix: String,
    /// Embedded create operation of a long-form identifier.
    pub create_operation: Option<CreateOperation>,
}

impl Did {
    /// Parse a short- or long-form identifier of the configured method.
    pub fn parse(did: &str, params: &ProtocolParameters) -> Result<Self, ProtocolError> {
        let prefix = params.did_prefix();
        let rest = did.strip_prefix(&prefix).ok_or_else(|| {
            ProtocolError::new(
                ErrorCode::DidIncorrectPrefix,
                format!("identifier must start with '{}'", prefix),
            )
        })?;

        let mut segments = rest.split(':');
        let suffix = segments.next().unwrap_or_default();
        let encoded = segments.next();
        if suffix.is_empty() || segments.next().is_some() {
            return Err(ProtocolError::new(
                ErrorCode::DidSuffixEmptyOrMalformed,
                "identifier suffix is empty or has extra segments",
            ));
        }
        validate_did_suffix(suffix, params)?;

        let create_operation = match encoded {
            None => None,
            Some(encoded) => Some(parse_long_form(suffix, encoded, params)?),
        };

        Ok(Self {
            short_form: format!("{}{}", prefix, suffix),
            did_unique_suffix: suffix.to_string(),
            create_operation,
        })
    }

    /// Whether the identifier carries its initial state.
    pub fn is_long_form(&self) -> bool {
        self.create_operation.is_some()
    }
}

/// Long-form identifier for a create request.
pub fn long_form_did(
    create: &OperationRequest,
    params: &ProtocolParameters,
) -> Result<String, ProtocolError> {
    let value: Value = serde_json::from_slice(&create.operation_buffer)
        .map_err(|e| schema_error(ErrorCode::OperationNotJson, "create request", e))?;
    let initial_state = json!({
        "suffixData": value["suffixData"],
        "delta": value["delta"],
    });
    let canonical = jcs::canonicalize(&initial_state).map_err(crypto_error)?;
    Ok(format!(
        "{}{}:{}",
        params.did_prefix(),
        create.did_unique_suffix,
        encoder::encode(canonical)
    ))
}

fn parse_long_form(
    suffix: &str,
    encoded: &str,
    params: &ProtocolParameters,
) -> Result<CreateOperation, ProtocolError> {
    let bytes = encoder::decode(encoded).map_err(crypto_error)?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| schema_error(ErrorCode::DidLongFormCreateRequestNotJson, "long-form", e))?;
    if jcs::canonicalize(&value).map_err(crypto_error)? != bytes {
        return Err(ProtocolError::new(
            ErrorCode::DidLongFormCreateRequestNotCanonical,
            "long-form initial state is not JCS canonical",
        ));
    }

    let request: LongFormCreateRequest = serde_json::from_value(value).map_err(|e| {
        schema_error(ErrorCode::CreateOperationMissingOrUnknownProperty, "long-form", e)
    })?;
    let buffer = serde_json::to_vec(&json!({
        "type": "create",
        "suffixData": request.suffix_data,
        "delta": request.delta,
    }))
    .map_err(|e| schema_error(ErrorCode::OperationNotJson, "long-form", e))?;

    let Operation::Create(create) = Operation::parse_for_ingestion(&buffer, params)? else {
        return Err(ProtocolError::new(
            ErrorCode::OperationTypeUnknownOrMissing,
            "long-form initial state is not a create operation",
        ));
    };
    if create.did_unique_suffix != suffix {
        return Err(ProtocolError::new(
            ErrorCode::DidUniqueSuffixFromInitialStateMismatch,
            "suffix does not match the embedded initial state",
        ));
    }
    Ok(create)
}
