//! # Operation Processor
//!
//! Applies one anchored operation to the current state of its identifier.
//!
//! | Result | Meaning |
//! |--------|---------|
//! | `Err(_)` | The stored bytes are malformed |
//! | `Ok(None)` | The operation does not apply (wrong key, bad signature, wrong kind for the state) |
//! | `Ok(Some(state))` | The operation applied |
//!
//! A delta that is missing, fails its hash check, or whose patches fail does
//! not make the operation inapplicable: keys still move forward and the
//! document falls back as follows.
//!
//! | Operation | Document on delta failure | Next update commitment |
//! |-----------|---------------------------|------------------------|
//! | create | empty | none |
//! | update | unchanged | none |
//! | recover | empty | none |
//!
//! Patch failure alone keeps the delta's update commitment.

use super::did_state::DidState;
use super::errors::ResolverError;
use serde::Serialize;
use shared_types::{AnchoredOperation, ProtocolParameters};
use st_01_operations::{
    apply_patches, commitment_for_key, CreateOperation, DeactivateOperation, Delta,
    DocumentState, Operation, RecoverOperation, UpdateOperation,
};
use tracing::debug;

/// Pure state transition function for anchored operations.
#[derive(Debug, Clone)]
pub struct OperationProcessor {
    params: ProtocolParameters,
}

impl OperationProcessor {
    /// Create a processor for the given protocol parameters.
    pub fn new(params: &ProtocolParameters) -> Self {
        Self {
            params: params.clone(),
        }
    }

    /// Decode a stored operation and check it against its record.
    pub fn parse(&self, anchored: &AnchoredOperation) -> Result<Operation, ResolverError> {
        let operation = Operation::parse(&anchored.operation_buffer, &self.params)?;
        if operation.operation_type() != anchored.operation_type {
            return Err(ResolverError::OperationTypeMismatch {
                did_unique_suffix: anchored.did_unique_suffix.clone(),
                expected: anchored.operation_type,
                actual: operation.operation_type(),
            });
        }
        if operation.did_unique_suffix() != anchored.did_unique_suffix {
            return Err(ResolverError::SuffixMismatch {
                expected: anchored.did_unique_suffix.clone(),
                actual: operation.did_unique_suffix().to_string(),
            });
        }
        Ok(operation)
    }

    /// Apply `anchored` to `state`.
    pub fn apply(
        &self,
        anchored: &AnchoredOperation,
        state: Option<&DidState>,
    ) -> Result<Option<DidState>, ResolverError> {
        let operation = self.parse(anchored)?;
        Ok(self.apply_operation(&operation, anchored.transaction_number, state))
    }

    /// Apply an already decoded operation anchored in `transaction_number`.
    pub fn apply_operation(
        &self,
        operation: &Operation,
        transaction_number: u64,
        state: Option<&DidState>,
    ) -> Option<DidState> {
        match (operation, state) {
            (Operation::Create(op), None) => Some(self.apply_create(op, transaction_number)),
            (Operation::Create(_), Some(_)) => None,
            (_, None) => None,
            (_, Some(state)) if state.is_deactivated() => None,
            (Operation::Update(op), Some(state)) => {
                self.apply_update(op, transaction_number, state)
            }
            (Operation::Recover(op), Some(state)) => {
                self.apply_recover(op, transaction_number, state)
            }
            (Operation::Deactivate(op), Some(state)) => {
                self.apply_deactivate(op, transaction_number, state)
            }
        }
    }

    fn apply_create(&self, op: &CreateOperation, transaction_number: u64) -> DidState {
        let mut state = DidState {
            document: DocumentState::default(),
            next_recovery_commitment_hash: Some(op.suffix_data.recovery_commitment.clone()),
            next_update_commitment_hash: None,
            last_operation_transaction_number: transaction_number,
        };

        let Some(delta) = matching_delta(op.delta.as_ref(), &op.suffix_data.delta_hash) else {
            debug!(
                did_unique_suffix = %op.did_unique_suffix,
                "Create delta missing or mismatched, starting with an empty document"
            );
            return state;
        };
        state.next_update_commitment_hash = Some(delta.update_commitment.clone());
        state.document = patched(&state.document, delta);
        state
    }

    fn apply_update(
        &self,
        op: &UpdateOperation,
        transaction_number: u64,
        state: &DidState,
    ) -> Option<DidState> {
        let payload = &op.signed_data.payload;
        let expected = state.next_update_commitment_hash.as_deref()?;
        if !self.opens(&payload.update_key, expected) {
            debug!(did_unique_suffix = %op.did_unique_suffix, "Update key does not open commitment");
            return None;
        }
        if !op.signed_data.is_signed_by(&payload.update_key) {
            debug!(did_unique_suffix = %op.did_unique_suffix, "Update signature invalid");
            return None;
        }

        let mut next = DidState {
            document: state.document.clone(),
            next_recovery_commitment_hash: state.next_recovery_commitment_hash.clone(),
            next_update_commitment_hash: None,
            last_operation_transaction_number: transaction_number,
        };
        match matching_delta(op.delta.as_ref(), &payload.delta_hash) {
            Some(delta) => {
                next.next_update_commitment_hash = Some(delta.update_commitment.clone());
                next.document = patched(&state.document, delta);
            }
            None => debug!(
                did_unique_suffix = %op.did_unique_suffix,
                "Update delta missing or mismatched, keeping document"
            ),
        }
        Some(next)
    }

    fn apply_recover(
        &self,
        op: &RecoverOperation,
        transaction_number: u64,
        state: &DidState,
    ) -> Option<DidState> {
        let payload = &op.signed_data.payload;
        let expected = state.next_recovery_commitment_hash.as_deref()?;
        if !self.opens(&payload.recovery_key, expected) {
            debug!(did_unique_suffix = %op.did_unique_suffix, "Recovery key does not open commitment");
            return None;
        }
        if !op.signed_data.is_signed_by(&payload.recovery_key) {
            debug!(did_unique_suffix = %op.did_unique_suffix, "Recover signature invalid");
            return None;
        }

        let mut next = DidState {
            document: DocumentState::default(),
            next_recovery_commitment_hash: Some(payload.recovery_commitment.clone()),
            next_update_commitment_hash: None,
            last_operation_transaction_number: transaction_number,
        };
        match matching_delta(op.delta.as_ref(), &payload.delta_hash) {
            Some(delta) => {
                next.next_update_commitment_hash = Some(delta.update_commitment.clone());
                next.document = patched(&next.document, delta);
            }
            None => debug!(
                did_unique_suffix = %op.did_unique_suffix,
                "Recover delta missing or mismatched, document reset"
            ),
        }
        Some(next)
    }

    fn apply_deactivate(
        &self,
        op: &DeactivateOperation,
        transaction_number: u64,
        state: &DidState,
    ) -> Option<DidState> {
        let payload = &op.signed_data.payload;
        let expected = state.next_recovery_commitment_hash.as_deref()?;
        if !self.opens(&payload.recovery_key, expected) {
            debug!(did_unique_suffix = %op.did_unique_suffix, "Recovery key does not open commitment");
            return None;
        }
        if !op.signed_data.is_signed_by(&payload.recovery_key) {
            debug!(did_unique_suffix = %op.did_unique_suffix, "Deactivate signature invalid");
            return None;
        }

        Some(DidState {
            document: DocumentState::default(),
            next_recovery_commitment_hash: None,
            next_update_commitment_hash: None,
            last_operation_transaction_number: transaction_number,
        })
    }

    fn opens<T: Serialize>(&self, key: &T, commitment: &str) -> bool {
        commitment_for_key(key, &self.params)
            .map(|computed| computed == commitment)
            .unwrap_or(false)
    }
}

fn matching_delta<'a>(delta: Option<&'a Delta>, delta_hash: &str) -> Option<&'a Delta> {
    delta.filter(|delta| delta.matches_hash(delta_hash))
}

fn patched(document: &DocumentState, delta: &Delta) -> DocumentState {
    match apply_patches(document, &delta.patches) {
        Ok(document) => document,
        Err(err) => {
            debug!(code = %err.code, "Patches failed, keeping document");
            document.clone()
        }
    }
}
