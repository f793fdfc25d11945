//! # Operation Composer
//!
//! Cross-file checks over one transaction's anchor files, and the
//! composition of the operations they describe.
//!
//! Each file is already valid on its own; the rules here relate files to
//! each other and to the operation count the writer paid for.
//!
//! | Rule | Code |
//! |------|------|
//! | core index references more operations than paid | `CoreIndexFileOperationCountExceededPaidLimit` |
//! | core proofs do not line up with recover/deactivate references | `CoreProofFileOperationCountMismatch` |
//! | an update targets a suffix the core index already references | `ProvisionalIndexFileDidReferenceDuplicate` |
//! | core plus update operations exceed the paid count | `ProvisionalIndexFileUpdateOperationCountExceededPaidLimit` |
//! | update proofs do not line up with update references | `ProvisionalProofFileOperationCountMismatch` |
//! | chunk deltas do not line up with create, recover, and update operations | `ChunkFileDeltaCountIncorrect` |
//!
//! Composed operations are ordered create, recover, deactivate, update and
//! numbered by that position.

use serde_json::{json, Value};
use shared_types::{AnchoredOperation, ErrorCode, OperationType, ProtocolError, Transaction};
use st_02_anchor_files::{
    ChunkFile, CoreIndexFile, CoreProofFile, ProvisionalIndexFile, ProvisionalProofFile,
};

/// The parsed anchor files of one transaction.
#[derive(Debug, Clone)]
pub struct AnchorFileSet {
    /// Core index file.
    pub core_index: CoreIndexFile,
    /// Core proof file, when the core index references one.
    pub core_proof: Option<CoreProofFile>,
    /// Provisional index file, when the core index references one.
    pub provisional_index: Option<ProvisionalIndexFile>,
    /// Provisional proof file, when the provisional index references one.
    pub provisional_proof: Option<ProvisionalProofFile>,
    /// Chunk file, when the provisional index references one.
    pub chunk: Option<ChunkFile>,
}

/// Reject a core index that references more operations than were paid for.
pub fn check_core_index_within_paid_limit(
    core_index: &CoreIndexFile,
    paid_operation_count: usize,
) -> Result<(), ProtocolError> {
    let count = core_index.operation_count();
    if count > paid_operation_count {
        return Err(ProtocolError::new(
            ErrorCode::CoreIndexFileOperationCountExceededPaidLimit,
            format!(
                "core index references {} operations, {} were paid for",
                count, paid_operation_count
            ),
        ));
    }
    Ok(())
}

impl AnchorFileSet {
    /// Validate the files against each other and compose the operations.
    pub fn compose(
        &self,
        transaction: &Transaction,
        paid_operation_count: usize,
    ) -> Result<Vec<AnchoredOperation>, ProtocolError> {
        check_core_index_within_paid_limit(&self.core_index, paid_operation_count)?;
        self.check_core_proofs()?;
        self.check_updates(paid_operation_count)?;
        let deltas = self.checked_deltas()?;

        let operations = &self.core_index.model.operations;
        let (recover_proofs, deactivate_proofs) = match &self.core_proof {
            Some(proof) => (proof.recover_proofs.as_slice(), proof.deactivate_proofs.as_slice()),
            None => (&[][..], &[][..]),
        };
        let update_proofs = self
            .provisional_proof
            .as_ref()
            .map(|proof| proof.update_proofs.as_slice())
            .unwrap_or_default();
        let mut deltas = deltas.iter();

        let mut composed = Vec::with_capacity(self.operation_count());
        for (reference, suffix) in operations
            .create
            .iter()
            .zip(&self.core_index.create_did_suffixes)
        {
            let buffer = json!({
                "type": OperationType::Create.as_str(),
                "suffixData": reference.suffix_data,
                "delta": deltas.next(),
            });
            composed.push((OperationType::Create, suffix.as_str(), buffer));
        }
        for (reference, proof) in operations.recover.iter().zip(recover_proofs) {
            let buffer = json!({
                "type": OperationType::Recover.as_str(),
                "didSuffix": reference.did_suffix,
                "revealValue": reference.reveal_value,
                "signedData": proof.jws.to_compact(),
                "delta": deltas.next(),
            });
            composed.push((OperationType::Recover, reference.did_suffix.as_str(), buffer));
        }
        for (reference, proof) in operations.deactivate.iter().zip(deactivate_proofs) {
            let buffer = json!({
                "type": OperationType::Deactivate.as_str(),
                "didSuffix": reference.did_suffix,
                "revealValue": reference.reveal_value,
                "signedData": proof.jws.to_compact(),
            });
            composed.push((OperationType::Deactivate, reference.did_suffix.as_str(), buffer));
        }
        if let Some(provisional_index) = &self.provisional_index {
            for (reference, proof) in provisional_index.update_references().zip(update_proofs) {
                let buffer = json!({
                    "type": OperationType::Update.as_str(),
                    "didSuffix": reference.did_suffix,
                    "revealValue": reference.reveal_value,
                    "signedData": proof.jws.to_compact(),
                    "delta": deltas.next(),
                });
                composed.push((OperationType::Update, reference.did_suffix.as_str(), buffer));
            }
        }

        Ok(composed
            .into_iter()
            .enumerate()
            .map(|(index, (operation_type, suffix, buffer))| AnchoredOperation {
                operation_type,
                did_unique_suffix: suffix.to_string(),
                operation_buffer: buffer.to_string().into_bytes(),
                transaction_number: transaction.transaction_number,
                transaction_time: transaction.transaction_time,
                operation_index: index as u32,
            })
            .collect())
    }

    /// Operations across all files.
    pub fn operation_count(&self) -> usize {
        self.core_index.operation_count() + self.update_count()
    }

    fn update_count(&self) -> usize {
        self.provisional_index
            .as_ref()
            .map_or(0, |file| file.update_references().count())
    }

    fn check_core_proofs(&self) -> Result<(), ProtocolError> {
        let operations = &self.core_index.model.operations;
        let (recovers, deactivates) = self
            .core_proof
            .as_ref()
            .map_or((0, 0), |proof| (proof.recover_proofs.len(), proof.deactivate_proofs.len()));
        if recovers != operations.recover.len() || deactivates != operations.deactivate.len() {
            return Err(ProtocolError::new(
                ErrorCode::CoreProofFileOperationCountMismatch,
                format!(
                    "core proofs cover {} recover and {} deactivate operations, index references {} and {}",
                    recovers,
                    deactivates,
                    operations.recover.len(),
                    operations.deactivate.len()
                ),
            ));
        }
        Ok(())
    }

    fn check_updates(&self, paid_operation_count: usize) -> Result<(), ProtocolError> {
        let Some(provisional_index) = &self.provisional_index else {
            return Ok(());
        };

        for suffix in provisional_index.update_did_suffixes() {
            if self.core_index.did_unique_suffixes().any(|core| core == suffix) {
                return Err(ProtocolError::new(
                    ErrorCode::ProvisionalIndexFileDidReferenceDuplicate,
                    format!("update of '{}' repeats a core index reference", suffix),
                ));
            }
        }

        let total = self.operation_count();
        if total > paid_operation_count {
            return Err(ProtocolError::new(
                ErrorCode::ProvisionalIndexFileUpdateOperationCountExceededPaidLimit,
                format!(
                    "{} operations including updates, {} were paid for",
                    total, paid_operation_count
                ),
            ));
        }

        let updates = self.update_count();
        let proofs = self
            .provisional_proof
            .as_ref()
            .map_or(0, |proof| proof.update_proofs.len());
        if proofs != updates {
            return Err(ProtocolError::new(
                ErrorCode::ProvisionalProofFileOperationCountMismatch,
                format!("{} update proofs for {} update references", proofs, updates),
            ));
        }
        Ok(())
    }

    fn checked_deltas(&self) -> Result<&[Value], ProtocolError> {
        let operations = &self.core_index.model.operations;
        let expected = operations.create.len() + operations.recover.len() + self.update_count();
        let deltas = self.chunk.as_ref().map(ChunkFile::deltas).unwrap_or_default();
        if deltas.len() != expected {
            return Err(ProtocolError::new(
                ErrorCode::ChunkFileDeltaCountIncorrect,
                format!("chunk carries {} deltas, {} expected", deltas.len(), expected),
            ));
        }
        Ok(deltas)
    }
}
