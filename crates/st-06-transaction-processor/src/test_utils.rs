//! Anchor file fixtures for processor tests.

use crate::domain::AnchorFileSet;
use shared_stores::MemoryCas;
use shared_types::ports::ContentAddressableStore;
use shared_types::{ProtocolError, ProtocolParameters, Transaction};
use st_01_operations::{
    create_request, deactivate_request, recover_request, update_request, CreateOperation,
    DeactivateOperation, KeySet, Operation, OperationRequest, RecoverOperation, UpdateOperation,
};
use st_02_anchor_files::{
    AnchoredData, AnchoredDataSerializer, ChunkFile, CoreIndexFile, CoreProofFile,
    ProvisionalIndexFile, ProvisionalProofFile,
};

fn parse(request: OperationRequest) -> Operation {
    Operation::parse(&request.operation_buffer, &ProtocolParameters::default()).unwrap()
}

pub fn suffix(seed: u64) -> String {
    create_request(&KeySet::from_seed(seed), vec![], &ProtocolParameters::default())
        .unwrap()
        .did_unique_suffix
}

pub fn created(seed: u64) -> CreateOperation {
    let request =
        create_request(&KeySet::from_seed(seed), vec![], &ProtocolParameters::default()).unwrap();
    match parse(request) {
        Operation::Create(op) => op,
        other => panic!("expected create, got {:?}", other.operation_type()),
    }
}

pub fn updated(seed: u64) -> UpdateOperation {
    let request = update_request(
        &suffix(seed),
        &KeySet::from_seed(seed),
        &KeySet::from_seed(seed + 1_000),
        vec![],
        &ProtocolParameters::default(),
    )
    .unwrap();
    match parse(request) {
        Operation::Update(op) => op,
        other => panic!("expected update, got {:?}", other.operation_type()),
    }
}

pub fn recovered(seed: u64) -> RecoverOperation {
    let request = recover_request(
        &suffix(seed),
        &KeySet::from_seed(seed),
        &KeySet::from_seed(seed + 1_000),
        vec![],
        &ProtocolParameters::default(),
    )
    .unwrap();
    match parse(request) {
        Operation::Recover(op) => op,
        other => panic!("expected recover, got {:?}", other.operation_type()),
    }
}

pub fn deactivated(seed: u64) -> DeactivateOperation {
    let request = deactivate_request(
        &suffix(seed),
        &KeySet::from_seed(seed),
        &ProtocolParameters::default(),
    )
    .unwrap();
    match parse(request) {
        Operation::Deactivate(op) => op,
        other => panic!("expected deactivate, got {:?}", other.operation_type()),
    }
}

pub fn transaction(number: u64, time: u64) -> Transaction {
    Transaction {
        transaction_number: number,
        transaction_time: time,
        transaction_time_hash: format!("block-{}", time),
        anchor_string: String::new(),
        transaction_fee_paid: 1_000,
        normalized_transaction_fee: Some(1_000),
        writer: "writer".into(),
    }
}

/// Compressed anchor files of one batch.
pub struct EncodedBatch {
    pub core_index: Vec<u8>,
    pub core_proof: Option<Vec<u8>>,
    pub provisional_index: Option<Vec<u8>>,
    pub provisional_proof: Option<Vec<u8>>,
    pub chunk: Option<Vec<u8>>,
    pub operation_count: usize,
}

pub fn encode(
    creates: &[CreateOperation],
    recovers: &[RecoverOperation],
    deactivates: &[DeactivateOperation],
    updates: &[UpdateOperation],
    writer_lock_id: Option<&str>,
) -> EncodedBatch {
    let uri = |file: &Option<Vec<u8>>| file.as_deref().map(MemoryCas::uri_for);

    let core_proof = CoreProofFile::create_buffer(recovers, deactivates).unwrap();
    let provisional_proof = ProvisionalProofFile::create_buffer(updates).unwrap();
    let chunk = ChunkFile::create_buffer(creates, recovers, updates).unwrap();
    let provisional_index = ProvisionalIndexFile::create_buffer(
        uri(&chunk).as_deref(),
        uri(&provisional_proof).as_deref(),
        updates,
    )
    .unwrap();
    let core_index = CoreIndexFile::create_buffer(
        writer_lock_id,
        uri(&provisional_index).as_deref(),
        uri(&core_proof).as_deref(),
        creates,
        recovers,
        deactivates,
    )
    .unwrap();

    EncodedBatch {
        core_index,
        core_proof,
        provisional_index,
        provisional_proof,
        chunk,
        operation_count: creates.len() + recovers.len() + deactivates.len() + updates.len(),
    }
}

impl EncodedBatch {
    pub fn parse(&self, params: &ProtocolParameters) -> Result<AnchorFileSet, ProtocolError> {
        let core_index = CoreIndexFile::parse(&self.core_index, params)?;
        let deactivated: Vec<&str> = core_index.deactivate_did_suffixes().collect();
        let core_proof = self
            .core_proof
            .as_deref()
            .map(|bytes| CoreProofFile::parse(bytes, params, &deactivated))
            .transpose()?;
        let provisional_index = self
            .provisional_index
            .as_deref()
            .map(|bytes| ProvisionalIndexFile::parse(bytes, params))
            .transpose()?;
        let provisional_proof = self
            .provisional_proof
            .as_deref()
            .map(|bytes| ProvisionalProofFile::parse(bytes, params))
            .transpose()?;
        let chunk = self
            .chunk
            .as_deref()
            .map(|bytes| ChunkFile::parse(bytes, params))
            .transpose()?;
        Ok(AnchorFileSet {
            core_index,
            core_proof,
            provisional_index,
            provisional_proof,
            chunk,
        })
    }

    pub fn core_index_file_uri(&self) -> String {
        MemoryCas::uri_for(&self.core_index)
    }

    /// Anchor string claiming the batch's own operation count.
    pub fn anchor_string(&self) -> String {
        self.anchor_string_claiming(self.operation_count)
    }

    pub fn anchor_string_claiming(&self, number_of_operations: usize) -> String {
        AnchoredDataSerializer::serialize(&AnchoredData {
            core_index_file_uri: self.core_index_file_uri(),
            number_of_operations,
        })
    }

    /// Write every file into `cas`.
    pub async fn publish(&self, cas: &MemoryCas) {
        let files = [
            Some(&self.core_index),
            self.core_proof.as_ref(),
            self.provisional_index.as_ref(),
            self.provisional_proof.as_ref(),
            self.chunk.as_ref(),
        ];
        for file in files.into_iter().flatten() {
            cas.write(file.clone()).await.unwrap();
        }
    }
}
