//! Operation fixtures for codec tests.

use shared_types::ProtocolParameters;
use st_01_operations::{
    create_request, deactivate_request, recover_request, update_request, CreateOperation,
    DeactivateOperation, KeySet, Operation, OperationRequest, RecoverOperation, UpdateOperation,
};

pub const URI_A: &str = "QmProvisionalIndexFileUri";
pub const URI_B: &str = "QmProofFileUri";

fn parse(request: OperationRequest) -> Operation {
    Operation::parse(&request.operation_buffer, &ProtocolParameters::default()).unwrap()
}

fn suffix(seed: u64) -> String {
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
    let params = ProtocolParameters::default();
    let request = update_request(
        &suffix(seed),
        &KeySet::from_seed(seed),
        &KeySet::from_seed(seed + 1_000),
        vec![],
        &params,
    )
    .unwrap();
    match parse(request) {
        Operation::Update(op) => op,
        other => panic!("expected update, got {:?}", other.operation_type()),
    }
}

pub fn recovered(seed: u64) -> RecoverOperation {
    let params = ProtocolParameters::default();
    let request = recover_request(
        &suffix(seed),
        &KeySet::from_seed(seed),
        &KeySet::from_seed(seed + 1_000),
        vec![],
        &params,
    )
    .unwrap();
    match parse(request) {
        Operation::Recover(op) => op,
        other => panic!("expected recover, got {:?}", other.operation_type()),
    }
}

pub fn deactivated(seed: u64) -> DeactivateOperation {
    let params = ProtocolParameters::default();
    let request = deactivate_request(&suffix(seed), &KeySet::from_seed(seed), &params).unwrap();
    match parse(request) {
        Operation::Deactivate(op) => op,
        other => panic!("expected deactivate, got {:?}", other.operation_type()),
    }
}
