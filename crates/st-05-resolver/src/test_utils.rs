//! Fixtures shared by this crate's tests.

use serde_json::json;
use shared_types::AnchoredOperation;
use st_01_operations::{DocumentPatch, OperationRequest, ServiceEntry};

pub(crate) fn anchored(
    request: &OperationRequest,
    transaction_number: u64,
    operation_index: u32,
) -> AnchoredOperation {
    AnchoredOperation {
        operation_type: request.operation_type,
        did_unique_suffix: request.did_unique_suffix.clone(),
        operation_buffer: request.operation_buffer.clone(),
        transaction_number,
        transaction_time: transaction_number,
        operation_index,
    }
}

pub(crate) fn add_service(id: &str) -> DocumentPatch {
    DocumentPatch::AddServices {
        services: vec![ServiceEntry {
            id: id.to_string(),
            service_type: "LinkedDomains".to_string(),
            service_endpoint: json!("https://example.com"),
        }],
    }
}

/// Valid to parse, fails when applied to a document with fewer than six services.
pub(crate) fn failing_patch() -> DocumentPatch {
    DocumentPatch::IetfJsonPatch {
        patches: vec![json!({ "op": "remove", "path": "/services/5" })],
    }
}
