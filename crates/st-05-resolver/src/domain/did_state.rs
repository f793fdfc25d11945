//! Resolved state of one identifier.

use serde::{Deserialize, Serialize};
use st_01_operations::DocumentState;

/// State of an identifier after folding its operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidState {
    /// Current document.
    pub document: DocumentState,
    /// Commitment the next recover or deactivate must open; `None` once deactivated.
    pub next_recovery_commitment_hash: Option<String>,
    /// Commitment the next update must open.
    pub next_update_commitment_hash: Option<String>,
    /// Transaction of the last applied operation.
    pub last_operation_transaction_number: u64,
}

impl DidState {
    /// Whether the identifier has been deactivated.
    pub fn is_deactivated(&self) -> bool {
        self.next_recovery_commitment_hash.is_none()
    }
}
