//! Queued operations partitioned by kind.

use shared_types::{ProtocolError, ProtocolParameters, QueuedOperation};
use st_01_operations::{
    CreateOperation, DeactivateOperation, Operation, RecoverOperation, UpdateOperation,
};

/// One batch, split by operation kind in queue order.
#[derive(Debug, Default)]
pub struct OperationBatch {
    /// Create operations.
    pub creates: Vec<CreateOperation>,
    /// Recover operations.
    pub recovers: Vec<RecoverOperation>,
    /// Deactivate operations.
    pub deactivates: Vec<DeactivateOperation>,
    /// Update operations.
    pub updates: Vec<UpdateOperation>,
}

impl OperationBatch {
    /// Parse and partition queued operations.
    pub fn from_queued(
        queued: &[QueuedOperation],
        params: &ProtocolParameters,
    ) -> Result<Self, ProtocolError> {
        let mut batch = Self::default();
        for entry in queued {
            match Operation::parse(&entry.operation_buffer, params)? {
                Operation::Create(op) => batch.creates.push(op),
                Operation::Recover(op) => batch.recovers.push(op),
                Operation::Deactivate(op) => batch.deactivates.push(op),
                Operation::Update(op) => batch.updates.push(op),
            }
        }
        Ok(batch)
    }

    /// Operations in the batch.
    pub fn len(&self) -> usize {
        self.creates.len() + self.recovers.len() + self.deactivates.len() + self.updates.len()
    }

    /// Whether the batch holds no operations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
