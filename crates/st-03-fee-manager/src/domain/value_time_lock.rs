//! Value time lock allowance.
//!
//! A writer may anchor `max_number_of_operations_for_no_value_time_lock`
//! operations per transaction for free. Larger batches need a lock whose
//! amount covers the per-operation fee times the lock amount multiplier for
//! every operation.

use shared_types::{ErrorCode, ProtocolError, ProtocolParameters, ValueTimeLock};
use tracing::debug;

/// Checks batch sizes against the writer's value time lock.
#[derive(Debug, Clone)]
pub struct ValueTimeLockVerifier {
    no_lock_allowance: usize,
    per_operation_fee_multiplier: f64,
    lock_amount_multiplier: u64,
}

impl ValueTimeLockVerifier {
    /// Create a verifier for the given protocol parameters.
    pub fn new(params: &ProtocolParameters) -> Self {
        Self {
            no_lock_allowance: params.max_number_of_operations_for_no_value_time_lock,
            per_operation_fee_multiplier: params.normalized_fee_to_per_operation_fee_multiplier,
            lock_amount_multiplier: params.value_time_lock_amount_multiplier,
        }
    }

    /// Operations a transaction may carry given the writer's lock.
    ///
    /// A lock with a zero normalized fee places no limit of its own.
    pub fn calculate_max_number_of_operations_allowed(&self, lock: Option<&ValueTimeLock>) -> usize {
        let Some(lock) = lock else {
            return self.no_lock_allowance;
        };
        let per_operation_lock = lock.normalized_fee as f64
            * self.per_operation_fee_multiplier
            * self.lock_amount_multiplier as f64;
        let allowed = if per_operation_lock > 0.0 {
            (lock.amount_locked as f64 / per_operation_lock).floor() as usize
        } else {
            usize::MAX
        };
        allowed.max(self.no_lock_allowance)
    }

    /// Reject a transaction of `paid_operation_count` operations whose lock
    /// is missing, foreign, out of range, or too small.
    pub fn verify_lock_amount_and_throw_on_error(
        &self,
        lock: Option<&ValueTimeLock>,
        paid_operation_count: usize,
        transaction_time: u64,
        transaction_writer: &str,
    ) -> Result<(), ProtocolError> {
        if paid_operation_count <= self.no_lock_allowance {
            return Ok(());
        }
        let Some(lock) = lock else {
            return Err(ProtocolError::new(
                ErrorCode::ValueTimeLockVerifierInvalidNumberOfOperations,
                format!(
                    "{} operations exceed the {} allowed without a value time lock",
                    paid_operation_count, self.no_lock_allowance
                ),
            ));
        };

        if lock.owner != transaction_writer {
            return Err(ProtocolError::new(
                ErrorCode::ValueTimeLockVerifierTransactionWriterLockOwnerMismatch,
                format!(
                    "lock '{}' belongs to '{}', not '{}'",
                    lock.identifier, lock.owner, transaction_writer
                ),
            ));
        }

        if transaction_time < lock.lock_transaction_time
            || transaction_time >= lock.unlock_transaction_time
        {
            return Err(ProtocolError::new(
                ErrorCode::ValueTimeLockVerifierTransactionTimeOutsideLockRange,
                format!(
                    "time {} is outside lock '{}' range [{}, {})",
                    transaction_time,
                    lock.identifier,
                    lock.lock_transaction_time,
                    lock.unlock_transaction_time
                ),
            ));
        }

        let allowed = self.calculate_max_number_of_operations_allowed(Some(lock));
        if paid_operation_count > allowed {
            debug!(
                lock = %lock.identifier,
                paid_operation_count,
                allowed,
                "Value time lock too small for batch"
            );
            return Err(ProtocolError::new(
                ErrorCode::ValueTimeLockVerifierInvalidNumberOfOperations,
                format!(
                    "{} operations exceed the {} allowed by lock '{}'",
                    paid_operation_count, allowed, lock.identifier
                ),
            ));
        }
        Ok(())
    }
}
