//! Minimum transaction fee.
//!
//! ```text
//! minimum = max(normalized_fee, ceil(normalized_fee × multiplier × count))
//! ```

use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use tracing::debug;

/// Computes and verifies transaction fees.
#[derive(Debug, Clone)]
pub struct FeeManager {
    per_operation_fee_multiplier: f64,
}

impl FeeManager {
    /// Create a fee manager for the given protocol parameters.
    pub fn new(params: &ProtocolParameters) -> Self {
        Self {
            per_operation_fee_multiplier: params.normalized_fee_to_per_operation_fee_multiplier,
        }
    }

    /// Minimum fee for anchoring `operation_count` operations.
    pub fn compute_minimum_transaction_fee(
        &self,
        normalized_fee: u64,
        operation_count: usize,
    ) -> Result<u64, ProtocolError> {
        if operation_count == 0 {
            return Err(ProtocolError::new(
                ErrorCode::OperationCountLessThanOrEqualToZero,
                "a transaction must anchor at least one operation",
            ));
        }
        let per_operation = normalized_fee as f64 * self.per_operation_fee_multiplier;
        let batch_fee = (per_operation * operation_count as f64).ceil() as u64;
        Ok(batch_fee.max(normalized_fee))
    }

    /// Reject a transaction that paid less than the minimum fee.
    pub fn verify_transaction_fee_and_throw_on_error(
        &self,
        transaction_fee_paid: u64,
        operation_count: usize,
        normalized_fee: u64,
    ) -> Result<(), ProtocolError> {
        let minimum = self.compute_minimum_transaction_fee(normalized_fee, operation_count)?;
        if transaction_fee_paid < minimum {
            debug!(
                paid = transaction_fee_paid,
                minimum,
                operation_count,
                "Transaction fee below minimum"
            );
            return Err(ProtocolError::new(
                ErrorCode::TransactionFeePaidInvalid,
                format!(
                    "fee {} is below the minimum {} for {} operations",
                    transaction_fee_paid, minimum, operation_count
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manager() -> FeeManager {
        FeeManager::new(&ProtocolParameters::default())
    }

    #[test]
    fn test_small_batch_pays_normalized_fee() {
        assert_eq!(manager().compute_minimum_transaction_fee(1_000, 1).unwrap(), 1_000);
        assert_eq!(manager().compute_minimum_transaction_fee(1_000, 100).unwrap(), 1_000);
    }

    #[test]
    fn test_large_batch_scales_with_count() {
        assert_eq!(manager().compute_minimum_transaction_fee(1_000, 250).unwrap(), 2_500);
        // 3 × 0.01 × 101 = 3.03, rounded up
        assert_eq!(manager().compute_minimum_transaction_fee(3, 101).unwrap(), 4);
    }

    #[test]
    fn test_zero_operations_rejected() {
        assert_eq!(
            manager().compute_minimum_transaction_fee(1_000, 0).unwrap_err().code,
            ErrorCode::OperationCountLessThanOrEqualToZero
        );
    }

    #[test]
    fn test_verify_fee() {
        let manager = manager();
        assert!(manager
            .verify_transaction_fee_and_throw_on_error(2_500, 250, 1_000)
            .is_ok());
        assert_eq!(
            manager
                .verify_transaction_fee_and_throw_on_error(2_499, 250, 1_000)
                .unwrap_err()
                .code,
            ErrorCode::TransactionFeePaidInvalid
        );
    }

    proptest! {
        #[test]
        fn prop_fee_never_below_normalized_fee(fee in 1u64..10_000_000, count in 1usize..20_000) {
            let minimum = manager().compute_minimum_transaction_fee(fee, count).unwrap();
            prop_assert!(minimum >= fee);
        }

        #[test]
        fn prop_fee_is_monotonic_in_count(fee in 1u64..1_000_000, count in 1usize..10_000) {
            let manager = manager();
            let smaller = manager.compute_minimum_transaction_fee(fee, count).unwrap();
            let larger = manager.compute_minimum_transaction_fee(fee, count + 1).unwrap();
            prop_assert!(larger >= smaller);
        }
    }
}
