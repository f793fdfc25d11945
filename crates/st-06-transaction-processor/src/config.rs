//! # Transaction Processor Configuration

use serde::{Deserialize, Serialize};

/// Transaction processor and observer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionProcessorConfig {
    /// Time limit for each store query.
    pub query_timeout_ms: u64,
    /// Upper bound on unresolvable transactions retried per poll.
    pub max_unresolvable_retries_per_poll: usize,
    /// Base delay of the unresolvable retry schedule, handed to the
    /// unresolvable transaction store.
    pub unresolvable_retry_delay_factor_ms: u64,
}

impl Default for TransactionProcessorConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 10_000,
            max_unresolvable_retries_per_poll: 100,
            unresolvable_retry_delay_factor_ms: 60_000,
        }
    }
}

impl TransactionProcessorConfig {
    /// Create a config for testing (short timeouts, fast retries).
    pub fn for_testing() -> Self {
        Self {
            query_timeout_ms: 1_000,
            max_unresolvable_retries_per_poll: 10,
            unresolvable_retry_delay_factor_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransactionProcessorConfig::default();
        assert_eq!(config.max_unresolvable_retries_per_poll, 100);
        assert_eq!(config.unresolvable_retry_delay_factor_ms, 60_000);
    }
}
