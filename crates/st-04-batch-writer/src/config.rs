//! # Batch Writer Configuration

use serde::{Deserialize, Serialize};

/// Batch writer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchWriterConfig {
    /// Time limit for each queue and confirmation store query.
    pub query_timeout_ms: u64,
}

impl Default for BatchWriterConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 10_000,
        }
    }
}

impl BatchWriterConfig {
    /// Create a config for testing (short timeouts).
    pub fn for_testing() -> Self {
        Self {
            query_timeout_ms: 1_000,
        }
    }
}
