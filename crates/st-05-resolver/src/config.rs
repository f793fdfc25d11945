//! # Resolver Configuration

use serde::{Deserialize, Serialize};

/// Resolver configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Time limit for operation store queries.
    pub query_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: 10_000,
        }
    }
}

impl ResolverConfig {
    /// Create a config for testing (short timeouts).
    pub fn for_testing() -> Self {
        Self {
            query_timeout_ms: 1_000,
        }
    }
}
