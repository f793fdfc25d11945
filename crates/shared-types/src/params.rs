//! # Protocol Parameters
//!
//! Every numeric limit and multiplier of the protocol version in force.
//! Parameters are immutable once built and passed by reference into the
//! codecs, the batch writer, the processor, and the resolver.

use serde::{Deserialize, Serialize};
use std::env;

/// Multihash code for SHA2-256.
pub const SHA2_256_MULTIHASH_CODE: u64 = 0x12;

/// Multihash code for SHA3-256.
pub const SHA3_256_MULTIHASH_CODE: u64 = 0x16;

/// Protocol parameters of one protocol version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolParameters {
    /// Maximum compressed size of a core index file.
    pub max_core_index_file_size_in_bytes: usize,

    /// Maximum compressed size of a provisional index file.
    pub max_provisional_index_file_size_in_bytes: usize,

    /// Maximum compressed size of either proof file.
    pub max_proof_file_size_in_bytes: usize,

    /// Maximum compressed size of a chunk file.
    pub max_chunk_file_size_in_bytes: usize,

    /// Maximum canonicalized size of a single delta.
    pub max_delta_size_in_bytes: usize,

    /// Maximum length of the writer lock identifier in a core index file.
    pub max_writer_lock_id_in_bytes: usize,

    /// Maximum length of a CAS URI referenced from an anchor file.
    pub max_cas_uri_length: usize,

    /// Maximum number of operations a single batch may anchor.
    pub max_operations_per_batch: usize,

    /// Operations a writer may anchor per transaction without a value time lock.
    pub max_number_of_operations_for_no_value_time_lock: usize,

    /// Per-operation fee as a fraction of the normalized fee.
    pub normalized_fee_to_per_operation_fee_multiplier: f64,

    /// Lock amount multiplier applied on top of the per-operation fee.
    pub value_time_lock_amount_multiplier: u64,

    /// Multihash code used for every hash produced by this node.
    pub hash_algorithm_in_multihash_code: u64,

    /// Ratio of decompressed to compressed size tolerated before aborting.
    pub estimated_decompression_multiplier: usize,

    /// Blocks a submission must be buried under before the next batch.
    pub min_confirmations_before_next_write: u64,

    /// DID method name, e.g. `sidetree` or `ion:test`.
    pub did_method_name: String,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        Self {
            max_core_index_file_size_in_bytes: 1_000_000,
            max_provisional_index_file_size_in_bytes: 1_000_000,
            max_proof_file_size_in_bytes: 2_500_000,
            max_chunk_file_size_in_bytes: 10_000_000,
            max_delta_size_in_bytes: 1_000,
            max_writer_lock_id_in_bytes: 200,
            max_cas_uri_length: 100,
            max_operations_per_batch: 10_000,
            max_number_of_operations_for_no_value_time_lock: 100,
            normalized_fee_to_per_operation_fee_multiplier: 0.01,
            value_time_lock_amount_multiplier: 600,
            hash_algorithm_in_multihash_code: SHA2_256_MULTIHASH_CODE,
            estimated_decompression_multiplier: 3,
            min_confirmations_before_next_write: 6,
            did_method_name: "sidetree".to_string(),
        }
    }
}

impl ProtocolParameters {
    /// Create parameters for testing (small batches, small no-lock allowance).
    pub fn for_testing() -> Self {
        Self {
            max_operations_per_batch: 50,
            max_number_of_operations_for_no_value_time_lock: 10,
            ..Self::default()
        }
    }

    /// Overlay environment variables on top of the defaults.
    ///
    /// Unset or unparsable variables keep their default value.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_operations_per_batch: env_or(
                "SIDETREE_MAX_OPERATIONS_PER_BATCH",
                defaults.max_operations_per_batch,
            ),
            max_number_of_operations_for_no_value_time_lock: env_or(
                "SIDETREE_MAX_OPERATIONS_WITHOUT_LOCK",
                defaults.max_number_of_operations_for_no_value_time_lock,
            ),
            max_delta_size_in_bytes: env_or(
                "SIDETREE_MAX_DELTA_SIZE",
                defaults.max_delta_size_in_bytes,
            ),
            min_confirmations_before_next_write: env_or(
                "SIDETREE_MIN_CONFIRMATIONS",
                defaults.min_confirmations_before_next_write,
            ),
            did_method_name: env::var("SIDETREE_DID_METHOD")
                .unwrap_or_else(|_| defaults.did_method_name.clone()),
            ..defaults
        }
    }

    /// Maximum bytes a decompressed file of `max_file_size` may expand to.
    pub fn max_decompressed_size(&self, max_file_size: usize) -> usize {
        max_file_size.saturating_mul(self.estimated_decompression_multiplier)
    }

    /// `did:<method>:` prefix of every identifier of this method.
    pub fn did_prefix(&self) -> String {
        format!("did:{}:", self.did_method_name)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
