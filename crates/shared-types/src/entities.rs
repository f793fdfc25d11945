//! # Core Domain Entities
//!
//! Entities shared by the write path and the read path.
//!
//! ## Clusters
//!
//! - **Blockchain**: `Transaction`, `BlockchainTime`, `ValueTimeLock`
//! - **Operations**: `OperationType`, `QueuedOperation`, `AnchoredOperation`
//! - **Bookkeeping**: `ConfirmationRecord`, `UnresolvableTransaction`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

// =============================================================================
// CLUSTER A: BLOCKCHAIN
// =============================================================================

/// A point in blockchain time (block height plus block hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockchainTime {
    /// Monotonic blockchain time, usually a block height.
    pub time: u64,
    /// Hash of the block at `time`.
    pub hash: String,
}

/// An anchoring transaction observed on the blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Globally ordered transaction number.
    pub transaction_number: u64,
    /// Blockchain time the transaction was included at.
    pub transaction_time: u64,
    /// Hash of the block at `transaction_time`.
    pub transaction_time_hash: String,
    /// The anchor string written by the batch writer.
    pub anchor_string: String,
    /// Fee paid by the writer.
    pub transaction_fee_paid: u64,
    /// Normalized fee at `transaction_time`, when known.
    pub normalized_transaction_fee: Option<u64>,
    /// Writer (owner) of the transaction.
    pub writer: String,
}

/// Funds locked by a writer to earn a larger per-transaction allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueTimeLock {
    /// Lock identifier, referenced as `writerLockId` in core index files.
    pub identifier: String,
    /// Amount locked.
    pub amount_locked: u64,
    /// Blockchain time the lock became active.
    pub lock_transaction_time: u64,
    /// Blockchain time the lock expires (exclusive).
    pub unlock_transaction_time: u64,
    /// Normalized fee at the time of locking.
    pub normalized_fee: u64,
    /// Owner of the lock.
    pub owner: String,
}

// =============================================================================
// CLUSTER B: OPERATIONS
// =============================================================================

/// The four operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Creates an identifier.
    Create,
    /// Changes the document using the update key.
    Update,
    /// Replaces document and keys using the recovery key.
    Recover,
    /// Permanently disables the identifier.
    Deactivate,
}

impl OperationType {
    /// Wire name of the operation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Create => "create",
            OperationType::Update => "update",
            OperationType::Recover => "recover",
            OperationType::Deactivate => "deactivate",
        }
    }

    /// Parse a wire name.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "create" => Some(OperationType::Create),
            "update" => Some(OperationType::Update),
            "recover" => Some(OperationType::Recover),
            "deactivate" => Some(OperationType::Deactivate),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation waiting in the batch queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedOperation {
    /// Suffix of the identifier the operation targets.
    pub did_unique_suffix: String,
    /// Raw operation request bytes.
    pub operation_buffer: Vec<u8>,
}

/// An operation extracted from an anchored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchoredOperation {
    /// Kind of the operation.
    #[serde(rename = "type")]
    pub operation_type: OperationType,
    /// Suffix of the identifier the operation targets.
    pub did_unique_suffix: String,
    /// Operation bytes as composed from the anchor files.
    pub operation_buffer: Vec<u8>,
    /// Number of the transaction that anchored the operation.
    pub transaction_number: u64,
    /// Blockchain time of that transaction.
    pub transaction_time: u64,
    /// Position of the operation inside the transaction.
    pub operation_index: u32,
}

impl AnchoredOperation {
    /// Total ordering key among operations of one identifier.
    pub fn order_key(&self) -> (u64, u32) {
        (self.transaction_number, self.operation_index)
    }
}

// =============================================================================
// CLUSTER C: BOOKKEEPING
// =============================================================================

/// A batch writer submission and its confirmation, if observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationRecord {
    /// Anchor string that was written.
    pub anchor_string: String,
    /// Blockchain time at submission.
    pub submitted_at: u64,
    /// Blockchain time the transaction was observed at.
    pub confirmed_at: Option<u64>,
}

/// A transaction whose files could not (yet) be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvableTransaction {
    /// The transaction to retry.
    pub transaction: Transaction,
    /// Wall time of the first failed fetch.
    pub first_fetch_time: Timestamp,
    /// Failed attempts after the first one.
    pub retry_attempts: u32,
    /// Earliest wall time the next attempt may run.
    pub next_retry_time: Timestamp,
}

impl UnresolvableTransaction {
    /// Record of a first failed fetch; due immediately.
    pub fn first_attempt(transaction: Transaction, now: Timestamp) -> Self {
        Self {
            transaction,
            first_fetch_time: now,
            retry_attempts: 0,
            next_retry_time: now,
        }
    }

    /// Register one more failed attempt with exponential backoff.
    ///
    /// The delay doubles per attempt and is anchored at `first_fetch_time`.
    pub fn record_failed_attempt(&mut self, retry_delay_factor_ms: u64) {
        let exponent = self.retry_attempts.min(63);
        let delay = retry_delay_factor_ms.saturating_mul(1u64 << exponent);
        self.next_retry_time = self.first_fetch_time.saturating_add(delay);
        self.retry_attempts = self.retry_attempts.saturating_add(1);
    }
}
