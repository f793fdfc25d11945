//! Scriptable blockchain client.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ports::BlockchainClient;
use shared_types::{BlockchainError, BlockchainTime, ValueTimeLock};
use std::collections::HashMap;

/// A write recorded by [`MockBlockchain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    /// Anchor string written.
    pub anchor_string: String,
    /// Fee paid.
    pub fee: u64,
}

#[derive(Debug, Default)]
struct ChainState {
    time: u64,
    normalized_fee: u64,
    writer_lock: Option<ValueTimeLock>,
    locks: HashMap<String, ValueTimeLock>,
    writes: Vec<RecordedWrite>,
    reachable: bool,
}

/// In-memory blockchain client with a settable clock and fee.
#[derive(Debug)]
pub struct MockBlockchain {
    state: RwLock<ChainState>,
}

impl Default for MockBlockchain {
    fn default() -> Self {
        Self::new(1, 100)
    }
}

impl MockBlockchain {
    /// Create a chain at `time` charging `normalized_fee`.
    pub fn new(time: u64, normalized_fee: u64) -> Self {
        Self {
            state: RwLock::new(ChainState {
                time,
                normalized_fee,
                reachable: true,
                ..ChainState::default()
            }),
        }
    }

    /// Set the latest blockchain time.
    pub fn set_time(&self, time: u64) {
        self.state.write().time = time;
    }

    /// Set the normalized fee.
    pub fn set_fee(&self, normalized_fee: u64) {
        self.state.write().normalized_fee = normalized_fee;
    }

    /// Give this node's writer a lock; it is also registered for lookup.
    pub fn set_writer_lock(&self, lock: Option<ValueTimeLock>) {
        let mut state = self.state.write();
        if let Some(lock) = &lock {
            state.locks.insert(lock.identifier.clone(), lock.clone());
        }
        state.writer_lock = lock;
    }

    /// Register a lock held by any writer.
    pub fn add_lock(&self, lock: ValueTimeLock) {
        self.state.write().locks.insert(lock.identifier.clone(), lock);
    }

    /// Simulate a node outage.
    pub fn set_reachable(&self, reachable: bool) {
        self.state.write().reachable = reachable;
    }

    /// All writes so far.
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state.read().writes.clone()
    }

    fn check_reachable(&self) -> Result<(), BlockchainError> {
        if self.state.read().reachable {
            Ok(())
        } else {
            Err(BlockchainError::NotReachable("mock blockchain offline".into()))
        }
    }
}

#[async_trait]
impl BlockchainClient for MockBlockchain {
    async fn get_latest_time(&self) -> Result<BlockchainTime, BlockchainError> {
        self.check_reachable()?;
        let time = self.state.read().time;
        Ok(BlockchainTime {
            time,
            hash: format!("block-{}", time),
        })
    }

    async fn get_fee(&self, _time: u64) -> Result<u64, BlockchainError> {
        self.check_reachable()?;
        Ok(self.state.read().normalized_fee)
    }

    async fn get_writer_value_time_lock(&self) -> Result<Option<ValueTimeLock>, BlockchainError> {
        self.check_reachable()?;
        Ok(self.state.read().writer_lock.clone())
    }

    async fn get_value_time_lock(
        &self,
        identifier: &str,
    ) -> Result<Option<ValueTimeLock>, BlockchainError> {
        self.check_reachable()?;
        Ok(self.state.read().locks.get(identifier).cloned())
    }

    async fn write(&self, anchor_string: &str, fee: u64) -> Result<(), BlockchainError> {
        self.check_reachable()?;
        tracing::debug!(anchor_string, fee, "Mock blockchain write");
        self.state.write().writes.push(RecordedWrite {
            anchor_string: anchor_string.to_string(),
            fee,
        });
        Ok(())
    }
}
