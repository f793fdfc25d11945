//! Hash-addressed in-memory CAS.

use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use shared_types::ports::ContentAddressableStore;
use shared_types::CasError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory content-addressable store keyed by hex SHA-256.
#[derive(Debug, Default)]
pub struct MemoryCas {
    files: RwLock<HashMap<String, Vec<u8>>>,
    unreachable: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryCas {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// URI the store assigns to `content`.
    pub fn uri_for(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    /// Simulate a network outage.
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Drop content, simulating pruning.
    pub fn remove(&self, uri: &str) -> Option<Vec<u8>> {
        self.files.write().remove(uri)
    }

    /// Stored content, bypassing size limits.
    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.files.read().get(uri).cloned()
    }

    /// Snapshot of every stored file.
    pub fn files(&self) -> Vec<Vec<u8>> {
        self.files.read().values().cloned().collect()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), CasError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CasError::NotReachable("memory CAS offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentAddressableStore for MemoryCas {
    async fn write(&self, content: Vec<u8>) -> Result<String, CasError> {
        self.check_reachable()?;
        let uri = Self::uri_for(&content);
        self.files.write().insert(uri.clone(), content);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(uri)
    }

    async fn read(&self, uri: &str, max_size_in_bytes: usize) -> Result<Vec<u8>, CasError> {
        self.check_reachable()?;
        if uri.len() != 64 || !uri.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CasError::InvalidHash {
                uri: uri.to_string(),
            });
        }
        let files = self.files.read();
        let content = files.get(uri).ok_or_else(|| CasError::NotFound {
            uri: uri.to_string(),
        })?;
        if content.len() > max_size_in_bytes {
            return Err(CasError::MaxSizeExceeded {
                uri: uri.to_string(),
                max_size: max_size_in_bytes,
            });
        }
        Ok(content.clone())
    }
}
