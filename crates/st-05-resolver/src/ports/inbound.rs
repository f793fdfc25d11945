//! # Inbound Ports

use crate::domain::{DidState, ResolverError};
use async_trait::async_trait;

/// Identifier resolution.
#[async_trait]
pub trait ResolverApi: Send + Sync {
    /// Resolve a unique suffix; `None` when the identifier does not exist.
    async fn resolve(&self, did_unique_suffix: &str) -> Result<Option<DidState>, ResolverError>;

    /// Resolve a short- or long-form identifier string.
    async fn resolve_did(&self, did: &str) -> Result<Option<DidState>, ResolverError>;
}
