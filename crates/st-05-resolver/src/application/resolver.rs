//! # Resolver Service
//!
//! Folds every anchored operation of one identifier into its current state:
//!
//! 1. The earliest create that applies starts the state.
//! 2. Recover and deactivate operations are chained by the recovery
//!    commitment they open, earliest first among equal candidates.
//! 3. Update operations are chained the same way on the update commitment,
//!    starting from the state the recovery chain converged to.
//!
//! Within a chain a commitment is consumed at most once, which also ends
//! chains that commit to a key they just revealed. Each chain tracks its own
//! consumed commitments, so a key serving both roles can still be used by
//! both chains.

use crate::config::ResolverConfig;
use crate::domain::{DidState, OperationProcessor, ResolverError};
use crate::ports::ResolverApi;
use async_trait::async_trait;
use shared_types::ports::{with_timeout, OperationStore};
use shared_types::{AnchoredOperation, OperationType, ProtocolParameters};
use st_01_operations::{commitment_from_reveal_value, Did, Operation};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

type CommitmentLookup = HashMap<String, Vec<(u64, Operation)>>;

#[derive(Debug, Clone, Copy)]
enum Chain {
    Recovery,
    Update,
}

impl Chain {
    fn commitment(self, state: &DidState) -> Option<&str> {
        match self {
            Chain::Recovery => state.next_recovery_commitment_hash.as_deref(),
            Chain::Update => state.next_update_commitment_hash.as_deref(),
        }
    }
}

/// Resolver - computes identifier state from the operation store.
pub struct Resolver {
    config: ResolverConfig,
    params: ProtocolParameters,
    processor: OperationProcessor,
    operation_store: Arc<dyn OperationStore>,
}

impl Resolver {
    /// Create a new resolver.
    pub fn new(
        config: ResolverConfig,
        params: ProtocolParameters,
        operation_store: Arc<dyn OperationStore>,
    ) -> Self {
        Self {
            processor: OperationProcessor::new(&params),
            config,
            params,
            operation_store,
        }
    }

    /// Resolve a unique suffix from the operation store.
    pub async fn resolve(
        &self,
        did_unique_suffix: &str,
    ) -> Result<Option<DidState>, ResolverError> {
        let operations = with_timeout(
            self.config.query_timeout_ms,
            self.operation_store.get(did_unique_suffix),
        )
        .await?;
        let state = self.resolve_operations(&operations);
        debug!(
            %did_unique_suffix,
            operations = operations.len(),
            found = state.is_some(),
            "Resolved identifier"
        );
        Ok(state)
    }

    /// Resolve a short- or long-form identifier.
    ///
    /// A long-form identifier that has not been published resolves to the
    /// state of its embedded create operation.
    pub async fn resolve_long_form(&self, did: &str) -> Result<Option<DidState>, ResolverError> {
        let did = Did::parse(did, &self.params)?;
        if let Some(state) = self.resolve(&did.did_unique_suffix).await? {
            return Ok(Some(state));
        }
        let Some(create) = did.create_operation else {
            return Ok(None);
        };
        debug!(did = %did.short_form, "Resolving unpublished long-form identifier");
        Ok(self
            .processor
            .apply_operation(&Operation::Create(create), 0, None))
    }

    /// Fold `operations` of one identifier, in any order, into its state.
    pub fn resolve_operations(&self, operations: &[AnchoredOperation]) -> Option<DidState> {
        let mut sorted: Vec<&AnchoredOperation> = operations.iter().collect();
        sorted.sort_by(|a, b| {
            a.order_key()
                .cmp(&b.order_key())
                .then_with(|| a.operation_buffer.cmp(&b.operation_buffer))
        });

        let mut creates = Vec::new();
        let mut recoveries = CommitmentLookup::new();
        let mut updates = CommitmentLookup::new();
        for anchored in sorted {
            let operation = match self.processor.parse(anchored) {
                Ok(operation) => operation,
                Err(err) => {
                    debug!(
                        did_unique_suffix = %anchored.did_unique_suffix,
                        transaction_number = anchored.transaction_number,
                        error = %err,
                        "Skipping malformed stored operation"
                    );
                    continue;
                }
            };
            let lookup = match operation.operation_type() {
                OperationType::Create => {
                    creates.push((anchored.transaction_number, operation));
                    continue;
                }
                OperationType::Update => &mut updates,
                OperationType::Recover | OperationType::Deactivate => &mut recoveries,
            };
            let reveal_value = operation.reveal_value().unwrap_or_default();
            match commitment_from_reveal_value(reveal_value, &self.params) {
                Ok(commitment) => lookup
                    .entry(commitment)
                    .or_default()
                    .push((anchored.transaction_number, operation)),
                Err(err) => debug!(code = %err.code, "Skipping operation with bad reveal value"),
            }
        }

        let state = creates.iter().find_map(|(transaction_number, operation)| {
            self.processor
                .apply_operation(operation, *transaction_number, None)
        })?;

        let state = self.apply_chain(state, &recoveries, Chain::Recovery);
        if state.is_deactivated() {
            return Some(state);
        }
        Some(self.apply_chain(state, &updates, Chain::Update))
    }

    fn apply_chain(
        &self,
        mut state: DidState,
        lookup: &CommitmentLookup,
        chain: Chain,
    ) -> DidState {
        let mut consumed = HashSet::new();
        loop {
            if state.is_deactivated() {
                return state;
            }
            let Some(commitment) = chain.commitment(&state).map(str::to_string) else {
                return state;
            };
            let Some(candidates) = lookup.get(&commitment) else {
                return state;
            };
            if consumed.contains(&commitment) {
                debug!(?chain, "Commitment already consumed, ending chain");
                return state;
            }

            let next = candidates.iter().find_map(|(transaction_number, operation)| {
                self.processor
                    .apply_operation(operation, *transaction_number, Some(&state))
            });
            let Some(next) = next else {
                return state;
            };
            consumed.insert(commitment);
            state = next;
        }
    }
}

#[async_trait]
impl ResolverApi for Resolver {
    async fn resolve(&self, did_unique_suffix: &str) -> Result<Option<DidState>, ResolverError> {
        Resolver::resolve(self, did_unique_suffix).await
    }

    async fn resolve_did(&self, did: &str) -> Result<Option<DidState>, ResolverError> {
        self.resolve_long_form(did).await
    }
}
