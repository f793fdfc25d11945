//! # Test Node
//!
//! Every service of the node wired over the in-memory adapters, plus a
//! scripted blockchain that turns batch writer submissions into observed
//! transactions.
//!
//! A full publication cycle is submit, anchor, mine, then bury the block
//! deep enough for the next batch.

use shared_stores::{
    ManualTimeSource, MemoryCas, MemoryConfirmationStore, MemoryOperationQueue,
    MemoryOperationStore, MemoryUnresolvableTransactionStore, MockBlockchain,
};
use shared_types::{ProtocolParameters, Transaction};
use st_01_operations::{DocumentPatch, OperationRequest};
use st_04_batch_writer::{BatchWriter, BatchWriterConfig, BatchWriterError, OperationPool};
use st_05_resolver::{DidState, Resolver, ResolverConfig};
use st_06_transaction_processor::{
    ObservationSummary, Observer, TransactionProcessor, TransactionProcessorConfig,
};
use serde_json::json;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use tracing::debug;

/// Owner of every transaction the test node anchors.
pub const WRITER: &str = "anchor-writer";

/// Normalized fee the scripted blockchain reports.
pub const NORMALIZED_FEE: u64 = 1_000;

/// Blockchain time the node starts at.
pub const GENESIS_TIME: u64 = 100;

/// Install a `tracing` subscriber once, filtered by `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// `add-services` patch with one service.
pub fn add_service(id: &str) -> DocumentPatch {
    DocumentPatch::parse(&json!({
        "action": "add-services",
        "services": [{
            "id": id,
            "type": "LinkedDomains",
            "serviceEndpoint": format!("https://{}.example.com", id)
        }]
    }))
    .expect("valid patch")
}

/// The node under test.
pub struct TestNode {
    pub params: ProtocolParameters,
    pub cas: Arc<MemoryCas>,
    pub blockchain: Arc<MockBlockchain>,
    pub queue: Arc<MemoryOperationQueue>,
    pub operation_store: Arc<MemoryOperationStore>,
    pub confirmations: Arc<MemoryConfirmationStore>,
    pub unresolvable: Arc<MemoryUnresolvableTransactionStore>,
    pub clock: Arc<ManualTimeSource>,
    pub pool: OperationPool,
    pub batch_writer: BatchWriter,
    pub observer: Observer,
    pub resolver: Resolver,
    chain_time: AtomicU64,
    mined_writes: AtomicUsize,
    next_transaction_number: AtomicU64,
    history: Mutex<Vec<Transaction>>,
}

impl TestNode {
    pub fn new(params: ProtocolParameters) -> Self {
        init_tracing();
        let processor_config = TransactionProcessorConfig::for_testing();

        let cas = Arc::new(MemoryCas::new());
        let blockchain = Arc::new(MockBlockchain::new(GENESIS_TIME, NORMALIZED_FEE));
        let queue = Arc::new(MemoryOperationQueue::new());
        let operation_store = Arc::new(MemoryOperationStore::new());
        let confirmations = Arc::new(MemoryConfirmationStore::new());
        let unresolvable = Arc::new(MemoryUnresolvableTransactionStore::new(
            processor_config.unresolvable_retry_delay_factor_ms,
        ));
        let clock = Arc::new(ManualTimeSource::new(1_000_000));

        let pool = OperationPool::new(
            BatchWriterConfig::for_testing(),
            params.clone(),
            queue.clone(),
        );
        let batch_writer = BatchWriter::new(
            BatchWriterConfig::for_testing(),
            params.clone(),
            queue.clone(),
            blockchain.clone(),
            cas.clone(),
            confirmations.clone(),
        );
        let processor = Arc::new(TransactionProcessor::new(
            processor_config.clone(),
            params.clone(),
            cas.clone(),
            blockchain.clone(),
            operation_store.clone(),
        ));
        let observer = Observer::new(
            processor_config,
            processor,
            operation_store.clone(),
            confirmations.clone(),
            unresolvable.clone(),
            clock.clone(),
        );
        let resolver = Resolver::new(
            ResolverConfig::for_testing(),
            params.clone(),
            operation_store.clone(),
        );

        Self {
            params,
            cas,
            blockchain,
            queue,
            operation_store,
            confirmations,
            unresolvable,
            clock,
            pool,
            batch_writer,
            observer,
            resolver,
            chain_time: AtomicU64::new(GENESIS_TIME),
            mined_writes: AtomicUsize::new(0),
            next_transaction_number: AtomicU64::new(1),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Validate and queue a request.
    pub async fn submit(&self, request: &OperationRequest) -> Result<String, BatchWriterError> {
        self.pool
            .submit_operation(request.operation_buffer.clone())
            .await
    }

    /// Run one batch writer cycle.
    pub async fn anchor(&self) -> Result<usize, BatchWriterError> {
        self.batch_writer.write().await
    }

    /// Current blockchain time.
    pub fn chain_time(&self) -> u64 {
        self.chain_time.load(Ordering::SeqCst)
    }

    /// Add `blocks` blocks to the chain.
    pub fn advance_blocks(&self, blocks: u64) {
        let time = self.chain_time.fetch_add(blocks, Ordering::SeqCst) + blocks;
        self.blockchain.set_time(time);
    }

    /// Include every pending submission in a block at the current time.
    pub fn mine(&self) -> Vec<Transaction> {
        let writes = self.blockchain.writes();
        let already_mined = self.mined_writes.swap(writes.len(), Ordering::SeqCst);
        let time = self.chain_time();
        let mined: Vec<Transaction> = writes
            .into_iter()
            .skip(already_mined)
            .map(|write| Transaction {
                transaction_number: self.next_transaction_number.fetch_add(1, Ordering::SeqCst),
                transaction_time: time,
                transaction_time_hash: format!("block-{}", time),
                anchor_string: write.anchor_string,
                transaction_fee_paid: write.fee,
                normalized_transaction_fee: Some(NORMALIZED_FEE),
                writer: WRITER.to_string(),
            })
            .collect();
        debug!(transactions = mined.len(), time, "Mined pending anchors");
        self.history
            .lock()
            .expect("history lock")
            .extend(mined.iter().cloned());
        mined
    }

    /// Every transaction mined so far, oldest first.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.history.lock().expect("history lock").clone()
    }

    /// Mine pending submissions and feed them to the observer.
    pub async fn observe(&self) -> ObservationSummary {
        let transactions = self.mine();
        self.observer
            .process_transactions(&transactions)
            .await
            .expect("observer stores available")
    }

    /// Submit `requests`, anchor them as one batch, and observe the
    /// transaction buried under enough blocks for the next batch.
    pub async fn publish(&self, requests: &[&OperationRequest]) -> ObservationSummary {
        for request in requests {
            self.submit(request).await.expect("request accepted");
        }
        let anchored = self.anchor().await.expect("batch anchored");
        assert_eq!(anchored, requests.len(), "whole queue anchored");
        let summary = self.observe().await;
        self.advance_blocks(self.params.min_confirmations_before_next_write);
        summary
    }

    /// Resolve a unique suffix.
    pub async fn resolve(&self, did_unique_suffix: &str) -> Option<DidState> {
        self.resolver
            .resolve(did_unique_suffix)
            .await
            .expect("operation store available")
    }
}
