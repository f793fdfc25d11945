//! # Batch Writer
//!
//! Write path of the node. Clients hand operation requests to the
//! [`OperationPool`]; a scheduler periodically calls [`BatchWriter::write`],
//! which turns queued operations into anchor files and one anchoring
//! transaction.
//!
//! ## Files written per batch
//!
//! | File | Written when the batch holds |
//! |------|------------------------------|
//! | core proof | recovers or deactivates |
//! | provisional proof | updates |
//! | chunk | creates, recovers or updates |
//! | provisional index | a chunk |
//! | core index | always |
//!
//! ## Module Structure
//!
//! ```text
//! st-04-batch-writer/
//! ├── domain/
//! │   ├── batch.rs        # Queue entries split by kind
//! │   └── errors.rs       # BatchWriterError
//! ├── ports/
//! │   └── inbound.rs      # BatchWriterApi, OperationPoolApi
//! ├── application/
//! │   ├── batch_writer.rs # One anchoring cycle
//! │   └── operation_pool.rs
//! └── config.rs
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{BatchWriter, OperationPool};
pub use config::BatchWriterConfig;
pub use domain::{BatchWriterError, OperationBatch};
pub use ports::{BatchWriterApi, OperationPoolApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
