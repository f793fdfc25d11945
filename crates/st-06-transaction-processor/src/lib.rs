//! # Transaction Processor
//!
//! Read path ingestion: turns anchoring transactions observed on the
//! blockchain into stored operations, and keeps the bookkeeping stores in
//! step with the chain.
//!
//! ## Outcomes
//!
//! | Situation | [`ProcessOutcome`] | Unresolvable store |
//! |-----------|--------------------|--------------------|
//! | All files valid | `Processed` | record removed |
//! | Any rule broken | `Invalid` | record removed |
//! | Files not fetchable yet | `RetryLater` | attempt recorded, backoff doubles |
//!
//! ## Module Structure
//!
//! ```text
//! st-06-transaction-processor/
//! ├── domain/
//! │   ├── composer.rs           # Cross-file rules, operation composition
//! │   ├── outcome.rs            # ProcessOutcome, ObservationSummary
//! │   └── errors.rs
//! ├── ports/
//! │   └── inbound.rs            # TransactionProcessorApi, ObserverApi
//! ├── application/
//! │   ├── transaction_processor.rs # Download, verify, store
//! │   └── observer.rs           # Confirmations, retries, reverts
//! └── config.rs
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod test_utils;

pub use application::{Observer, TransactionProcessor};
pub use config::TransactionProcessorConfig;
pub use domain::{AnchorFileSet, ObservationSummary, ProcessOutcome, TransactionProcessorError};
pub use ports::{ObserverApi, TransactionProcessorApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
