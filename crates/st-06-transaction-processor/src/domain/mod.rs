//! # Domain Layer
//!
//! Pure validation and composition of anchored operations.

pub mod composer;
pub mod errors;
pub mod outcome;

pub use composer::{check_core_index_within_paid_limit, AnchorFileSet};
pub use errors::TransactionProcessorError;
pub use outcome::{ObservationSummary, ProcessOutcome};
