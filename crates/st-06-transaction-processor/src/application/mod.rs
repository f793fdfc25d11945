//! # Application Layer

pub mod observer;
pub mod transaction_processor;

pub use observer::Observer;
pub use transaction_processor::TransactionProcessor;
