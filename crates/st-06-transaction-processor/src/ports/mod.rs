//! # Ports Layer
//!
//! Outbound ports are shared and live in `shared_types::ports`.

pub mod inbound;

pub use inbound::{ObserverApi, TransactionProcessorApi};
