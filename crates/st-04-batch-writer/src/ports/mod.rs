//! Ports layer: API traits offered by this crate.

pub mod inbound;

pub use inbound::{BatchWriterApi, OperationPoolApi};
