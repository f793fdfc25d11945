//! Domain layer: batch partitioning and errors.

pub mod batch;
pub mod errors;

pub use batch::OperationBatch;
pub use errors::BatchWriterError;
