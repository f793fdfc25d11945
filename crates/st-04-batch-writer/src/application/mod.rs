//! Application layer: the batch writer and the operation pool.

pub mod batch_writer;
pub mod operation_pool;

pub use batch_writer::BatchWriter;
pub use operation_pool::OperationPool;
