//! Domain layer: state, errors, and the operation processor.

pub mod did_state;
pub mod errors;
pub mod operation_processor;

pub use did_state::DidState;
pub use errors::ResolverError;
pub use operation_processor::OperationProcessor;
