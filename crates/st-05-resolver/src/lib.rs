//! # Resolver
//!
//! Read path of the node: turns the anchored operations of an identifier
//! into its current [`DidState`].
//!
//! ## Outcomes
//!
//! | Input | Result |
//! |-------|--------|
//! | No create applies | `Ok(None)` |
//! | Operation with wrong key or signature | skipped |
//! | Malformed stored operation | skipped, logged at `debug` |
//! | Operation store failure | `Err(ResolverError::Store)` |
//!
//! ## Module Structure
//!
//! ```text
//! st-05-resolver/
//! ├── domain/
//! │   ├── did_state.rs          # DidState
//! │   ├── operation_processor.rs # One operation, one transition
//! │   └── errors.rs
//! ├── ports/
//! │   └── inbound.rs            # ResolverApi
//! ├── application/
//! │   └── resolver.rs           # Commitment chains over all operations
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

pub use application::Resolver;
pub use config::ResolverConfig;
pub use domain::{DidState, OperationProcessor, ResolverError};
pub use ports::ResolverApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
