//! # Shared Types Crate
//!
//! Domain entities, protocol parameters, error codes, and outbound ports used
//! by every subsystem of the anchoring node.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Parameters**: [`ProtocolParameters`] is built once and threaded
//!   through constructors; no subsystem reads global state.
//! - **Typed Rule Violations**: Every protocol rule has its own [`ErrorCode`]
//!   so callers can match the exact rule that failed.
//!
//! ## Module Structure
//!
//! ```text
//! shared-types/
//! ├── entities.rs  - Transaction, AnchoredOperation, ValueTimeLock, ...
//! ├── errors.rs    - ErrorCode, ProtocolError, CasError, StoreError
//! ├── params.rs    - ProtocolParameters
//! └── ports.rs     - CAS, blockchain, queue, and store traits
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entities;
pub mod errors;
pub mod params;
pub mod ports;

pub use entities::*;
pub use errors::*;
pub use params::ProtocolParameters;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
