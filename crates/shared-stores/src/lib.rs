//! # Shared Stores
//!
//! In-memory implementations of the ports in `shared_types::ports`.
//!
//! | Adapter | Port |
//! |---------|------|
//! | [`MemoryCas`] | `ContentAddressableStore` |
//! | [`MockBlockchain`] | `BlockchainClient` |
//! | [`MemoryOperationQueue`] | `OperationQueue` |
//! | [`MemoryOperationStore`] | `OperationStore` |
//! | [`MemoryConfirmationStore`] | `ConfirmationStore` |
//! | [`MemoryUnresolvableTransactionStore`] | `UnresolvableTransactionStore` |
//! | [`ManualTimeSource`] | `TimeSource` |
//!
//! All adapters are `Send + Sync` and guard their state with `parking_lot`
//! locks; no lock is held across an await point.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blockchain;
pub mod cas;
pub mod confirmation_store;
pub mod operation_store;
pub mod queue;
pub mod time;
pub mod unresolvable_store;

pub use blockchain::MockBlockchain;
pub use cas::MemoryCas;
pub use confirmation_store::MemoryConfirmationStore;
pub use operation_store::MemoryOperationStore;
pub use queue::MemoryOperationQueue;
pub use time::ManualTimeSource;
pub use unresolvable_store::MemoryUnresolvableTransactionStore;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
