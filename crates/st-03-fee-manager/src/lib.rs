//! # Fee Manager
//!
//! Pure fee arithmetic shared by the batch writer (what to pay) and the
//! transaction processor (whether enough was paid).
//!
//! | Component | Question answered |
//! |-----------|-------------------|
//! | [`FeeManager`] | Minimum fee for `n` operations at a normalized fee |
//! | [`ValueTimeLockVerifier`] | How many operations a writer's lock allows |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;

pub use domain::fee_calculator::FeeManager;
pub use domain::value_time_lock::ValueTimeLockVerifier;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
