//! # Integration Tests
//!
//! Write path and read path exercised together.

pub mod determinism;
pub mod flows;
pub mod scenarios;
