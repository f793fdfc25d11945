//! # Sidetree-Anchor Test Suite
//!
//! Cross-crate tests over a fully wired in-memory node.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── node.rs            # TestNode: every service over shared-stores
//! │   └── integration/
//! │       ├── flows.rs       # Write path to read path, end to end
//! │       ├── scenarios.rs   # Reference resolution scenarios
//! │       └── determinism.rs # Order independence over anchored history
//! └── benches/
//!     └── anchor_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p st-tests
//!
//! # By category
//! cargo test -p st-tests integration::flows
//! cargo test -p st-tests integration::scenarios
//!
//! # Benchmarks
//! cargo bench -p st-tests
//! ```

pub mod integration;
pub mod node;

pub use node::TestNode;
