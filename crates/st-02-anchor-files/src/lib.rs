//! # Anchor Files
//!
//! Wire formats of the files a batch writes to content-addressable storage,
//! and of the anchor string written on chain. Every file is gzip-compressed
//! JSON with an allow-listed schema.
//!
//! ## File Graph
//!
//! ```text
//! anchor string "<n>.<uri>"
//!        │
//!        ▼
//! Core Index File ──► Core Proof File         (recover, deactivate)
//!        │
//!        ▼
//! Provisional Index File ──► Provisional Proof File   (update)
//!        │
//!        ▼
//! Chunk File                                  (deltas)
//! ```
//!
//! ## Size Limits
//!
//! | File | Limit (compressed) |
//! |------|--------------------|
//! | core index | `max_core_index_file_size_in_bytes` |
//! | provisional index | `max_provisional_index_file_size_in_bytes` |
//! | core and provisional proof | `max_proof_file_size_in_bytes` |
//! | chunk | `max_chunk_file_size_in_bytes` |
//!
//! Decompression stops once the output passes the file limit times
//! `estimated_decompression_multiplier`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;

#[cfg(test)]
pub(crate) mod test_utils;

pub use domain::anchored_data::{AnchoredData, AnchoredDataSerializer};
pub use domain::chunk::{ChunkFile, ChunkFileModel};
pub use domain::compressor::{compress, decompress};
pub use domain::core_index::{CoreIndexFile, CoreIndexFileModel, CoreOperations};
pub use domain::core_proof::CoreProofFile;
pub use domain::provisional_index::{ProvisionalIndexFile, ProvisionalIndexFileModel};
pub use domain::provisional_proof::ProvisionalProofFile;
pub use domain::references::{CreateReference, OperationReference, SignedDataReference};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
