//! Domain layer: anchor file models and their codecs.

pub mod anchored_data;
pub(crate) mod codec;
pub mod chunk;
pub mod compressor;
pub mod core_index;
pub mod core_proof;
pub mod provisional_index;
pub mod provisional_proof;
pub mod references;
