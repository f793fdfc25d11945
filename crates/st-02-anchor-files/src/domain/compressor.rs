//! Gzip compression with a bounded decompressor.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use shared_types::{ErrorCode, ProtocolError};
use std::io::{Read, Write};

/// Gzip `data`.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, ProtocolError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| ProtocolError::new(ErrorCode::CompressorCompressionFailure, e.to_string()))
}

/// Gunzip `data`, aborting once more than `max_decompressed_size` bytes
/// have been produced.
///
/// `failure_code` is reported for corrupt streams so callers can tell which
/// file failed.
pub fn decompress(
    data: &[u8],
    max_decompressed_size: usize,
    failure_code: ErrorCode,
) -> Result<Vec<u8>, ProtocolError> {
    let limit = (max_decompressed_size as u64).saturating_add(1);
    let mut decompressed = Vec::new();
    GzDecoder::new(data)
        .take(limit)
        .read_to_end(&mut decompressed)
        .map_err(|e| ProtocolError::new(failure_code, e.to_string()))?;

    if decompressed.len() > max_decompressed_size {
        return Err(ProtocolError::new(
            ErrorCode::CompressorMaxAllowedDecompressedDataSizeExceeded,
            format!("decompressed data exceeds {} bytes", max_decompressed_size),
        ));
    }
    Ok(decompressed)
}
