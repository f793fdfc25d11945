//! Decode and encode steps shared by every anchor file.

use super::compressor::{compress, decompress};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};
use tracing::debug;

/// Error codes and size limit of one file kind.
#[derive(Clone, Copy)]
pub(crate) struct FileKind {
    pub name: &'static str,
    pub decompression_failure: ErrorCode,
    pub not_json: ErrorCode,
    pub schema_invalid: ErrorCode,
    pub max_size: fn(&ProtocolParameters) -> usize,
}

impl FileKind {
    /// Decompress and deserialize into the allow-listed model.
    pub fn decode<T: DeserializeOwned>(
        &self,
        bytes: &[u8],
        params: &ProtocolParameters,
    ) -> Result<T, ProtocolError> {
        let max = params.max_decompressed_size((self.max_size)(params));
        let json = decompress(bytes, max, self.decompression_failure)?;
        debug!(
            file = self.name,
            compressed = bytes.len(),
            decompressed = json.len(),
            "Decompressed anchor file"
        );
        serde_json::from_slice(&json).map_err(|e| {
            let code = if e.is_data() {
                self.schema_invalid
            } else {
                self.not_json
            };
            ProtocolError::new(code, format!("{}: {}", self.name, e))
        })
    }

    /// Serialize and compress a model.
    pub fn encode<T: Serialize>(&self, model: &T) -> Result<Vec<u8>, ProtocolError> {
        let json = serde_json::to_vec(model)
            .map_err(|e| ProtocolError::new(self.schema_invalid, format!("{}: {}", self.name, e)))?;
        compress(&json)
    }
}

/// The first suffix that appears twice, if any.
pub(crate) fn first_duplicate<'a>(mut suffixes: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = std::collections::HashSet::new();
    suffixes.find(|suffix| !seen.insert(*suffix))
}
