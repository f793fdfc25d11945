//! # Anchor String
//!
//! The string written to the blockchain: `<numberOfOperations>.<coreIndexFileUri>`.

use shared_types::{ErrorCode, ProtocolError, ProtocolParameters};

const DELIMITER: char = '.';

/// Data anchored on chain for one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchoredData {
    /// URI of the core index file.
    pub core_index_file_uri: String,
    /// Operations in the batch; the fee is paid for this many.
    pub number_of_operations: usize,
}

/// Serializer between [`AnchoredData`] and anchor strings.
pub struct AnchoredDataSerializer;

impl AnchoredDataSerializer {
    /// Serialize into an anchor string.
    pub fn serialize(data: &AnchoredData) -> String {
        format!(
            "{}{}{}",
            data.number_of_operations, DELIMITER, data.core_index_file_uri
        )
    }

    /// Parse an anchor string.
    pub fn deserialize(
        anchor_string: &str,
        params: &ProtocolParameters,
    ) -> Result<AnchoredData, ProtocolError> {
        let parts: Vec<&str> = anchor_string.split(DELIMITER).collect();
        let [count, uri] = parts.as_slice() else {
            return Err(ProtocolError::new(
                ErrorCode::AnchoredDataIncorrectFormat,
                format!("anchor string '{}' must have exactly two parts", anchor_string),
            ));
        };
        if uri.is_empty() {
            return Err(ProtocolError::new(
                ErrorCode::AnchoredDataIncorrectFormat,
                "anchor string carries no core index file URI",
            ));
        }

        let number_of_operations = count
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| count.parse::<usize>().ok())
            .flatten()
            .filter(|n| *n > 0 && !count.starts_with('0'))
            .ok_or_else(|| {
                ProtocolError::new(
                    ErrorCode::AnchoredDataNumberOfOperationsNotPositiveInteger,
                    format!("'{}' is not a positive integer", count),
                )
            })?;

        if number_of_operations > params.max_operations_per_batch {
            return Err(ProtocolError::new(
                ErrorCode::AnchoredDataNumberOfOperationsGreaterThanMax,
                format!(
                    "{} operations exceed the batch maximum {}",
                    number_of_operations, params.max_operations_per_batch
                ),
            ));
        }

        Ok(AnchoredData {
            core_index_file_uri: uri.to_string(),
            number_of_operations,
        })
    }
}
