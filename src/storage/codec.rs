//! Filesystem entry codec (JSON records).

use serde_json::Value;
use thiserror::Error;

use super::model::{Expiry, FilesystemRecord};

#[derive(Error, Debug)]
/// Errors returned when a record cannot be encoded or decoded.
pub enum CodecError {
    /// Record bytes are not a well-formed `{data, expiry}` object.
    #[error("malformed record: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Payload could not be serialized.
    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Convenience result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Encodes `value` with its absolute `expiry` into record bytes.
pub fn encode(value: &Value, expiry: Expiry) -> CodecResult<Vec<u8>> {
    let record = FilesystemRecord::new(value.clone(), expiry);
    serde_json::to_vec(&record).map_err(CodecError::Encode)
}

/// Decodes record bytes, failing on anything but a well-formed record.
pub fn decode(bytes: &[u8]) -> CodecResult<FilesystemRecord> {
    serde_json::from_slice(bytes).map_err(CodecError::Malformed)
}
