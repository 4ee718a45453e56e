use std::path::PathBuf;
use thiserror::Error;

use crate::storage::codec::CodecError;

#[derive(Error, Debug)]
/// Errors returned by the filesystem tier.
pub enum FsError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Cache root is missing and could not be created, or is not a directory.
    #[error("cache root unavailable: {path}")]
    RootUnavailable {
        /// Root path.
        path: PathBuf,
    },

    /// Staged record could not be renamed into place.
    #[error("failed to persist record for '{key}': {source}")]
    PersistFailed {
        /// Key being written.
        key: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for filesystem tier operations.
pub type FsResult<T> = Result<T, FsError>;
