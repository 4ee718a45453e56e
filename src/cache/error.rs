use thiserror::Error;

use crate::memory::MemoryTierError;
use crate::stats::LedgerError;
use crate::storage::FsError;

#[derive(Debug, Error)]
/// Errors returned by the tiered cache.
///
/// Corrupt and expired filesystem records never surface here: both are recovered into
/// absence by the filesystem tier.
pub enum CacheError {
    /// Empty or reserved key, or a zero TTL.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Error message.
        reason: String,
    },

    /// Key not found, or found but expired.
    #[error("no live entry for key '{key}'")]
    Absent {
        /// Key that was looked up.
        key: String,
    },

    /// Filesystem read/write/delete failure.
    #[error("filesystem tier error: {0}")]
    Storage(#[from] FsError),

    /// Memory tier could not be reached.
    #[error("memory tier unavailable: {0}")]
    DependencyUnavailable(#[from] MemoryTierError),

    /// Statistics ledger failure.
    #[error("statistics error: {0}")]
    Ledger(#[from] LedgerError),

    /// A maintenance task panicked or was cancelled before it finished.
    #[error("background task failed: {reason}")]
    TaskFailed {
        /// Error message.
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn absent(key: &str) -> Self {
        CacheError::Absent {
            key: key.to_string(),
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CacheError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Convenience result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
