use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by a memory tier adapter.
pub enum MemoryTierError {
    /// The backing cache service could not be reached.
    #[error("memory tier unavailable: {reason}")]
    Unavailable {
        /// Error message.
        reason: String,
    },
}

/// Convenience result type for memory tier operations.
pub type MemoryTierResult<T> = Result<T, MemoryTierError>;
