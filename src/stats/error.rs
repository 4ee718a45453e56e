use thiserror::Error;

use crate::memory::MemoryTierError;

#[derive(Debug, Error)]
/// Errors returned by the statistics ledger.
pub enum LedgerError {
    /// The memory tier holding the ledger failed.
    #[error("ledger storage error: {0}")]
    Memory(#[from] MemoryTierError),

    /// Ledger state could not be serialized.
    #[error("ledger serialization error: {0}")]
    Serialization(String),
}

/// Convenience result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
