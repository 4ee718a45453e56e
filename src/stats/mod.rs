//! Usage statistics (per-key store/fetch/miss counters and the monitoring window).

pub mod error;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{LedgerError, LedgerResult};
pub use ledger::StatsLedger;
pub use types::{CacheStats, KeyStats};
