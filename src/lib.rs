//! Tiercache library crate (used by the binary and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`TieredCache`], [`Tier`] - The two-tier facade and its tier selector
//! - [`Config`], [`ConfigError`] - Environment-driven configuration
//! - [`CacheError`], [`CacheResult`] - Errors surfaced by cache operations
//! - [`MigrationReport`] - Per-key outcome of bulk migrations
//!
//! ## Tiers
//! - [`MemoryTier`], [`MokaMemoryTier`] - Memory tier contract and in-process implementation
//! - [`FilesystemTier`] - One JSON record file per key under a root directory
//! - [`Ttl`], [`Expiry`] - Relative lifetimes and absolute expiry instants
//!
//! ## Statistics
//! - [`StatsLedger`], [`CacheStats`], [`KeyStats`] - Per-key store/fetch/miss counters
//!
//! ## Maintenance
//! - [`ExpirySweeper`] - Background purge of expired filesystem records
//!
//! ## Test/Mock Support
//! Mock implementations and a manual clock are available behind
//! `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod memory;
pub mod stats;
pub mod storage;
pub mod sweeper;

#[cfg(any(test, feature = "mock"))]
pub use cache::MockTieredCache;
pub use cache::{
    CacheError, CacheResult, MemoryStore, MigrationEngine, MigrationReport, Tier, TierStore,
    TieredCache,
};

#[cfg(any(test, feature = "mock"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};

pub use config::{Config, ConfigError};
pub use constants::{STAGING_DIR_NAME, STATS_LEDGER_KEY, is_reserved_key};

#[cfg(any(test, feature = "mock"))]
pub use memory::MockMemoryTier;
pub use memory::{MemoryTier, MemoryTierError, MemoryTierResult, MokaMemoryTier};

pub use stats::{CacheStats, KeyStats, LedgerError, LedgerResult, StatsLedger};
pub use storage::{Expiry, FilesystemRecord, FilesystemTier, FsError, FsResult, Ttl};
pub use sweeper::ExpirySweeper;
