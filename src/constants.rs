//! Cross-cutting, shared constants.
//!
//! # Reserved Names
//!
//! Two names are carved out of the user key space and rejected by the facade:
//!
//! 1. [`STATS_LEDGER_KEY`] lives in the memory tier and holds the statistics ledger
//! 2. [`STAGING_DIR_NAME`] lives under the filesystem root and holds in-flight writes

/// Memory-tier key under which the statistics ledger persists its state.
pub const STATS_LEDGER_KEY: &str = "__tiercache_stats__";

/// Subdirectory of the cache root used for temp-write-then-rename.
pub const STAGING_DIR_NAME: &str = ".staging";

/// On-disk `expiry` value meaning "never expires". Any value `<= 0` decodes as never.
pub const NEVER_EXPIRES_SENTINEL: i64 = 0;

/// Default filesystem root used when `TIERCACHE_ROOT_DIR` is not set.
pub const DEFAULT_ROOT_DIR: &str = "./.cache";

/// Default max entries in the in-process memory tier.
pub const DEFAULT_MEMORY_CAPACITY: u64 = 10_000;

/// Default interval between background filesystem purges.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

/// Returns `true` if `key` collides with a name reserved by the cache itself.
#[inline]
pub fn is_reserved_key(key: &str) -> bool {
    key == STATS_LEDGER_KEY || key == STAGING_DIR_NAME
}
