//! Tiered cache facade: memory + filesystem, with optional usage statistics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::error::{CacheError, CacheResult};
use super::migration::MigrationEngine;
use super::store::TierStore;
use super::types::{MigrationReport, Tier};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::constants::is_reserved_key;
use crate::memory::MemoryTier;
#[cfg(any(test, feature = "mock"))]
use crate::memory::MockMemoryTier;
use crate::stats::{CacheStats, LedgerResult, StatsLedger};
use crate::storage::{FilesystemTier, Ttl};

/// Two-tier key/value cache.
///
/// Every operation takes an explicit [`Tier`]. When monitoring is on, stores, hits and
/// misses are counted in the [`StatsLedger`]; a ledger failure is logged and never fails
/// the cache operation itself.
pub struct TieredCache<M: MemoryTier> {
    engine: MigrationEngine<M>,
    ledger: StatsLedger<M>,
    monitoring: AtomicBool,
}

impl<M: MemoryTier> std::fmt::Debug for TieredCache<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("engine", &self.engine)
            .field("monitoring", &self.is_monitoring())
            .finish()
    }
}

impl<M: MemoryTier> TieredCache<M> {
    /// Builds a cache from `config` on the system clock.
    pub fn new(config: &Config, memory: Arc<M>) -> CacheResult<Self> {
        Self::with_clock(config, memory, Arc::new(SystemClock))
    }

    /// Builds a cache from `config` with an explicit clock.
    pub fn with_clock(config: &Config, memory: Arc<M>, clock: Arc<dyn Clock>) -> CacheResult<Self> {
        let fs = FilesystemTier::new(config.root_dir.clone(), clock.clone());
        let ledger = StatsLedger::new(memory.clone(), clock);
        Self::from_parts(memory, fs, ledger, config.monitoring)
    }

    /// Assembles a cache from already-built parts.
    ///
    /// Creates the filesystem root and, if `monitoring` is set, starts a ledger session.
    pub fn from_parts(
        memory: Arc<M>,
        fs: FilesystemTier,
        ledger: StatsLedger<M>,
        monitoring: bool,
    ) -> CacheResult<Self> {
        fs.ensure_root()?;
        if monitoring {
            ledger.begin_session()?;
        }

        info!(root = %fs.root().display(), monitoring, "Tiered cache ready");

        Ok(Self {
            engine: MigrationEngine::new(memory, fs),
            ledger,
            monitoring: AtomicBool::new(monitoring),
        })
    }

    /// Returns the filesystem tier.
    pub fn filesystem(&self) -> &FilesystemTier {
        self.engine.filesystem()
    }

    /// Returns the memory tier adapter.
    pub fn memory(&self) -> &Arc<M> {
        self.engine.memory()
    }

    #[inline]
    fn backend(&self, tier: Tier) -> &dyn TierStore {
        self.engine.tier_store(tier)
    }

    /// Stores `value` under `key` on `tier`.
    #[instrument(skip(self, value), fields(tier = %tier))]
    pub fn store(&self, key: &str, value: Value, ttl: Ttl, tier: Tier) -> CacheResult<()> {
        validate_key(key)?;
        validate_ttl(ttl)?;

        self.backend(tier).put(key, value, ttl)?;
        debug!(%ttl, "Stored");

        self.track(key, |ledger, key| ledger.record_store(key));
        Ok(())
    }

    /// Fetches the live value for `key` from `tier`.
    #[instrument(skip(self), fields(tier = %tier))]
    pub fn fetch(&self, key: &str, tier: Tier) -> CacheResult<Option<Value>> {
        validate_key(key)?;

        let value = self.backend(tier).get(key)?;
        match value {
            Some(_) => {
                debug!("Cache hit");
                self.track(key, |ledger, key| ledger.record_fetch(key));
            }
            None => {
                debug!("Cache miss");
                self.track(key, |ledger, key| ledger.record_miss(key));
            }
        }
        Ok(value)
    }

    /// Deletes `key` from `tier`. Returns `false` if there was nothing to delete.
    #[instrument(skip(self), fields(tier = %tier))]
    pub fn delete(&self, key: &str, tier: Tier) -> CacheResult<bool> {
        validate_key(key)?;
        self.backend(tier).delete(key)
    }

    /// Re-stores the current value of `key` on `tier` with a fresh `ttl_secs`.
    pub fn refresh_ttl(&self, key: &str, ttl_secs: u64, tier: Tier) -> CacheResult<()> {
        validate_key(key)?;
        if ttl_secs == 0 {
            return Err(CacheError::invalid("refresh TTL must be positive"));
        }
        self.engine.refresh_ttl(key, Ttl::Secs(ttl_secs), tier)
    }

    /// Copies `key` from memory to the filesystem, keeping its absolute expiry.
    pub fn copy_entry_to_filesystem(&self, key: &str, delete_from_memory: bool) -> CacheResult<()> {
        validate_key(key)?;
        self.engine.copy_to_filesystem(key, delete_from_memory)
    }

    /// Copies `key` from the filesystem to memory, keeping its absolute expiry.
    pub fn copy_entry_to_memory(&self, key: &str, delete_from_filesystem: bool) -> CacheResult<()> {
        validate_key(key)?;
        self.engine.copy_to_memory(key, delete_from_filesystem)
    }

    /// Copies every live memory entry to the filesystem (best-effort, per key).
    pub fn copy_all_to_filesystem(&self, delete_after: bool) -> CacheResult<MigrationReport> {
        self.engine.copy_all_to_filesystem(delete_after)
    }

    /// Copies every live filesystem record to memory (best-effort, per key).
    ///
    /// Use [`MigrationReport::succeeded_at_least_one`] to tell whether anything moved.
    pub fn copy_all_to_memory(&self, delete_after: bool) -> CacheResult<MigrationReport> {
        self.engine.copy_all_to_memory(delete_after)
    }

    /// Evicts expired entries from `tier` and returns the number evicted.
    pub fn purge_expired(&self, tier: Tier) -> CacheResult<usize> {
        self.engine.purge_expired(tier)
    }

    /// Deletes every user entry on `tier` and returns the number deleted.
    #[instrument(skip(self), fields(tier = %tier))]
    pub fn clear(&self, tier: Tier) -> CacheResult<usize> {
        let removed = match tier {
            Tier::Filesystem => self.filesystem().clear()?,
            Tier::Memory => {
                let backend = self.backend(tier);
                let mut removed = 0;
                for key in backend.keys()? {
                    if backend.delete(&key)? {
                        removed += 1;
                    }
                }
                removed
            }
        };
        info!(removed, "Tier cleared");
        Ok(removed)
    }

    /// Returns `true` if stores and fetches are being counted.
    pub fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::Acquire)
    }

    /// Turns counting on and begins (or re-stamps) a ledger session.
    pub fn enable_monitoring(&self) -> CacheResult<()> {
        self.ledger.begin_session()?;
        self.monitoring.store(true, Ordering::Release);
        Ok(())
    }

    /// Turns counting off. Recorded statistics are kept.
    pub fn disable_monitoring(&self) {
        self.monitoring.store(false, Ordering::Release);
    }

    /// Aggregated statistics for the current session.
    pub fn stats(&self) -> CacheResult<CacheStats> {
        Ok(self.ledger.snapshot()?)
    }

    /// Clears all statistics. If monitoring is on, a new session starts immediately.
    pub fn reset_stats(&self) -> CacheResult<()> {
        self.ledger.reset()?;
        if self.is_monitoring() {
            self.ledger.begin_session()?;
        }
        Ok(())
    }

    /// Key stored most often this session.
    pub fn most_stored_key(&self) -> CacheResult<Option<String>> {
        Ok(self.stats()?.most_stored_key)
    }

    /// Key fetched most often this session.
    pub fn most_fetched_key(&self) -> CacheResult<Option<String>> {
        Ok(self.stats()?.most_fetched_key)
    }

    fn track(&self, key: &str, record: impl FnOnce(&StatsLedger<M>, &str) -> LedgerResult<()>) {
        if !self.is_monitoring() {
            return;
        }
        if let Err(e) = record(&self.ledger, key) {
            warn!(key, error = %e, "Failed to update statistics");
        }
    }
}

fn validate_key(key: &str) -> CacheResult<()> {
    if key.is_empty() {
        return Err(CacheError::invalid("key must not be empty"));
    }
    if is_reserved_key(key) {
        return Err(CacheError::invalid(format!("key '{}' is reserved", key)));
    }
    Ok(())
}

fn validate_ttl(ttl: Ttl) -> CacheResult<()> {
    if ttl == Ttl::Secs(0) {
        return Err(CacheError::invalid("TTL must be positive"));
    }
    Ok(())
}

#[cfg(any(test, feature = "mock"))]
pub type MockTieredCache = TieredCache<MockMemoryTier>;

#[cfg(any(test, feature = "mock"))]
impl TieredCache<MockMemoryTier> {
    /// Builds a cache on a [`MockMemoryTier`] sharing `clock`.
    pub fn new_mock(config: &Config, clock: Arc<dyn Clock>) -> CacheResult<Self> {
        let memory = Arc::new(MockMemoryTier::new(clock.clone()));
        Self::with_clock(config, memory, clock)
    }

    /// Returns the mock memory tier.
    pub fn mock_memory(&self) -> &MockMemoryTier {
        self.memory()
    }
}
