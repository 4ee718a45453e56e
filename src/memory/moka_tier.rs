//! In-process memory tier on [`moka::sync::Cache`].
//!
//! Each entry carries its absolute expiry so remaining TTL can be reported and expiry is
//! checked against the injected [`Clock`] on every read. Moka's per-entry expiration is
//! the eviction backstop for entries nobody reads again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry as EntryExpiryPolicy;
use moka::sync::Cache;
use serde_json::Value;

use super::MemoryTier;
use super::error::MemoryTierResult;
use crate::clock::Clock;
use crate::constants::DEFAULT_MEMORY_CAPACITY;
use crate::storage::{Expiry, Ttl};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: Value,
    expiry: Expiry,
    ttl: Option<Duration>,
}

struct PerEntryTtl;

impl EntryExpiryPolicy<String, MemoryEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &MemoryEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// Thread-safe in-process memory tier with per-entry TTL.
pub struct MokaMemoryTier {
    entries: Cache<String, MemoryEntry>,
    clock: Arc<dyn Clock>,
}

impl MokaMemoryTier {
    /// Creates a tier with the default capacity.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY, clock)
    }

    /// Creates a tier with a max entry capacity (LRU eviction beyond it).
    pub fn with_capacity(capacity: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
            clock,
        }
    }

    /// Returns the number of cached entries (approximate until pending tasks run).
    #[inline]
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Returns `true` if the tier is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.entry_count() == 0
    }

    /// Runs any pending maintenance tasks in the underlying cache.
    #[inline]
    pub fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks();
    }

    fn live(&self, key: &str) -> Option<MemoryEntry> {
        let entry = self.entries.get(key)?;
        if entry.expiry.is_expired(self.clock.now()) {
            self.entries.invalidate(key);
            return None;
        }
        Some(entry)
    }
}

impl MemoryTier for MokaMemoryTier {
    fn put(&self, key: &str, value: Value, ttl: Ttl) -> MemoryTierResult<()> {
        let entry = MemoryEntry {
            value,
            expiry: Expiry::from_ttl(ttl, self.clock.now()),
            ttl: ttl.as_secs().map(Duration::from_secs),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    fn get(&self, key: &str) -> MemoryTierResult<Option<Value>> {
        Ok(self.live(key).map(|entry| entry.value))
    }

    fn delete(&self, key: &str) -> MemoryTierResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn enumerate(&self) -> MemoryTierResult<Vec<(String, Value)>> {
        let now = self.clock.now();
        Ok(self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.expiry.is_expired(now))
            .map(|(key, entry)| (key.to_string(), entry.value))
            .collect())
    }

    fn enumerate_with_ttl(&self) -> MemoryTierResult<Vec<(String, Option<u64>)>> {
        let now = self.clock.now();
        Ok(self
            .entries
            .iter()
            .map(|(key, entry)| (key.to_string(), entry.expiry.remaining(now)))
            .collect())
    }

    fn remaining_ttl(&self, key: &str) -> MemoryTierResult<Option<Ttl>> {
        let now = self.clock.now();
        Ok(self
            .live(key)
            .and_then(|entry| entry.expiry.remaining_ttl(now)))
    }
}

impl std::fmt::Debug for MokaMemoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaMemoryTier")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}
