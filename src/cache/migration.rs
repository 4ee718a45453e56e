//! Cross-tier migration and TTL refresh.
//!
//! Single-key copies carry the source's *remaining* lifetime across, so the copy expires
//! at the same instant as the original. The source is only deleted after the target write
//! succeeded; a failure in between leaves the entry in both tiers, never in neither.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::error::{CacheError, CacheResult};
use super::store::{MemoryStore, TierStore};
use super::types::{MigrationReport, Tier};
use crate::constants::is_reserved_key;
use crate::memory::MemoryTier;
use crate::storage::{FilesystemTier, Ttl};

/// Moves entries between tiers and re-stores entries under new TTLs.
pub struct MigrationEngine<M: MemoryTier> {
    memory: MemoryStore<M>,
    fs: FilesystemTier,
}

impl<M: MemoryTier> MigrationEngine<M> {
    pub fn new(memory: Arc<M>, fs: FilesystemTier) -> Self {
        Self {
            memory: MemoryStore::new(memory),
            fs,
        }
    }

    /// Returns the store for `tier`.
    #[inline]
    pub fn tier_store(&self, tier: Tier) -> &dyn TierStore {
        match tier {
            Tier::Memory => &self.memory,
            Tier::Filesystem => &self.fs,
        }
    }

    pub fn filesystem(&self) -> &FilesystemTier {
        &self.fs
    }

    pub fn memory(&self) -> &Arc<M> {
        self.memory.adapter()
    }

    /// Copies `key` from memory to the filesystem with its remaining TTL.
    pub fn copy_to_filesystem(&self, key: &str, delete_after: bool) -> CacheResult<()> {
        self.transplant(key, Tier::Memory, Tier::Filesystem, delete_after)
    }

    /// Copies `key` from the filesystem to memory with its remaining TTL.
    pub fn copy_to_memory(&self, key: &str, delete_after: bool) -> CacheResult<()> {
        self.transplant(key, Tier::Filesystem, Tier::Memory, delete_after)
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn transplant(&self, key: &str, from: Tier, to: Tier, delete_after: bool) -> CacheResult<()> {
        let source = self.tier_store(from);
        let target = self.tier_store(to);

        let Some((value, ttl)) = source.get_with_ttl(key)? else {
            debug!("Source entry absent or lapsed");
            return Err(CacheError::absent(key));
        };

        target.put(key, value, ttl)?;

        if delete_after {
            source.delete(key)?;
        }

        info!(%ttl, delete_after, "Entry migrated");
        Ok(())
    }

    /// Copies every live memory entry to the filesystem.
    ///
    /// Values and TTLs are enumerated separately and joined by key; entries that lapse in
    /// between are skipped. A failure on one key does not stop the others.
    #[instrument(skip(self))]
    pub fn copy_all_to_filesystem(&self, delete_after: bool) -> CacheResult<MigrationReport> {
        let adapter = self.memory.adapter();
        let mut values: HashMap<String, _> = adapter
            .enumerate()?
            .into_iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .collect();
        let ttls = adapter.enumerate_with_ttl()?;

        let mut report = MigrationReport::default();
        for (key, remaining) in ttls {
            if is_reserved_key(&key) {
                continue;
            }
            let (Some(value), Some(ttl)) = (values.remove(&key), Ttl::from_remaining(remaining))
            else {
                report.skipped.push(key);
                continue;
            };

            match self.fs.put(&key, &value, ttl) {
                Ok(_) => {
                    if delete_after && let Err(e) = adapter.delete(&key) {
                        warn!(key, error = %e, "Copied to filesystem but memory entry was kept");
                    }
                    report.migrated.push(key);
                }
                Err(e) => {
                    warn!(key, error = %e, "Failed to copy entry to filesystem");
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        info!(
            migrated = report.migrated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Bulk copy to filesystem finished"
        );
        Ok(report)
    }

    /// Copies every live filesystem record to memory.
    ///
    /// The enumeration evicts expired records as a side effect.
    #[instrument(skip(self))]
    pub fn copy_all_to_memory(&self, delete_after: bool) -> CacheResult<MigrationReport> {
        let adapter = self.memory.adapter();
        let now = self.fs.now();

        let mut report = MigrationReport::default();
        for (key, record) in self.fs.list_records()? {
            if is_reserved_key(&key) {
                continue;
            }
            let Some(ttl) = record.expiry().remaining_ttl(now) else {
                report.skipped.push(key);
                continue;
            };

            match adapter.put(&key, record.data, ttl) {
                Ok(()) => {
                    if delete_after && let Err(e) = self.fs.delete(&key) {
                        warn!(key, error = %e, "Copied to memory but filesystem record was kept");
                    }
                    report.migrated.push(key);
                }
                Err(e) => {
                    warn!(key, error = %e, "Failed to copy entry to memory");
                    report.failed.push((key, e.to_string()));
                }
            }
        }

        info!(
            migrated = report.migrated.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Bulk copy to memory finished"
        );
        Ok(report)
    }

    /// Re-stores the current value of `key` on `tier` under `ttl`.
    ///
    /// This is a read followed by a write: a delete that lands in between is undone.
    #[instrument(skip(self), fields(tier = %tier))]
    pub fn refresh_ttl(&self, key: &str, ttl: Ttl, tier: Tier) -> CacheResult<()> {
        let store = self.tier_store(tier);
        let Some(value) = store.get(key)? else {
            return Err(CacheError::absent(key));
        };
        store.put(key, value, ttl)?;
        debug!(%ttl, "TTL refreshed");
        Ok(())
    }

    /// Evicts expired entries on `tier`.
    ///
    /// Filesystem: one self-evicting scan. Memory: the adapter owns eviction, so this only
    /// enumerates and always reports zero.
    #[instrument(skip(self), fields(tier = %tier))]
    pub fn purge_expired(&self, tier: Tier) -> CacheResult<usize> {
        let evicted = self.tier_store(tier).purge_expired()?;
        if evicted > 0 {
            info!(evicted, "Purged expired entries");
        }
        Ok(evicted)
    }
}

impl<M: MemoryTier> std::fmt::Debug for MigrationEngine<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEngine")
            .field("fs", &self.fs)
            .finish()
    }
}
