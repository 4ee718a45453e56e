//! Uniform single-key surface over both tiers.

use std::sync::Arc;

use serde_json::Value;

use super::error::CacheResult;
use crate::constants::is_reserved_key;
use crate::memory::MemoryTier;
use crate::storage::{FilesystemTier, Ttl};

/// Single-key operations shared by both tiers, used for tier-agnostic dispatch.
pub trait TierStore: Send + Sync {
    /// Stores `value` under `key` for `ttl`.
    fn put(&self, key: &str, value: Value, ttl: Ttl) -> CacheResult<()>;

    /// Returns the live value for `key`.
    fn get(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Returns the live value and its remaining lifetime, or `None` if absent or lapsed.
    fn get_with_ttl(&self, key: &str) -> CacheResult<Option<(Value, Ttl)>>;

    /// Removes `key`. Returns `false` if it was not present.
    fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Lists live user keys.
    fn keys(&self) -> CacheResult<Vec<String>>;

    /// Evicts whatever has expired and returns how many entries went.
    fn purge_expired(&self) -> CacheResult<usize>;
}

impl TierStore for FilesystemTier {
    fn put(&self, key: &str, value: Value, ttl: Ttl) -> CacheResult<()> {
        FilesystemTier::put(self, key, &value, ttl)?;
        Ok(())
    }

    fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        Ok(FilesystemTier::get(self, key)?)
    }

    fn get_with_ttl(&self, key: &str) -> CacheResult<Option<(Value, Ttl)>> {
        let Some(record) = self.get_record(key)? else {
            return Ok(None);
        };
        let ttl = record.expiry().remaining_ttl(self.now());
        Ok(ttl.map(|ttl| (record.data, ttl)))
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(FilesystemTier::delete(self, key)?)
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self.list_all()?.into_iter().map(|(key, _)| key).collect())
    }

    fn purge_expired(&self) -> CacheResult<usize> {
        Ok(FilesystemTier::purge_expired(self)?)
    }
}

/// [`TierStore`] view of a [`MemoryTier`] that hides reserved keys.
pub struct MemoryStore<M: MemoryTier> {
    inner: Arc<M>,
}

impl<M: MemoryTier> MemoryStore<M> {
    pub fn new(inner: Arc<M>) -> Self {
        Self { inner }
    }

    /// Returns the wrapped adapter.
    pub fn adapter(&self) -> &Arc<M> {
        &self.inner
    }
}

impl<M: MemoryTier> TierStore for MemoryStore<M> {
    fn put(&self, key: &str, value: Value, ttl: Ttl) -> CacheResult<()> {
        Ok(self.inner.put(key, value, ttl)?)
    }

    fn get(&self, key: &str) -> CacheResult<Option<Value>> {
        Ok(self.inner.get(key)?)
    }

    fn get_with_ttl(&self, key: &str) -> CacheResult<Option<(Value, Ttl)>> {
        let Some(value) = self.inner.get(key)? else {
            return Ok(None);
        };
        Ok(self.inner.remaining_ttl(key)?.map(|ttl| (value, ttl)))
    }

    fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(self.inner.delete(key)?)
    }

    fn keys(&self) -> CacheResult<Vec<String>> {
        Ok(self
            .inner
            .enumerate()?
            .into_iter()
            .map(|(key, _)| key)
            .filter(|key| !is_reserved_key(key))
            .collect())
    }

    /// The adapter evicts on its own clock; enumerating is enough to let it do so.
    fn purge_expired(&self) -> CacheResult<usize> {
        self.inner.enumerate()?;
        Ok(0)
    }
}

impl<M: MemoryTier> std::fmt::Debug for MemoryStore<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}
