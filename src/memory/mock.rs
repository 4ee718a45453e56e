//! Mock memory tier with switchable failures.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

use super::error::{MemoryTierError, MemoryTierResult};
use super::{MemoryTier, MokaMemoryTier};
use crate::clock::Clock;
use crate::storage::Ttl;

/// Memory tier that delegates to [`MokaMemoryTier`] but can be told to fail.
///
/// Relies on the trait's default `remaining_ttl`, so it also exercises that path.
pub struct MockMemoryTier {
    inner: MokaMemoryTier,
    fail_writes: AtomicBool,
    unavailable: AtomicBool,
}

impl MockMemoryTier {
    /// Creates a healthy mock tier.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: MokaMemoryTier::new(clock),
            fail_writes: AtomicBool::new(false),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Makes every `put` fail with [`MemoryTierError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every operation fail with [`MemoryTierError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> MemoryTierResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(MemoryTierError::Unavailable {
                reason: "mock tier marked unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl MemoryTier for MockMemoryTier {
    fn put(&self, key: &str, value: Value, ttl: Ttl) -> MemoryTierResult<()> {
        self.check()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(MemoryTierError::Unavailable {
                reason: "mock write failure".to_string(),
            });
        }
        self.inner.put(key, value, ttl)
    }

    fn get(&self, key: &str) -> MemoryTierResult<Option<Value>> {
        self.check()?;
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> MemoryTierResult<bool> {
        self.check()?;
        self.inner.delete(key)
    }

    fn enumerate(&self) -> MemoryTierResult<Vec<(String, Value)>> {
        self.check()?;
        self.inner.enumerate()
    }

    fn enumerate_with_ttl(&self) -> MemoryTierResult<Vec<(String, Option<u64>)>> {
        self.check()?;
        self.inner.enumerate_with_ttl()
    }
}
