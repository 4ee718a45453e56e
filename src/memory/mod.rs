//! Memory tier adapter contract and the in-process moka implementation.
//!
//! The memory tier models a shared cache service: thread-safe single-key operations and
//! an expiry clock it manages itself. The cache core only talks to it through
//! [`MemoryTier`].

pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod moka_tier;

#[cfg(test)]
mod tests;

pub use error::{MemoryTierError, MemoryTierResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockMemoryTier;
pub use moka_tier::MokaMemoryTier;

use serde_json::Value;

use crate::storage::Ttl;

/// Capabilities the cache core requires from a memory tier.
pub trait MemoryTier: Send + Sync {
    /// Stores `value` under `key`, expiring `ttl` from now.
    fn put(&self, key: &str, value: Value, ttl: Ttl) -> MemoryTierResult<()>;

    /// Returns the live value for `key`.
    fn get(&self, key: &str) -> MemoryTierResult<Option<Value>>;

    /// Removes `key`. Returns `false` if it was not present.
    fn delete(&self, key: &str) -> MemoryTierResult<bool>;

    /// Snapshot of all live `(key, value)` pairs, reserved keys included.
    fn enumerate(&self) -> MemoryTierResult<Vec<(String, Value)>>;

    /// Snapshot of `(key, remaining seconds)` for every entry.
    ///
    /// `None` means the entry never expires; `Some(0)` means it has lapsed but has not been
    /// evicted yet.
    fn enumerate_with_ttl(&self) -> MemoryTierResult<Vec<(String, Option<u64>)>>;

    /// Remaining lifetime of `key`, or `None` if it is absent or has lapsed.
    ///
    /// The default implementation scans [`enumerate_with_ttl`](Self::enumerate_with_ttl).
    fn remaining_ttl(&self, key: &str) -> MemoryTierResult<Option<Ttl>> {
        Ok(self
            .enumerate_with_ttl()?
            .into_iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, remaining)| Ttl::from_remaining(remaining)))
    }
}
