//! Tiered cache facade, cross-tier migration and shared cache types.

pub mod error;
pub mod migration;
pub mod store;
pub mod tiered;
pub mod types;


pub use error::{CacheError, CacheResult};
pub use migration::MigrationEngine;
pub use store::{MemoryStore, TierStore};
#[cfg(any(test, feature = "mock"))]
pub use tiered::MockTieredCache;
pub use tiered::TieredCache;
pub use types::{MigrationReport, Tier};
