//! Cache fixtures on a temp root and a manual clock.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tiercache::clock::{Clock, ManualClock};
use tiercache::config::Config;
use tiercache::memory::MokaMemoryTier;
use tiercache::{MockTieredCache, TieredCache};

pub const START: i64 = 1_700_000_000;

/// A cache plus the handles a test needs to drive it.
pub struct Fixture {
    pub cache: TieredCache<MokaMemoryTier>,
    pub memory: Arc<MokaMemoryTier>,
    pub clock: Arc<ManualClock>,
    pub dir: TempDir,
}

pub fn config_for(root: &Path, monitoring: bool) -> Config {
    Config {
        monitoring,
        ..Config::with_root(root)
    }
}

pub fn fixture(monitoring: bool) -> Fixture {
    let dir = TempDir::new().expect("temp dir");
    let clock = Arc::new(ManualClock::new(START));
    let shared: Arc<dyn Clock> = clock.clone();
    let memory = Arc::new(MokaMemoryTier::new(shared.clone()));
    let cache = TieredCache::with_clock(&config_for(dir.path(), monitoring), memory.clone(), shared)
        .expect("cache");
    Fixture {
        cache,
        memory,
        clock,
        dir,
    }
}

/// Opens a second cache on an existing root, with its own (empty) memory tier.
pub fn reopen(root: &Path, clock: Arc<ManualClock>) -> TieredCache<MokaMemoryTier> {
    let shared: Arc<dyn Clock> = clock;
    let memory = Arc::new(MokaMemoryTier::new(shared.clone()));
    TieredCache::with_clock(&config_for(root, false), memory, shared).expect("reopen cache")
}

pub fn mock_fixture(monitoring: bool) -> (MockTieredCache, Arc<ManualClock>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let clock = Arc::new(ManualClock::new(START));
    let cache =
        TieredCache::new_mock(&config_for(dir.path(), monitoring), clock.clone()).expect("cache");
    (cache, clock, dir)
}
