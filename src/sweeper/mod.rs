//! Background sweeper that purges expired filesystem records on an interval.


use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheResult, Tier, TieredCache};
use crate::memory::MemoryTier;

/// Stop signal and liveness flag for one background run.
#[derive(Default)]
struct SweepRun {
    shutdown: Notify,
    finished: AtomicBool,
}

/// Periodically runs [`TieredCache::purge_expired`] on the filesystem tier.
///
/// Purges run on the blocking pool. At most one sweep task runs per sweeper; [`stop`]
/// wakes it immediately instead of waiting for the next tick.
///
/// [`stop`]: ExpirySweeper::stop
pub struct ExpirySweeper<M: MemoryTier + 'static> {
    cache: Arc<TieredCache<M>>,
    interval: Duration,
    current: Mutex<Option<Arc<SweepRun>>>,
}

impl<M: MemoryTier + 'static> ExpirySweeper<M> {
    /// Creates a sweeper for `cache` that fires every `interval`.
    pub fn new(cache: Arc<TieredCache<M>>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            current: Mutex::new(None),
        }
    }

    /// Returns `true` while a started run has been neither stopped nor finished.
    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|run| !run.finished.load(Ordering::Acquire))
    }

    /// Runs a single purge on the blocking pool.
    pub async fn sweep_once(&self) -> CacheResult<usize> {
        purge(Arc::clone(&self.cache)).await
    }

    /// Starts the background task (no-op if already running).
    pub fn start(&self) -> JoinHandle<()> {
        let mut current = self.current.lock();
        if current
            .as_ref()
            .is_some_and(|run| !run.finished.load(Ordering::Acquire))
        {
            return tokio::spawn(async {});
        }

        let run = Arc::new(SweepRun::default());
        *current = Some(Arc::clone(&run));
        drop(current);

        let cache = Arc::clone(&self.cache);
        let period = self.interval.max(Duration::from_millis(1));

        info!(interval_ms = period.as_millis() as u64, "Expiry sweeper started");

        tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = run.shutdown.notified() => break,
                    _ = interval.tick() => {}
                }

                match purge(Arc::clone(&cache)).await {
                    Ok(evicted) => debug!(evicted, "Sweep complete"),
                    Err(e) => warn!(error = %e, "Sweep failed"),
                }
            }
            run.finished.store(true, Ordering::Release);
            info!("Expiry sweeper stopped");
        })
    }

    /// Wakes the background task and tells it to exit.
    ///
    /// A purge already in progress finishes first. The sweeper can be started again
    /// right away.
    pub fn stop(&self) {
        if let Some(run) = self.current.lock().take() {
            // notify_one keeps a permit if the task is mid-purge and not yet waiting.
            run.shutdown.notify_one();
        }
    }
}

async fn purge<M: MemoryTier + 'static>(cache: Arc<TieredCache<M>>) -> CacheResult<usize> {
    settle(tokio::task::spawn_blocking(move || cache.purge_expired(Tier::Filesystem)).await)
}

fn settle(joined: Result<CacheResult<usize>, JoinError>) -> CacheResult<usize> {
    joined.unwrap_or_else(|e| {
        Err(CacheError::TaskFailed {
            reason: e.to_string(),
        })
    })
}

impl<M: MemoryTier + 'static> std::fmt::Debug for ExpirySweeper<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirySweeper")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
