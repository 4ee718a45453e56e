use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::error::{LedgerError, LedgerResult};
use super::types::{CacheStats, KeyStats, LedgerState};
use crate::clock::Clock;
use crate::constants::STATS_LEDGER_KEY;
use crate::memory::MemoryTier;
use crate::storage::Ttl;

/// Statistics ledger persisted in the memory tier under [`STATS_LEDGER_KEY`].
///
/// Every update is a read-modify-write of the whole ledger. Updates through one ledger
/// handle are serialized by a local mutex; handles in other processes sharing the same
/// memory tier can still interleave and lose increments. Counters are therefore
/// approximate under concurrent load, but never negative and never decreasing within a
/// session.
pub struct StatsLedger<M: MemoryTier> {
    memory: Arc<M>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl<M: MemoryTier> StatsLedger<M> {
    /// Creates a ledger stored in `memory`.
    pub fn new(memory: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Counts a store of `key`.
    pub fn record_store(&self, key: &str) -> LedgerResult<()> {
        self.bump(key, |c| c.store_count += 1)
    }

    /// Counts a fetch of `key` that returned a value.
    pub fn record_fetch(&self, key: &str) -> LedgerResult<()> {
        self.bump(key, |c| c.fetch_count += 1)
    }

    /// Counts a fetch of `key` that found nothing.
    pub fn record_miss(&self, key: &str) -> LedgerResult<()> {
        self.bump(key, |c| c.miss_count += 1)
    }

    /// Starts a monitoring session.
    ///
    /// If a session is already running, the start stays put and the elapsed time is
    /// stored in `total_monitored_secs` instead.
    pub fn begin_session(&self) -> LedgerResult<()> {
        let _guard = self.write_lock.lock();
        let mut state = self.load()?.unwrap_or_default();
        let now = self.clock.now();

        match state.monitoring_start {
            None => {
                state.monitoring_start = Some(now);
                debug!(start = now, "Monitoring session started");
            }
            Some(start) => {
                state.total_monitored_secs = Some(now - start);
                debug!(start, elapsed = now - start, "Monitoring session already active");
            }
        }

        self.save(&state)
    }

    /// Returns `true` if a session start has been stamped.
    pub fn is_session_active(&self) -> LedgerResult<bool> {
        Ok(self
            .load()?
            .is_some_and(|state| state.monitoring_start.is_some()))
    }

    /// Clears the entire ledger (counters and session window).
    pub fn reset(&self) -> LedgerResult<()> {
        let _guard = self.write_lock.lock();
        self.memory.delete(STATS_LEDGER_KEY)?;
        Ok(())
    }

    /// Aggregates the ledger.
    ///
    /// Returns empty stats if nothing was recorded or no session was ever started.
    pub fn snapshot(&self) -> LedgerResult<CacheStats> {
        match self.load()? {
            Some(state) if state.monitoring_start.is_some() => Ok(state.aggregate()),
            _ => Ok(CacheStats::default()),
        }
    }

    fn bump(&self, key: &str, f: impl FnOnce(&mut KeyStats)) -> LedgerResult<()> {
        let _guard = self.write_lock.lock();
        let mut state = self.load()?.unwrap_or_default();
        f(state.counters_mut(key));
        self.save(&state)
    }

    fn load(&self) -> LedgerResult<Option<LedgerState>> {
        let Some(raw) = self.memory.get(STATS_LEDGER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_value(raw) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable statistics ledger");
                Ok(None)
            }
        }
    }

    fn save(&self, state: &LedgerState) -> LedgerResult<()> {
        let raw =
            serde_json::to_value(state).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        self.memory.put(STATS_LEDGER_KEY, raw, Ttl::Never)?;
        Ok(())
    }
}

impl<M: MemoryTier> std::fmt::Debug for StatsLedger<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsLedger")
            .field("key", &STATS_LEDGER_KEY)
            .finish()
    }
}
