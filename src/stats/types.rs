use serde::{Deserialize, Serialize};

/// Per-key counters for one monitoring session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStats {
    /// Successful stores.
    pub store_count: u64,
    /// Fetches that returned a value.
    pub fetch_count: u64,
    /// Fetches that found nothing.
    pub miss_count: u64,
}

/// Aggregated view of the statistics ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Epoch seconds at which the current monitoring session began.
    pub monitoring_start: Option<i64>,
    /// Elapsed seconds recorded when monitoring was re-enabled mid-session.
    pub total_monitored_secs: Option<i64>,
    /// Counters in first-recorded order.
    pub per_key: Vec<(String, KeyStats)>,
    /// Key with the strictly highest fetch count (first wins on ties).
    pub most_fetched_key: Option<String>,
    /// Key with the strictly highest store count (first wins on ties).
    pub most_stored_key: Option<String>,
}

impl CacheStats {
    /// Returns the counters for `key`, if any were recorded.
    pub fn key(&self, key: &str) -> Option<&KeyStats> {
        self.per_key
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, stats)| stats)
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.per_key.is_empty()
    }
}

/// Persisted ledger state (stored as JSON in the memory tier).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    #[serde(default)]
    pub monitoring_start: Option<i64>,
    #[serde(default)]
    pub total_monitored_secs: Option<i64>,
    #[serde(default)]
    pub keys: Vec<KeyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct KeyRecord {
    pub key: String,
    pub counters: KeyStats,
}

impl LedgerState {
    pub fn counters_mut(&mut self, key: &str) -> &mut KeyStats {
        let idx = match self.keys.iter().position(|r| r.key == key) {
            Some(idx) => idx,
            None => {
                self.keys.push(KeyRecord {
                    key: key.to_string(),
                    counters: KeyStats::default(),
                });
                self.keys.len() - 1
            }
        };
        &mut self.keys[idx].counters
    }

    /// Single linear pass; a later key only wins with a strictly higher count.
    pub fn aggregate(&self) -> CacheStats {
        let mut most_fetched: Option<(&str, u64)> = None;
        let mut most_stored: Option<(&str, u64)> = None;

        for record in &self.keys {
            let fetched = record.counters.fetch_count;
            if fetched > most_fetched.map_or(0, |(_, n)| n) {
                most_fetched = Some((&record.key, fetched));
            }
            let stored = record.counters.store_count;
            if stored > most_stored.map_or(0, |(_, n)| n) {
                most_stored = Some((&record.key, stored));
            }
        }

        CacheStats {
            monitoring_start: self.monitoring_start,
            total_monitored_secs: self.total_monitored_secs,
            per_key: self
                .keys
                .iter()
                .map(|r| (r.key.clone(), r.counters))
                .collect(),
            most_fetched_key: most_fetched.map(|(k, _)| k.to_string()),
            most_stored_key: most_stored.map(|(k, _)| k.to_string()),
        }
    }
}
