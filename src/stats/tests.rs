use super::*;
use crate::clock::ManualClock;
use crate::constants::STATS_LEDGER_KEY;
use crate::memory::{MemoryTier, MockMemoryTier, MokaMemoryTier};
use crate::storage::Ttl;
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn create_test_ledger() -> (StatsLedger<MokaMemoryTier>, Arc<MokaMemoryTier>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(5_000));
    let memory = Arc::new(MokaMemoryTier::new(clock.clone()));
    let ledger = StatsLedger::new(memory.clone(), clock.clone());
    (ledger, memory, clock)
}

#[test]
fn test_snapshot_without_session_is_empty() {
    let (ledger, _memory, _clock) = create_test_ledger();

    ledger.record_store("k").expect("record");

    assert_eq!(ledger.snapshot().expect("snapshot"), CacheStats::default());
    assert!(!ledger.is_session_active().expect("active"));
}

#[test]
fn test_record_counts() {
    let (ledger, _memory, _clock) = create_test_ledger();
    ledger.begin_session().expect("begin");

    ledger.record_store("key_7").expect("record");
    ledger.record_fetch("key_7").expect("record");
    ledger.record_fetch("key_7").expect("record");
    ledger.record_miss("other").expect("record");

    let stats = ledger.snapshot().expect("snapshot");
    assert_eq!(
        stats.key("key_7"),
        Some(&KeyStats {
            store_count: 1,
            fetch_count: 2,
            miss_count: 0,
        })
    );
    assert_eq!(stats.key("other").map(|s| s.miss_count), Some(1));
    assert_eq!(stats.monitoring_start, Some(5_000));
}

#[test]
fn test_per_key_keeps_first_recorded_order() {
    let (ledger, _memory, _clock) = create_test_ledger();
    ledger.begin_session().expect("begin");

    for key in ["c", "a", "b", "a"] {
        ledger.record_store(key).expect("record");
    }

    let keys: Vec<_> = ledger
        .snapshot()
        .expect("snapshot")
        .per_key
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    assert_eq!(keys, vec!["c", "a", "b"]);
}

#[test]
fn test_most_fetched_key() {
    let (ledger, _memory, _clock) = create_test_ledger();
    ledger.begin_session().expect("begin");

    ledger.record_fetch("B").expect("record");
    ledger.record_fetch("A").expect("record");
    ledger.record_fetch("A").expect("record");

    assert_eq!(
        ledger.snapshot().expect("snapshot").most_fetched_key,
        Some("A".to_string())
    );
}

#[test]
fn test_most_stored_key_tie_goes_to_first() {
    let (ledger, _memory, _clock) = create_test_ledger();
    ledger.begin_session().expect("begin");

    for key in ["entry_4", "entry_1", "entry_1", "entry_2", "entry_2"] {
        ledger.record_store(key).expect("record");
    }

    let stats = ledger.snapshot().expect("snapshot");
    assert_eq!(stats.most_stored_key, Some("entry_1".to_string()));
    assert_eq!(stats.most_fetched_key, None);
}

#[test]
fn test_begin_session_twice_records_elapsed() {
    let (ledger, _memory, clock) = create_test_ledger();

    ledger.begin_session().expect("begin");
    clock.advance(90);
    ledger.begin_session().expect("begin again");

    let stats = ledger.snapshot().expect("snapshot");
    assert_eq!(stats.monitoring_start, Some(5_000));
    assert_eq!(stats.total_monitored_secs, Some(90));
}

#[test]
fn test_reset_clears_everything() {
    let (ledger, memory, _clock) = create_test_ledger();
    ledger.begin_session().expect("begin");
    ledger.record_store("key_8").expect("record");

    ledger.reset().expect("reset");

    assert_eq!(memory.get(STATS_LEDGER_KEY).expect("get"), None);
    assert!(!ledger.is_session_active().expect("active"));
    assert!(ledger.snapshot().expect("snapshot").is_empty());
}

#[test]
fn test_corrupt_ledger_is_replaced() {
    let (ledger, memory, _clock) = create_test_ledger();
    memory
        .put(STATS_LEDGER_KEY, json!("garbage"), Ttl::Never)
        .expect("put");

    ledger.begin_session().expect("begin");
    ledger.record_fetch("k").expect("record");

    assert_eq!(
        ledger.snapshot().expect("snapshot").key("k").map(|s| s.fetch_count),
        Some(1)
    );
}

#[test]
fn test_unavailable_memory_tier_surfaces() {
    let clock = Arc::new(ManualClock::new(0));
    let memory = Arc::new(MockMemoryTier::new(clock.clone()));
    let ledger = StatsLedger::new(memory.clone(), clock);

    memory.set_unavailable(true);
    assert!(matches!(
        ledger.record_store("k"),
        Err(LedgerError::Memory(_))
    ));
}

#[test]
fn test_concurrent_counts_stay_monotonic() {
    let (ledger, _memory, _clock) = create_test_ledger();
    ledger.begin_session().expect("begin");
    let ledger = Arc::new(ledger);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let mut last = 0;
                for _ in 0..25 {
                    ledger.record_store("shared").expect("record");
                    let now = ledger
                        .snapshot()
                        .expect("snapshot")
                        .key("shared")
                        .map_or(0, |s| s.store_count);
                    assert!(now >= last);
                    last = now;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let total = ledger
        .snapshot()
        .expect("snapshot")
        .key("shared")
        .map_or(0, |s| s.store_count);
    assert!(total > 0);
}
