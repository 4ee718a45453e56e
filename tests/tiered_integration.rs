//! Integration tests for the tiered cache through the public API.

mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use common::fixtures::{START, fixture, mock_fixture, reopen};
use serde_json::json;
use tiercache::{CacheError, Expiry, MemoryTier, Tier, Ttl};

#[test]
fn test_filesystem_records_survive_reopen() {
    let f = fixture(false);

    f.cache
        .store("durable", json!({"v": 1}), Ttl::Secs(60), Tier::Filesystem)
        .expect("store");
    f.cache
        .store("volatile", json!("gone"), Ttl::Secs(60), Tier::Memory)
        .expect("store");

    let reopened = reopen(f.dir.path(), f.clock.clone());
    assert_eq!(
        reopened.fetch("durable", Tier::Filesystem).expect("fetch"),
        Some(json!({"v": 1}))
    );
    assert_eq!(reopened.fetch("volatile", Tier::Memory).expect("fetch"), None);
}

#[test]
fn test_spill_and_warm_cycle() {
    let f = fixture(false);

    for (key, secs) in [("a", 2), ("b", 3), ("c", 4)] {
        f.cache
            .store(key, json!(key), Ttl::Secs(secs), Tier::Memory)
            .expect("store");
    }

    let spilled = f.cache.copy_all_to_filesystem(true).expect("spill");
    assert_eq!(spilled.migrated.len(), 3);
    assert_eq!(f.memory.enumerate().expect("enumerate").len(), 0);

    for (key, secs) in [("a", 2), ("b", 3), ("c", 4)] {
        let record = f
            .cache
            .filesystem()
            .get_record(key)
            .expect("read")
            .expect("present");
        assert_eq!(record.data, json!(key));
        assert_eq!(record.expiry(), Expiry::At(START + secs));
    }

    // A fresh process warms its memory tier from disk; "a" has lapsed by then.
    f.clock.advance(3);
    let reopened = reopen(f.dir.path(), f.clock.clone());
    let warmed = reopened.copy_all_to_memory(false).expect("warm");
    assert!(warmed.succeeded_at_least_one());

    let migrated: HashSet<_> = warmed.migrated.into_iter().collect();
    assert_eq!(migrated, HashSet::from(["c".to_string()]));
    assert_eq!(
        reopened.fetch("c", Tier::Memory).expect("fetch"),
        Some(json!("c"))
    );
    assert_eq!(reopened.fetch("a", Tier::Memory).expect("fetch"), None);
}

#[test]
fn test_statistics_session() {
    let f = fixture(true);

    for key in ["A", "B"] {
        f.cache
            .store(key, json!(key), Ttl::Never, Tier::Memory)
            .expect("store");
    }
    f.cache.fetch("A", Tier::Memory).expect("fetch");
    f.cache.fetch("A", Tier::Memory).expect("fetch");
    f.cache.fetch("B", Tier::Memory).expect("fetch");

    assert_eq!(
        f.cache.most_fetched_key().expect("stats"),
        Some("A".to_string())
    );
    // Equal store counts: the first recorded key wins.
    assert_eq!(
        f.cache.most_stored_key().expect("stats"),
        Some("A".to_string())
    );

    let stats = f.cache.stats().expect("stats");
    assert_eq!(stats.monitoring_start, Some(START));
    assert_eq!(stats.key("A").map(|s| s.fetch_count), Some(2));
}

#[test]
fn test_concurrent_filesystem_writers() {
    let f = fixture(false);
    let fs = Arc::new(f.cache.filesystem().clone());

    let writers: Vec<_> = (0..8)
        .map(|n| {
            let fs = Arc::clone(&fs);
            thread::spawn(move || {
                for round in 0..25 {
                    fs.put("shared", &json!({"writer": n, "round": round}), Ttl::Secs(60))
                        .expect("put");
                }
            })
        })
        .collect();

    let reader = {
        let fs = Arc::clone(&fs);
        thread::spawn(move || {
            for _ in 0..200 {
                if let Some(value) = fs.get("shared").expect("get") {
                    assert!(value.get("writer").is_some());
                    assert!(value.get("round").is_some());
                }
            }
        })
    };

    for writer in writers {
        writer.join().expect("writer thread");
    }
    reader.join().expect("reader thread");

    let last = fs.get("shared").expect("get").expect("present");
    assert!(last["round"].is_number());
}

#[test]
fn test_concurrent_stats_are_monotonic() {
    let f = fixture(true);
    let cache = Arc::new(f.cache);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..20 {
                    cache
                        .store("hot", json!(1), Ttl::Secs(30), Tier::Memory)
                        .expect("store");
                    cache.fetch("hot", Tier::Memory).expect("fetch");
                }
            })
        })
        .collect();

    let mut last = 0;
    for _ in 0..50 {
        let stats = cache.stats().expect("stats");
        let seen = stats.key("hot").map_or(0, |s| s.store_count);
        assert!(seen >= last);
        last = seen;
    }
    for worker in workers {
        worker.join().expect("worker thread");
    }

    let stats = cache.stats().expect("stats");
    let hot = stats.key("hot").expect("recorded");
    assert!(hot.store_count >= last && hot.store_count <= 80);
    assert!(hot.fetch_count > 0);
}

#[test]
fn test_memory_outage_is_reported() {
    let (cache, _clock, _dir) = mock_fixture(false);

    cache
        .store("k", json!(1), Ttl::Secs(10), Tier::Memory)
        .expect("store");
    cache.mock_memory().set_unavailable(true);

    assert!(matches!(
        cache.copy_entry_to_filesystem("k", true),
        Err(CacheError::DependencyUnavailable(_))
    ));
    assert!(!cache.filesystem().exists("k"));

    cache.mock_memory().set_unavailable(false);
    assert_eq!(cache.fetch("k", Tier::Memory).expect("fetch"), Some(json!(1)));
}
