use super::*;
use crate::clock::ManualClock;
use serde_json::json;
use std::sync::Arc;

fn create_test_tier() -> (MokaMemoryTier, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_000));
    (MokaMemoryTier::new(clock.clone()), clock)
}

fn sorted<T: Clone>(mut items: Vec<(String, T)>) -> Vec<(String, T)> {
    items.sort_by(|a, b| a.0.cmp(&b.0));
    items
}

#[test]
fn test_put_get_delete() {
    let (tier, _clock) = create_test_tier();

    tier.put("key_1", json!("value_1"), Ttl::Never).expect("put");
    assert_eq!(tier.get("key_1").expect("get"), Some(json!("value_1")));

    assert!(tier.delete("key_1").expect("delete"));
    assert_eq!(tier.get("key_1").expect("get"), None);
    assert!(!tier.delete("key_1").expect("delete"));
}

#[test]
fn test_get_respects_clock() {
    let (tier, clock) = create_test_tier();

    tier.put("k", json!(1), Ttl::Secs(5)).expect("put");
    clock.advance(5);
    assert_eq!(tier.get("k").expect("get"), Some(json!(1)));

    clock.advance(1);
    assert_eq!(tier.get("k").expect("get"), None);
}

#[test]
fn test_put_replaces_ttl() {
    let (tier, clock) = create_test_tier();

    tier.put("k", json!(1), Ttl::Secs(5)).expect("put");
    tier.put("k", json!(1), Ttl::Secs(10)).expect("put");

    assert_eq!(tier.remaining_ttl("k").expect("ttl"), Some(Ttl::Secs(10)));
    clock.advance(7);
    assert_eq!(tier.get("k").expect("get"), Some(json!(1)));
}

#[test]
fn test_remaining_ttl() {
    let (tier, clock) = create_test_tier();

    tier.put("timed", json!("a"), Ttl::Secs(10)).expect("put");
    tier.put("forever", json!("b"), Ttl::Never).expect("put");
    clock.advance(3);

    assert_eq!(tier.remaining_ttl("timed").expect("ttl"), Some(Ttl::Secs(7)));
    assert_eq!(tier.remaining_ttl("forever").expect("ttl"), Some(Ttl::Never));
    assert_eq!(tier.remaining_ttl("missing").expect("ttl"), None);

    clock.advance(7);
    assert_eq!(tier.remaining_ttl("timed").expect("ttl"), None);
}

#[test]
fn test_enumerate_skips_expired() {
    let (tier, clock) = create_test_tier();

    tier.put("a", json!(1), Ttl::Secs(2)).expect("put");
    tier.put("b", json!(2), Ttl::Secs(20)).expect("put");
    clock.advance(3);

    assert_eq!(
        tier.enumerate().expect("enumerate"),
        vec![("b".to_string(), json!(2))]
    );
}

#[test]
fn test_enumerate_with_ttl_reports_lapsed_as_zero() {
    let (tier, clock) = create_test_tier();

    tier.put("a", json!(1), Ttl::Secs(2)).expect("put");
    tier.put("b", json!(2), Ttl::Secs(4)).expect("put");
    tier.put("c", json!(3), Ttl::Never).expect("put");
    clock.advance(3);

    assert_eq!(
        sorted(tier.enumerate_with_ttl().expect("enumerate")),
        vec![
            ("a".to_string(), Some(0)),
            ("b".to_string(), Some(1)),
            ("c".to_string(), None),
        ]
    );
}

#[test]
fn test_len_after_pending_tasks() {
    let (tier, _clock) = create_test_tier();
    assert!(tier.is_empty());

    tier.put("a", json!(1), Ttl::Never).expect("put");
    tier.put("b", json!(2), Ttl::Never).expect("put");
    tier.run_pending_tasks();

    assert_eq!(tier.len(), 2);
}

#[test]
fn test_default_remaining_ttl_via_mock() {
    let clock = Arc::new(ManualClock::new(1_000));
    let tier = MockMemoryTier::new(clock.clone());

    tier.put("k", json!("v"), Ttl::Secs(10)).expect("put");
    clock.advance(4);

    assert_eq!(tier.remaining_ttl("k").expect("ttl"), Some(Ttl::Secs(6)));
    assert_eq!(tier.remaining_ttl("missing").expect("ttl"), None);
}

#[test]
fn test_mock_failures() {
    let tier = MockMemoryTier::new(Arc::new(ManualClock::new(1_000)));

    tier.set_fail_writes(true);
    assert!(matches!(
        tier.put("k", json!(1), Ttl::Never),
        Err(MemoryTierError::Unavailable { .. })
    ));
    assert_eq!(tier.get("k").expect("reads still work"), None);

    tier.set_fail_writes(false);
    tier.set_unavailable(true);
    assert!(tier.get("k").is_err());
    assert!(tier.enumerate().is_err());
}
