#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{actioncontroller_payload, event, harness};
use proptest::prelude::*;
use serde_json::Value;
use stasher_core::core_types::schema::EVENT_PROCESS_ACTION;
use stasher_core::extractors::extract_current_scope;
use stasher_core::scope::current;
use stasher_core::ScopeStore;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_threads_never_see_each_others_scope() {
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["alice", "bob"]
        .into_iter()
        .map(|user| {
            let barrier = barrier.clone();
            thread::spawn(move || {
                current::set("user", user);
                barrier.wait();
                let seen = current::with(|scope| extract_current_scope(scope));
                barrier.wait();
                seen
            })
        })
        .collect();

    let seen: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(seen[0]["user"], "alice");
    assert_eq!(seen[1]["user"], "bob");
}

#[test]
fn test_concurrent_requests_through_one_subscriber() {
    let h = harness();
    let subscriber = Arc::new(h.subscriber.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let subscriber = subscriber.clone();
            thread::spawn(move || {
                current::set("worker", i);
                subscriber.handle(&event(EVENT_PROCESS_ACTION, actioncontroller_payload(), i));
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = h.sink.lines();
    assert_eq!(lines.len(), 8);
    let mut workers: Vec<u64> = lines
        .iter()
        .map(|line| {
            let record: Value = serde_json::from_str(line).unwrap();
            record["@fields"]["worker"].as_u64().unwrap()
        })
        .collect();
    workers.sort_unstable();
    assert_eq!(workers, (0..8).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn prop_explicit_stores_are_isolated(
        key in "[a-z]{1,8}",
        left in any::<i64>(),
        right in any::<i64>(),
    ) {
        let mut a = ScopeStore::new();
        let mut b = ScopeStore::new();
        a.set(key.clone(), left);
        b.set(key.clone(), right);

        prop_assert_eq!(extract_current_scope(&a)[&key].as_i64(), Some(left));
        prop_assert_eq!(extract_current_scope(&b)[&key].as_i64(), Some(right));

        a.clear();
        prop_assert!(extract_current_scope(&a).is_empty());
        prop_assert_eq!(extract_current_scope(&b).len(), 1);
    }
}
