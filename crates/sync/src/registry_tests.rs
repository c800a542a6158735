// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use yare::parameterized;

fn counter() -> (Listener, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let l = listener(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    (l, count)
}

fn deleted(id: &str) -> ServerMessage {
    ServerMessage::TaskDeleted(id.into())
}

#[test]
fn test_dispatch_reaches_registered_listener() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    registry.register(EventName::TaskDeleted, l);

    let report = registry.dispatch(&deleted("t1"));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(
        report,
        DispatchReport {
            delivered: 1,
            failed: 0
        }
    );
}

#[test]
fn test_dispatch_ignores_other_events() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    registry.register(EventName::TaskCreated, l);

    let report = registry.dispatch(&deleted("t1"));

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(report, DispatchReport::default());
}

#[test]
fn test_register_same_listener_twice_invokes_once() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    let first = registry.register(EventName::TaskDeleted, Arc::clone(&l));
    let second = registry.register(EventName::TaskDeleted, l);

    assert_eq!(first, second);
    assert_eq!(registry.listener_count(EventName::TaskDeleted), 1);
    registry.dispatch(&deleted("t1"));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_same_listener_on_two_events_is_two_registrations() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    registry.register(EventName::TaskDeleted, Arc::clone(&l));
    registry.register(EventName::ColumnDeleted, l);

    assert_eq!(registry.len(), 2);
    registry.dispatch(&deleted("t1"));
    registry.dispatch(&ServerMessage::ColumnDeleted("c1".into()));
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_equal_closures_are_distinct_listeners() {
    let mut registry = ListenerRegistry::new();
    let (a, count_a) = counter();
    let (b, count_b) = counter();
    registry.register(EventName::TaskDeleted, a);
    registry.register(EventName::TaskDeleted, b);

    registry.dispatch(&deleted("t1"));
    assert_eq!(count_a.load(Ordering::SeqCst), 1);
    assert_eq!(count_b.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unregistered_listener_is_never_invoked() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    let id = registry.register(EventName::TaskDeleted, l);

    assert_eq!(registry.unregister(EventName::TaskDeleted, Some(id)), 1);
    registry.dispatch(&deleted("t1"));

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_unregister_by_listener() {
    let mut registry = ListenerRegistry::new();
    let (a, count_a) = counter();
    let (b, count_b) = counter();
    registry.register(EventName::TaskDeleted, Arc::clone(&a));
    registry.register(EventName::TaskDeleted, b);

    assert!(registry.unregister_listener(EventName::TaskDeleted, &a));
    assert!(!registry.unregister_listener(EventName::TaskDeleted, &a));
    registry.dispatch(&deleted("t1"));

    assert_eq!(count_a.load(Ordering::SeqCst), 0);
    assert_eq!(count_b.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unregister_all_for_event() {
    let mut registry = ListenerRegistry::new();
    let (a, _) = counter();
    let (b, _) = counter();
    let (c, count_c) = counter();
    registry.register(EventName::TaskDeleted, a);
    registry.register(EventName::TaskDeleted, b);
    registry.register(EventName::TaskCreated, c);

    assert_eq!(registry.unregister(EventName::TaskDeleted, None), 2);
    assert_eq!(registry.listener_count(EventName::TaskDeleted), 0);
    assert_eq!(registry.listener_count(EventName::TaskCreated), 1);
    assert_eq!(count_c.load(Ordering::SeqCst), 0);
}

#[parameterized(
    unknown_event = { EventName::UserLeft, None },
    unknown_id = { EventName::TaskDeleted, Some(ListenerId(999)) },
)]
fn test_unregister_missing_is_noop(event: EventName, id: Option<ListenerId>) {
    let mut registry = ListenerRegistry::new();
    let (l, _) = counter();
    registry.register(EventName::TaskDeleted, l);

    assert_eq!(registry.unregister(event, id), 0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_dispatch_in_registration_order() {
    let mut registry = ListenerRegistry::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = Arc::clone(&order);
        registry.register(
            EventName::TaskDeleted,
            listener(move |_| {
                order.lock().unwrap().push(tag);
                Ok(())
            }),
        );
    }

    registry.dispatch(&deleted("t1"));
    assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
}

#[test]
fn test_failing_listener_does_not_stop_delivery() {
    let mut registry = ListenerRegistry::new();
    let (before, count_before) = counter();
    let (after, count_after) = counter();
    registry.register(EventName::TaskDeleted, before);
    registry.register(
        EventName::TaskDeleted,
        listener(|_| Err(ListenerError::new("boom"))),
    );
    registry.register(EventName::TaskDeleted, after);

    let report = registry.dispatch(&deleted("t1"));

    assert_eq!(
        report,
        DispatchReport {
            delivered: 2,
            failed: 1
        }
    );
    assert_eq!(count_before.load(Ordering::SeqCst), 1);
    assert_eq!(count_after.load(Ordering::SeqCst), 1);
}

#[test]
fn test_listener_receives_payload() {
    let mut registry = ListenerRegistry::new();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    registry.register(
        EventName::UserLeft,
        listener(move |msg| {
            if let ServerMessage::UserLeft(user_id) = msg {
                *sink.lock().unwrap() = Some(user_id.clone());
            }
            Ok(())
        }),
    );

    registry.dispatch(&ServerMessage::UserLeft("bob".into()));
    assert_eq!(seen.lock().unwrap().as_deref(), Some("bob"));
}

#[test]
fn test_once_listener_runs_once() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    registry.register_once(EventName::TaskDeleted, l);

    registry.dispatch(&deleted("t1"));
    registry.dispatch(&deleted("t2"));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());
}

#[test]
fn test_once_removed_even_when_failing() {
    let mut registry = ListenerRegistry::new();
    registry.register_once(
        EventName::Error,
        listener(|_| Err(ListenerError::new("nope"))),
    );

    let report = registry.dispatch(&ServerMessage::error("x"));
    assert_eq!(report.failed, 1);
    assert_eq!(registry.listener_count(EventName::Error), 0);
}

#[test]
fn test_once_keeps_persistent_neighbours() {
    let mut registry = ListenerRegistry::new();
    let (persistent, count) = counter();
    let (single, _) = counter();
    registry.register(EventName::TaskDeleted, persistent);
    registry.register_once(EventName::TaskDeleted, single);

    registry.dispatch(&deleted("t1"));
    registry.dispatch(&deleted("t2"));

    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(registry.listener_count(EventName::TaskDeleted), 1);
}

#[test]
fn test_teardown_all_removes_everything() {
    let mut registry = ListenerRegistry::new();
    let (l, count) = counter();
    for event in EventName::ALL {
        registry.register(event, Arc::clone(&l));
    }
    assert_eq!(registry.len(), EventName::ALL.len());

    registry.teardown_all();
    registry.teardown_all();

    assert!(registry.is_empty());
    registry.dispatch(&deleted("t1"));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ids_are_not_reused() {
    let mut registry = ListenerRegistry::new();
    let (a, _) = counter();
    let (b, _) = counter();
    let first = registry.register(EventName::TaskDeleted, a);
    registry.unregister(EventName::TaskDeleted, Some(first));
    let second = registry.register(EventName::TaskDeleted, b);
    assert_ne!(first, second);
}
