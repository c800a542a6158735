// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-event listener registry.
//!
//! Listeners are kept in registration order under their event name. A
//! listener's identity is its `Arc` allocation: registering a clone of an
//! already-registered `Arc` for the same event is a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use tack_core::{EventName, ServerMessage};
use tracing::{trace, warn};

use crate::error::ListenerError;

/// Callback invoked with every inbound message of the event it is registered for.
pub type Listener = Arc<dyn Fn(&ServerMessage) -> Result<(), ListenerError> + Send + Sync>;

/// Wraps a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&ServerMessage) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handle returned by registration, usable to remove exactly that listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    listener: Listener,
    once: bool,
}

/// Outcome of delivering one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Listeners that returned `Ok`.
    pub delivered: usize,
    /// Listeners that returned `Err`.
    pub failed: usize,
}

/// Map from event name to its ordered listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<EventName, Vec<Registration>>,
    next_id: u64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener` for `event`.
    ///
    /// Returns the existing id if this exact listener is already registered.
    pub fn register(&mut self, event: EventName, listener: Listener) -> ListenerId {
        self.insert(event, listener, false)
    }

    /// Registers `listener` to run for the next `event` only.
    pub fn register_once(&mut self, event: EventName, listener: Listener) -> ListenerId {
        self.insert(event, listener, true)
    }

    fn insert(&mut self, event: EventName, listener: Listener, once: bool) -> ListenerId {
        let entries = self.listeners.entry(event).or_default();
        if let Some(existing) = entries
            .iter()
            .find(|r| Arc::ptr_eq(&r.listener, &listener))
        {
            trace!(%event, "listener already registered");
            return existing.id;
        }
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        entries.push(Registration { id, listener, once });
        id
    }

    /// Removes one listener by id, or every listener for `event` when `id` is `None`.
    ///
    /// Returns how many registrations were removed.
    pub fn unregister(&mut self, event: EventName, id: Option<ListenerId>) -> usize {
        let Some(entries) = self.listeners.get_mut(&event) else {
            return 0;
        };
        let before = entries.len();
        match id {
            Some(id) => entries.retain(|r| r.id != id),
            None => entries.clear(),
        }
        let removed = before - entries.len();
        if entries.is_empty() {
            self.listeners.remove(&event);
        }
        removed
    }

    /// Removes `listener` from `event`. Returns true if it was registered.
    pub fn unregister_listener(&mut self, event: EventName, listener: &Listener) -> bool {
        let id = self.listeners.get(&event).and_then(|entries| {
            entries
                .iter()
                .find(|r| Arc::ptr_eq(&r.listener, listener))
                .map(|r| r.id)
        });
        match id {
            Some(id) => self.unregister(event, Some(id)) > 0,
            None => false,
        }
    }

    /// Invokes every listener registered for the message's event, in order.
    ///
    /// A failing listener is logged and counted; later listeners still run.
    pub fn dispatch(&mut self, msg: &ServerMessage) -> DispatchReport {
        let event = msg.name();
        let Some(entries) = self.listeners.get_mut(&event) else {
            return DispatchReport::default();
        };

        let snapshot: Vec<(ListenerId, Listener)> = entries
            .iter()
            .map(|r| (r.id, Arc::clone(&r.listener)))
            .collect();
        entries.retain(|r| !r.once);
        if entries.is_empty() {
            self.listeners.remove(&event);
        }

        let mut report = DispatchReport::default();
        for (id, listener) in snapshot {
            match listener(msg) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(%event, listener = id.0, error = %e, "listener failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Removes every registration for every event.
    pub fn teardown_all(&mut self) {
        self.listeners.clear();
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn listener_count(&self, event: EventName) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
