// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Event bus for inter-component communication.
//!
//! Delivery is synchronous: `publish` runs every handler registered for the
//! event's kind, in registration order, before it returns. Handlers are
//! isolated from each other; an error or panic in one is logged and the
//! remaining handlers still run.

use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::alerts::Alert;
use crate::inspection::InspectionRecord;

/// Event kinds in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    InspectionCreated,
    AlertCreated,
    AlertUpdated,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [
        EventKind::InspectionCreated,
        EventKind::AlertCreated,
        EventKind::AlertUpdated,
    ];

    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InspectionCreated => "inspection.created",
            Self::AlertCreated => "alert.created",
            Self::AlertUpdated => "alert.updated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event and its payload. Each kind carries exactly one payload type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    #[serde(rename = "inspection.created")]
    InspectionCreated(InspectionRecord),
    #[serde(rename = "alert.created")]
    AlertCreated(Alert),
    #[serde(rename = "alert.updated")]
    AlertUpdated(Alert),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::InspectionCreated(_) => EventKind::InspectionCreated,
            Self::AlertCreated(_) => EventKind::AlertCreated,
            Self::AlertUpdated(_) => EventKind::AlertUpdated,
        }
    }
}

/// What a handler reports back to the bus
pub type HandlerResult = anyhow::Result<()>;

type Handler = Arc<dyn Fn(&Event) -> HandlerResult + Send + Sync>;
type Registry = RwLock<HashMap<EventKind, Vec<Registration>>>;

#[derive(Clone)]
struct Registration {
    id: u64,
    active: Arc<AtomicBool>,
    handler: Handler,
}

/// Capability returned by [`EventBus::subscribe`]. Calling
/// [`Subscription::unsubscribe`] removes exactly the one registration it was
/// created for; further calls do nothing.
#[must_use = "dropping a Subscription leaves the handler registered"]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    active: Arc<AtomicBool>,
    registry: Weak<Registry>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        // Flip the flag first so an in-flight publish skips this handler
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.write();
            if let Some(handlers) = registry.get_mut(&self.kind) {
                handlers.retain(|r| r.id != self.id);
            }
        }
        trace!(kind = %self.kind, id = self.id, "Handler unsubscribed");
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Central event bus for pub/sub communication
pub struct EventBus {
    registry: Arc<Registry>,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    /// Register `handler` for `kind`. Registering the same closure twice
    /// yields two independent subscriptions that both fire.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Event) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));

        self.registry.write().entry(kind).or_default().push(Registration {
            id,
            active: Arc::clone(&active),
            handler: Arc::new(handler),
        });
        trace!(%kind, id, "Handler subscribed");

        Subscription {
            id,
            kind,
            active,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn on_inspection_created<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&InspectionRecord) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(EventKind::InspectionCreated, move |event| match event {
            Event::InspectionCreated(record) => handler(record),
            _ => Ok(()),
        })
    }

    pub fn on_alert_created<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Alert) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(EventKind::AlertCreated, move |event| match event {
            Event::AlertCreated(alert) => handler(alert),
            _ => Ok(()),
        })
    }

    pub fn on_alert_updated<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&Alert) -> HandlerResult + Send + Sync + 'static,
    {
        self.subscribe(EventKind::AlertUpdated, move |event| match event {
            Event::AlertUpdated(alert) => handler(alert),
            _ => Ok(()),
        })
    }

    /// Deliver `event` to every handler registered for its kind. Returns the
    /// number of handlers that completed successfully.
    ///
    /// The handler list is snapshotted before delivery, so handlers may
    /// subscribe or unsubscribe freely; a handler unsubscribed mid-publish is
    /// skipped, one subscribed mid-publish first sees the next event.
    pub fn publish(&self, event: Event) -> usize {
        let kind = event.kind();
        self.published.fetch_add(1, Ordering::Relaxed);

        let handlers: Vec<Registration> = self
            .registry
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut delivered = 0;
        for registration in handlers {
            if !registration.active.load(Ordering::Acquire) {
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| (registration.handler)(&event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(%kind, handler = registration.id, "Event handler failed: {:#}", e);
                }
                Err(_) => {
                    warn!(%kind, handler = registration.id, "Event handler panicked");
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry.read().get(&kind).map_or(0, Vec::len)
    }

    /// Total publish calls since construction
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
