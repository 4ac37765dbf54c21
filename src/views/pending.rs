// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Pending-alert badge

use std::collections::HashSet;
use std::sync::Arc;
use parking_lot::Mutex;

use crate::alerts::{Alert, AlertStatus, AlertStore};
use crate::core::{EventBus, Subscription};

/// Alert ids known to be pending, plus every id already seen leaving
/// `Pending`. An id in `settled` is never counted again.
#[derive(Debug, Default)]
pub(crate) struct PendingSet {
    pending: HashSet<String>,
    settled: HashSet<String>,
}

impl PendingSet {
    /// Fold one alert observation into the set. Returns whether the count
    /// changed.
    pub(crate) fn observe(&mut self, alert: &Alert) -> bool {
        if alert.is_pending() {
            !self.settled.contains(&alert.alert_id) && self.pending.insert(alert.alert_id.clone())
        } else {
            self.settled.insert(alert.alert_id.clone());
            self.pending.remove(&alert.alert_id)
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Live count of pending alerts.
///
/// Subscribes first and merges the store snapshot second, so an alert
/// created or settled in between is neither missed nor counted twice. Each
/// alert is decremented at most once, however many updates follow its
/// first move out of `Pending`.
pub struct PendingCountView {
    state: Arc<Mutex<PendingSet>>,
    subscriptions: Vec<Subscription>,
}

impl PendingCountView {
    pub fn attach(bus: &EventBus, store: &AlertStore) -> Self {
        let state = Arc::new(Mutex::new(PendingSet::default()));
        let subscriptions = subscribe(bus, &state);

        {
            let mut set = state.lock();
            for alert in store.query(Some(AlertStatus::Pending)) {
                set.observe(&alert);
            }
        }

        Self {
            state,
            subscriptions,
        }
    }

    pub fn count(&self) -> usize {
        self.state.lock().len()
    }

    /// Stop following the bus. The last count is kept.
    pub fn detach(&mut self) {
        for sub in self.subscriptions.drain(..) {
            sub.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}

impl Drop for PendingCountView {
    fn drop(&mut self) {
        self.detach();
    }
}

pub(crate) fn subscribe(bus: &EventBus, state: &Arc<Mutex<PendingSet>>) -> Vec<Subscription> {
    let on_created = Arc::clone(state);
    let on_updated = Arc::clone(state);
    vec![
        bus.on_alert_created(move |alert| {
            on_created.lock().observe(alert);
            Ok(())
        }),
        bus.on_alert_updated(move |alert| {
            on_updated.lock().observe(alert);
            Ok(())
        }),
    ]
}
