// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Live alert list

use std::sync::Arc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::alerts::{Alert, AlertStatus, AlertStore};
use crate::core::{EventBus, Subscription};

/// Which alerts a list shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertScope {
    All,
    Status(AlertStatus),
}

impl AlertScope {
    pub fn status(self) -> Option<AlertStatus> {
        match self {
            Self::All => None,
            Self::Status(status) => Some(status),
        }
    }

    /// New alerts are always pending, so only these scopes grow on create
    pub fn accepts_new(self) -> bool {
        matches!(self, Self::All | Self::Status(AlertStatus::Pending))
    }
}

/// Alert list kept in step with the bus. New alerts are prepended when the
/// scope admits them; updates replace the matching entry in place without
/// reordering.
pub struct AlertListView {
    scope: AlertScope,
    alerts: Arc<RwLock<Vec<Alert>>>,
    subscriptions: Vec<Subscription>,
}

impl AlertListView {
    pub fn attach(bus: &EventBus, store: &AlertStore, scope: AlertScope) -> Self {
        let alerts = Arc::new(RwLock::new(Vec::<Alert>::new()));

        let on_created = Arc::clone(&alerts);
        let on_updated = Arc::clone(&alerts);
        let mut subscriptions = vec![bus.on_alert_updated(move |alert| {
            let mut list = on_updated.write();
            if let Some(slot) = list.iter_mut().find(|a| a.alert_id == alert.alert_id) {
                *slot = alert.clone();
            }
            Ok(())
        })];
        if scope.accepts_new() {
            subscriptions.push(bus.on_alert_created(move |alert| {
                let mut list = on_created.write();
                if !list.iter().any(|a| a.alert_id == alert.alert_id) {
                    list.insert(0, alert.clone());
                }
                Ok(())
            }));
        }

        {
            let mut list = alerts.write();
            let live = std::mem::take(&mut *list);
            let mut snapshot = store.query(scope.status());
            // Anything the handlers saw first is newer than the snapshot copy
            for alert in live.into_iter().rev() {
                match snapshot.iter_mut().find(|a| a.alert_id == alert.alert_id) {
                    Some(slot) => *slot = alert,
                    None => snapshot.insert(0, alert),
                }
            }
            *list = snapshot;
        }

        Self {
            scope,
            alerts,
            subscriptions,
        }
    }

    pub fn scope(&self) -> AlertScope {
        self.scope
    }

    /// Current list contents, top first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.read().clone()
    }

    pub fn ids(&self) -> Vec<String> {
        self.alerts.read().iter().map(|a| a.alert_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }

    pub fn detach(&mut self) {
        for sub in self.subscriptions.drain(..) {
            sub.unsubscribe();
        }
    }
}

impl Drop for AlertListView {
    fn drop(&mut self) {
        self.detach();
    }
}
