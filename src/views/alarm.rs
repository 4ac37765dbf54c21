// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! New-alert notifications and the audible alarm

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{EventBus, Subscription};
use crate::db::SettingsStore;

/// Notifications kept before the oldest are dropped
pub const NOTIFICATION_CAPACITY: usize = 50;

/// Raised once per `alert.created`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub alert_id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    /// Whether the alarm sounded for this alert
    pub audible: bool,
    pub raised_at: DateTime<Utc>,
}

/// Turns every new alert into a notification and sounds the alarm when
/// the current settings allow it. Settings are read per alert, so muting
/// takes effect for the next one.
pub struct AlarmNotifier {
    notifications: Arc<RwLock<Vec<Notification>>>,
    alarms: Arc<AtomicU64>,
    subscription: Option<Subscription>,
}

impl AlarmNotifier {
    pub fn attach(bus: &EventBus, settings: Arc<SettingsStore>) -> Self {
        let notifications = Arc::new(RwLock::new(Vec::<Notification>::new()));
        let alarms = Arc::new(AtomicU64::new(0));

        let list = Arc::clone(&notifications);
        let sounded = Arc::clone(&alarms);
        let subscription = bus.on_alert_created(move |alert| {
            let audible = settings.get().alarm_audible();
            warn!(
                alert_id = %alert.alert_id,
                location = %alert.location,
                audible,
                "New Alert! {}",
                alert.summary
            );
            if audible {
                sounded.fetch_add(1, Ordering::Relaxed);
            }

            let mut list = list.write();
            list.insert(
                0,
                Notification {
                    alert_id: alert.alert_id.clone(),
                    title: "New Alert!".to_string(),
                    description: alert.summary.clone(),
                    location: alert.location.clone(),
                    audible,
                    raised_at: Utc::now(),
                },
            );
            list.truncate(NOTIFICATION_CAPACITY);
            Ok(())
        });

        Self {
            notifications,
            alarms,
            subscription: Some(subscription),
        }
    }

    /// Notifications, newest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.read().clone()
    }

    /// Times the alarm has sounded
    pub fn alarm_count(&self) -> u64 {
        self.alarms.load(Ordering::Relaxed)
    }

    pub fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

impl Drop for AlarmNotifier {
    fn drop(&mut self) {
        self.detach();
    }
}
