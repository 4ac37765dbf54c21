// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Authoritative alert ledger and transition logic.
//!
//! Every mutation checks its precondition and writes under one write lock,
//! so concurrent callers can never interleave on the same alert. Events are
//! published after the lock is released; handlers are free to query the
//! store.

use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use super::{Alert, AlertStatus};
use crate::core::{Event, EventBus};
use crate::error::{MonitorError, Result};
use crate::inspection::InspectionRecord;

/// In-memory alert ledger, newest first
pub struct AlertStore {
    alerts: RwLock<Vec<Alert>>,
    event_bus: Arc<EventBus>,
}

impl AlertStore {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self::with_alerts(Vec::new(), event_bus)
    }

    /// Store preloaded with `alerts`, given newest first
    pub fn with_alerts(alerts: Vec<Alert>, event_bus: Arc<EventBus>) -> Self {
        Self {
            alerts: RwLock::new(alerts),
            event_bus,
        }
    }

    /// Raise the alert for an unsafe inspection and publish `alert.created`.
    /// At most one alert may ever exist per inspection.
    pub fn create_for_inspection(&self, inspection: &InspectionRecord, alert_id: &str) -> Result<Alert> {
        let alert = Alert::from_inspection(inspection, alert_id)?;

        {
            let mut alerts = self.alerts.write();
            if alerts.iter().any(|a| a.alert_id == alert.alert_id) {
                return Err(MonitorError::validation(format!(
                    "alert id {} already in use",
                    alert.alert_id
                )));
            }
            if alerts.iter().any(|a| a.inspection_id == alert.inspection_id) {
                return Err(MonitorError::validation(format!(
                    "inspection {} already has an alert",
                    alert.inspection_id
                )));
            }
            alerts.insert(0, alert.clone());
        }

        info!(
            alert_id = %alert.alert_id,
            inspection_id = %alert.inspection_id,
            location = %alert.location,
            "Alert raised: {}", alert.summary
        );
        self.event_bus.publish(Event::AlertCreated(alert.clone()));
        Ok(alert)
    }

    /// Acknowledge a pending alert on behalf of `operator_id`
    pub fn acknowledge(&self, alert_id: &str, operator_id: u32) -> Result<Alert> {
        self.acknowledge_at(alert_id, operator_id, Utc::now())
    }

    /// Acknowledge with an explicit clock reading
    pub fn acknowledge_at(&self, alert_id: &str, operator_id: u32, now: DateTime<Utc>) -> Result<Alert> {
        if operator_id == 0 {
            return Err(MonitorError::validation("operator id must be positive"));
        }

        let updated = self.transition(alert_id, AlertStatus::Acknowledged, "acknowledge", |alert| {
            let elapsed = (now - alert.alert_date).num_milliseconds().max(0);
            alert.operator_id = Some(operator_id);
            alert.response_time_ms = Some(elapsed as u64);
            alert.escalated = false;
        })?;

        info!(
            alert_id = %updated.alert_id,
            operator_id,
            response_time_ms = ?updated.response_time_ms,
            "Alert acknowledged"
        );
        self.event_bus.publish(Event::AlertUpdated(updated.clone()));
        Ok(updated)
    }

    /// Resolve a pending or acknowledged alert. Acknowledgment details, if
    /// any, are kept as they are.
    pub fn resolve(&self, alert_id: &str) -> Result<Alert> {
        let updated = self.transition(alert_id, AlertStatus::Resolved, "resolve", |_| {})?;

        info!(alert_id = %updated.alert_id, "Alert resolved");
        self.event_bus.publish(Event::AlertUpdated(updated.clone()));
        Ok(updated)
    }

    fn transition(
        &self,
        alert_id: &str,
        next: AlertStatus,
        operation: &'static str,
        apply: impl FnOnce(&mut Alert),
    ) -> Result<Alert> {
        if alert_id.is_empty() {
            return Err(MonitorError::validation("alert id is empty"));
        }

        let mut alerts = self.alerts.write();
        let alert = alerts
            .iter_mut()
            .find(|a| a.alert_id == alert_id)
            .ok_or_else(|| MonitorError::not_found("alert", alert_id))?;

        if !alert.status.can_transition_to(next) {
            return Err(MonitorError::InvalidState {
                id: alert_id.to_string(),
                current: alert.status.to_string(),
                operation,
            });
        }

        alert.status = next;
        apply(alert);
        Ok(alert.clone())
    }

    /// Flag every pending alert older than `timeout` as escalated. Returns
    /// the alerts that changed; each one is published as `alert.updated`.
    pub fn escalate_overdue(&self, now: DateTime<Utc>, timeout: Duration) -> Vec<Alert> {
        let escalated: Vec<Alert> = {
            let mut alerts = self.alerts.write();
            alerts
                .iter_mut()
                .filter(|a| a.is_pending() && !a.escalated && now - a.alert_date > timeout)
                .map(|a| {
                    a.escalated = true;
                    a.clone()
                })
                .collect()
        };

        for alert in &escalated {
            debug!(alert_id = %alert.alert_id, "Alert escalated");
            self.event_bus.publish(Event::AlertUpdated(alert.clone()));
        }
        escalated
    }

    pub fn get(&self, alert_id: &str) -> Option<Alert> {
        self.alerts.read().iter().find(|a| a.alert_id == alert_id).cloned()
    }

    pub fn find_by_inspection(&self, inspection_id: &str) -> Option<Alert> {
        self.alerts
            .read()
            .iter()
            .find(|a| a.inspection_id == inspection_id)
            .cloned()
    }

    /// All alerts, optionally restricted to one status, newest first
    pub fn query(&self, status: Option<AlertStatus>) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .read()
            .iter()
            .filter(|a| status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.alert_date.cmp(&a.alert_date));
        alerts
    }

    pub fn pending_count(&self) -> usize {
        self.alerts.read().iter().filter(|a| a.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}
