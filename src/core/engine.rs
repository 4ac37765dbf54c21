// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Main monitoring engine - owns the ledgers, the live feed and the
//! collaborators around them

use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};
use anyhow::Result;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{EventBus, Scheduler, SystemState};
use crate::alerts::{Alert, AlertStatus, AlertStore};
use crate::config::Config;
use crate::db::{Database, SettingsStore, SystemSettings};
use crate::error::{self, MonitorError};
use crate::feed::{Ingested, InspectionPipeline, RealtimeSimulator};
use crate::inspection::{InspectionGenerator, InspectionLedger, InspectionQuery, InspectionRecord, Page};
use crate::reports::{DashboardStats, Report, ReportRequest};
use crate::security::{AuditAction, AuditLog, Operator, OperatorDirectory};
use crate::views::{AlarmNotifier, AlertListView, AlertScope, DashboardView, InspectionFeedView, PendingCountView};

/// Seeded history is spread over the previous day
const SEED_WINDOW_DAYS: i64 = 1;

const ESCALATION_TASK: &str = "escalation";

/// Main ATIS engine
pub struct Engine {
    pub config: Arc<Config>,
    event_bus: Arc<EventBus>,
    ledger: Arc<InspectionLedger>,
    alerts: Arc<AlertStore>,
    pipeline: Arc<InspectionPipeline>,
    simulator: RealtimeSimulator,
    scheduler: Scheduler,
    directory: Arc<OperatorDirectory>,
    audit: Arc<AuditLog>,
    settings: Arc<SettingsStore>,
    start_time: Mutex<Option<Instant>>,
}

impl Engine {
    /// Engine whose settings live only in memory
    pub fn new(config: Config) -> Result<Self> {
        Self::with_database(config, Arc::new(Database::open_in_memory()?))
    }

    pub fn with_database(config: Config, db: Arc<Database>) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let event_bus = Arc::new(EventBus::new());
        let ledger = Arc::new(InspectionLedger::new(config.simulator.ledger_capacity));
        let alerts = Arc::new(AlertStore::new(Arc::clone(&event_bus)));
        let pipeline = Arc::new(InspectionPipeline::new(
            InspectionGenerator::new(&config.simulator)?,
            Arc::clone(&ledger),
            Arc::clone(&alerts),
            Arc::clone(&event_bus),
        ));
        let simulator = RealtimeSimulator::new(Arc::clone(&pipeline), config.simulator.clone());

        let engine = Self {
            event_bus,
            ledger,
            alerts,
            pipeline,
            simulator,
            scheduler: Scheduler::new(),
            directory: Arc::new(OperatorDirectory::seeded()),
            audit: Arc::new(AuditLog::new()),
            settings: Arc::new(SettingsStore::open(db)?),
            start_time: Mutex::new(None),
            config,
        };

        let seeded = engine.seed_history(engine.config.simulator.seed_inspections)?;
        info!(
            inspections = seeded,
            alerts = engine.alerts.len(),
            pending = engine.alerts.pending_count(),
            "Seeded inspection history"
        );
        Ok(engine)
    }

    /// Backfill the ledgers with inspections from the previous day. Each
    /// seeded alert is then left pending, acknowledged, or acknowledged and
    /// resolved through the regular transitions.
    fn seed_history(&self, count: usize) -> error::Result<usize> {
        let mut records: Vec<InspectionRecord> = self.pipeline.with_generator(|g| {
            (0..count).map(|_| g.generate_backdated(Duration::days(SEED_WINDOW_DAYS))).collect()
        });
        // Oldest first, so the newest ends up at the front of the ledger
        records.sort_by_key(|r| r.timestamp);

        for record in records {
            if let Some(alert) = self.pipeline.ingest(record)?.alert {
                self.settle_seeded(&alert)?;
            }
        }
        Ok(count)
    }

    fn settle_seeded(&self, alert: &Alert) -> error::Result<()> {
        let (outcome, operator_id, response_ms) = self
            .pipeline
            .with_generator(|g| (g.roll(0..3), g.roll(1..6), g.roll(5_000..50_000)));
        if outcome == 0 {
            return Ok(());
        }

        let acknowledged_at = alert.alert_date + Duration::milliseconds(i64::from(response_ms));
        self.alerts.acknowledge_at(&alert.alert_id, operator_id, acknowledged_at)?;
        if outcome == 2 {
            self.alerts.resolve(&alert.alert_id)?;
        }
        Ok(())
    }

    /// Start the live feed and, if enabled, the escalation sweep. Must be
    /// called from within a tokio runtime.
    pub fn start(&self) -> Result<()> {
        info!("Starting ATIS engine...");
        self.simulator.start()?;

        if self.config.escalation.enabled {
            let alerts = Arc::clone(&self.alerts);
            let settings = Arc::clone(&self.settings);
            self.scheduler.schedule_every(
                ESCALATION_TASK,
                StdDuration::from_secs(self.config.escalation.sweep_interval_secs),
                move || {
                    let timeout = settings.get().acknowledgment_timeout();
                    let escalated = alerts.escalate_overdue(Utc::now(), timeout);
                    if !escalated.is_empty() {
                        info!(count = escalated.len(), "Escalated overdue alerts");
                    }
                },
            )?;
        }

        *self.start_time.lock() = Some(Instant::now());
        info!("ATIS engine started");
        Ok(())
    }

    pub fn stop(&self) {
        info!("Stopping ATIS engine...");
        self.simulator.stop();
        self.scheduler.cancel_all();
        info!("ATIS engine stopped");
    }

    /// Produce one inspection immediately, outside the simulator cadence
    pub fn generate_inspection(&self) -> error::Result<Ingested> {
        self.pipeline.tick()
    }

    /// Acknowledge on behalf of an enabled operator and record it in the
    /// audit trail
    pub fn acknowledge_alert(&self, alert_id: &str, operator_id: u32) -> error::Result<Alert> {
        let operator = self.active_operator(operator_id)?;
        let alert = self.alerts.acknowledge(alert_id, operator_id)?;
        self.audit.record(
            operator.operator_id,
            &operator.name,
            AuditAction::AlertAcknowledged,
            format!("Alert {} acknowledged", alert.alert_id),
        );
        Ok(alert)
    }

    pub fn resolve_alert(&self, alert_id: &str, operator_id: u32) -> error::Result<Alert> {
        let operator = self.active_operator(operator_id)?;
        let alert = self.alerts.resolve(alert_id)?;
        self.audit.record(
            operator.operator_id,
            &operator.name,
            AuditAction::AlertResolved,
            format!("Alert {} resolved", alert.alert_id),
        );
        Ok(alert)
    }

    fn active_operator(&self, operator_id: u32) -> error::Result<Operator> {
        if operator_id == 0 {
            return Err(MonitorError::validation("operator id must be positive"));
        }
        let operator = self.directory.get(operator_id)?;
        if !operator.enabled {
            return Err(MonitorError::validation(format!(
                "operator {} is disabled",
                operator_id
            )));
        }
        Ok(operator)
    }

    /// Flip an operator account on or off, audited under `actor`
    pub fn toggle_operator(&self, actor: &Operator, operator_id: u32) -> error::Result<Operator> {
        let updated = self.directory.toggle_enabled(operator_id)?;
        let action = if updated.enabled {
            AuditAction::UserEnabled
        } else {
            AuditAction::UserDisabled
        };
        let verb = if updated.enabled { "enabled" } else { "disabled" };
        self.audit.record(
            actor.operator_id,
            &actor.name,
            action,
            format!("User {} {}", updated.email, verb),
        );
        Ok(updated)
    }

    /// Replace the system settings, audited under `actor`
    pub fn update_settings(&self, actor: &Operator, settings: SystemSettings) -> Result<SystemSettings> {
        let previous = self.settings.get();
        let updated = self.settings.replace(settings)?;
        if previous.alert_acknowledgment_timeout_secs != updated.alert_acknowledgment_timeout_secs {
            self.audit.record(
                actor.operator_id,
                &actor.name,
                AuditAction::SettingsUpdated,
                format!(
                    "Alert timeout changed to {}s",
                    updated.alert_acknowledgment_timeout_secs
                ),
            );
        } else {
            self.audit.record(
                actor.operator_id,
                &actor.name,
                AuditAction::SettingsUpdated,
                "System settings updated",
            );
        }
        Ok(updated)
    }

    /// Today's headline figures
    pub fn dashboard_stats(&self) -> DashboardStats {
        let today = Utc::now().date_naive();
        self.ledger
            .with_records_ref(|records| DashboardStats::compute(records, today, self.alerts.pending_count()))
    }

    pub fn query_inspections(&self, query: &InspectionQuery) -> error::Result<Page<InspectionRecord>> {
        self.ledger
            .with_records_ref(|records| query.execute(records, self.config.query.default_page_size))
    }

    pub fn inspection(&self, inspection_id: &str) -> error::Result<InspectionRecord> {
        self.ledger
            .get(inspection_id)
            .ok_or_else(|| MonitorError::not_found("inspection", inspection_id))
    }

    pub fn alerts(&self, status: Option<AlertStatus>) -> Vec<Alert> {
        self.alerts.query(status)
    }

    pub fn report(&self, request: &ReportRequest) -> error::Result<Report> {
        self.ledger.with_records_ref(|records| request.generate(records))
    }

    pub fn pending_count_view(&self) -> PendingCountView {
        PendingCountView::attach(&self.event_bus, &self.alerts)
    }

    pub fn alert_list_view(&self, scope: AlertScope) -> AlertListView {
        AlertListView::attach(&self.event_bus, &self.alerts, scope)
    }

    pub fn inspection_feed_view(&self) -> InspectionFeedView {
        InspectionFeedView::attach(&self.event_bus, &self.ledger, self.config.views.feed_window)
    }

    pub fn alarm_notifier(&self) -> AlarmNotifier {
        AlarmNotifier::attach(&self.event_bus, Arc::clone(&self.settings))
    }

    pub fn dashboard_view(&self) -> DashboardView {
        DashboardView::attach(&self.event_bus, &self.ledger, &self.alerts)
    }

    pub fn state(&self) -> SystemState {
        SystemState {
            running: self.start_time.lock().is_some() && self.simulator.is_running(),
            simulator_running: self.simulator.is_running(),
            inspections_retained: self.ledger.len(),
            alerts_total: self.alerts.len(),
            alerts_pending: self.alerts.pending_count(),
            events_published: self.event_bus.published_count(),
            uptime_seconds: self.uptime(),
            last_inspection: self.ledger.with_records_ref(|r| r.front().map(|i| i.timestamp)),
        }
    }

    pub fn uptime(&self) -> u64 {
        self.start_time.lock().map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn ledger(&self) -> &Arc<InspectionLedger> {
        &self.ledger
    }

    pub fn alert_store(&self) -> &Arc<AlertStore> {
        &self.alerts
    }

    pub fn simulator(&self) -> &RealtimeSimulator {
        &self.simulator
    }

    pub fn directory(&self) -> &Arc<OperatorDirectory> {
        &self.directory
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
        debug!("Engine dropped");
    }
}
