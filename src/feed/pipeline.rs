// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Inspection ingest: ledger append, `inspection.created`, and alert
//! derivation for unsafe results

use std::sync::Arc;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::alerts::{Alert, AlertStore};
use crate::core::{Event, EventBus};
use crate::error::{MonitorError, Result};
use crate::inspection::{InspectionGenerator, InspectionLedger, InspectionRecord};

/// Outcome of admitting one inspection
#[derive(Debug, Clone)]
pub struct Ingested {
    pub inspection: InspectionRecord,
    pub alert: Option<Alert>,
}

/// Shared path used by the simulator, manual generation and history
/// seeding
pub struct InspectionPipeline {
    generator: Mutex<InspectionGenerator>,
    ledger: Arc<InspectionLedger>,
    alerts: Arc<AlertStore>,
    event_bus: Arc<EventBus>,
}

impl InspectionPipeline {
    pub fn new(
        generator: InspectionGenerator,
        ledger: Arc<InspectionLedger>,
        alerts: Arc<AlertStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            generator: Mutex::new(generator),
            ledger,
            alerts,
            event_bus,
        }
    }

    /// Generate an inspection captured now and ingest it
    pub fn tick(&self) -> Result<Ingested> {
        let record = self.generator.lock().generate();
        self.ingest(record)
    }

    /// Admit `record` to the ledger and publish it. Unsafe records get
    /// their alert raised in the same call.
    pub fn ingest(&self, record: InspectionRecord) -> Result<Ingested> {
        record.validate()?;
        if self.ledger.contains(&record.inspection_id) {
            return Err(MonitorError::validation(format!(
                "inspection {} already recorded",
                record.inspection_id
            )));
        }
        // Refuse before anything is recorded, so a failed ingest leaves no trace
        let alert_id = if record.is_unsafe() {
            if let Some(existing) = self.alerts.find_by_inspection(&record.inspection_id) {
                return Err(MonitorError::validation(format!(
                    "inspection {} already has alert {}",
                    record.inspection_id, existing.alert_id
                )));
            }
            Some(self.generator.lock().draw_id("ALT", record.timestamp))
        } else {
            None
        };

        if let Some(evicted) = self.ledger.push(record.clone()) {
            trace!(inspection_id = %evicted.inspection_id, "Ledger full, dropped oldest");
        }
        debug!(
            inspection_id = %record.inspection_id,
            status = %record.status,
            location = %record.location,
            "Inspection recorded"
        );
        self.event_bus.publish(Event::InspectionCreated(record.clone()));

        let alert = match alert_id {
            Some(alert_id) => Some(self.alerts.create_for_inspection(&record, &alert_id)?),
            None => None,
        };

        Ok(Ingested {
            inspection: record,
            alert,
        })
    }

    /// Run `f` with exclusive use of the generator
    pub fn with_generator<R>(&self, f: impl FnOnce(&mut InspectionGenerator) -> R) -> R {
        f(&mut self.generator.lock())
    }

    pub fn ledger(&self) -> &Arc<InspectionLedger> {
        &self.ledger
    }

    pub fn alerts(&self) -> &Arc<AlertStore> {
        &self.alerts
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}
