// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Alerts raised for unsafe inspections and the store that owns their
//! lifecycle

mod store;

pub use store::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MonitorError, Result};
use crate::inspection::{DefectType, InspectionRecord};

/// Alert lifecycle state.
///
/// ```text
/// Pending ──► Acknowledged ──► Resolved
///    └──────────────────────────▲
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertStatus {
    Pending,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    /// Whether the lifecycle permits moving from `self` to `next`
    pub fn can_transition_to(self, next: AlertStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Acknowledged)
                | (Self::Pending, Self::Resolved)
                | (Self::Acknowledged, Self::Resolved)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Resolved
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Acknowledged => write!(f, "Acknowledged"),
            Self::Resolved => write!(f, "Resolved"),
        }
    }
}

/// A required operator response to one unsafe inspection. Carries a
/// snapshot of the inspection taken when the alert was raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub alert_id: String,
    pub inspection_id: String,
    pub alert_date: DateTime<Utc>,
    pub status: AlertStatus,

    /// Overdue flag, only meaningful while pending
    pub escalated: bool,

    /// Set once, on acknowledgment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<u32>,

    /// Set once, on acknowledgment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,

    pub summary: String,
    pub location: String,
    pub camera_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    pub defect_types: Vec<DefectType>,
    pub confidence: f64,
    pub image_urls: Vec<String>,
}

impl Alert {
    /// Derive the alert for an unsafe inspection. The new alert is always
    /// pending and not escalated.
    pub fn from_inspection(inspection: &InspectionRecord, alert_id: impl Into<String>) -> Result<Self> {
        if !inspection.is_unsafe() {
            return Err(MonitorError::validation(format!(
                "inspection {} is safe; alerts are only raised for unsafe inspections",
                inspection.inspection_id
            )));
        }
        if inspection.defect_types.is_empty() {
            return Err(MonitorError::validation(format!(
                "unsafe inspection {} lists no defects",
                inspection.inspection_id
            )));
        }

        Ok(Self {
            alert_id: alert_id.into(),
            inspection_id: inspection.inspection_id.clone(),
            alert_date: inspection.timestamp,
            status: AlertStatus::Pending,
            escalated: false,
            operator_id: None,
            response_time_ms: None,
            summary: summarize(&inspection.defect_types),
            location: inspection.location.clone(),
            camera_id: inspection.camera_id.clone(),
            license_plate: inspection.license_plate.clone(),
            defect_types: inspection.defect_types.clone(),
            confidence: inspection.confidence,
            image_urls: inspection.image_urls.clone(),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == AlertStatus::Pending
    }
}

fn summarize(defects: &[DefectType]) -> String {
    let labels: Vec<&str> = defects.iter().map(DefectType::label).collect();
    format!("Unsafe tire detected - {}", labels.join(", "))
}
