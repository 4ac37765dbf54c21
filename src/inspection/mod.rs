// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Inspection records, the synthetic generator, the capped ledger and the
//! read-only query layer over it

mod generator;
mod ledger;
mod query;

pub use generator::*;
pub use ledger::*;
pub use query::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{MonitorError, Result};

/// Safety verdict of one inspection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionStatus {
    Safe,
    Unsafe,
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Unsafe => write!(f, "Unsafe"),
        }
    }
}

/// Tire defect taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DefectType {
    #[serde(rename = "Tread Wear")]
    TreadWear,
    #[serde(rename = "Sidewall Damage")]
    SidewallDamage,
    Puncture,
    Bulge,
    Cracking,
    #[serde(rename = "Under-inflation")]
    UnderInflation,
    #[serde(rename = "Over-inflation")]
    OverInflation,
    #[serde(rename = "Uneven Wear")]
    UnevenWear,
}

impl DefectType {
    /// Every defect in taxonomy order
    pub const ALL: [DefectType; 8] = [
        DefectType::TreadWear,
        DefectType::SidewallDamage,
        DefectType::Puncture,
        DefectType::Bulge,
        DefectType::Cracking,
        DefectType::UnderInflation,
        DefectType::OverInflation,
        DefectType::UnevenWear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::TreadWear => "Tread Wear",
            Self::SidewallDamage => "Sidewall Damage",
            Self::Puncture => "Puncture",
            Self::Bulge => "Bulge",
            Self::Cracking => "Cracking",
            Self::UnderInflation => "Under-inflation",
            Self::OverInflation => "Over-inflation",
            Self::UnevenWear => "Uneven Wear",
        }
    }
}

impl fmt::Display for DefectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One completed inspection pass. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    pub inspection_id: String,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub camera_id: String,

    /// Absent when plate capture failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,

    pub status: InspectionStatus,

    /// Non-empty exactly when `status` is `Unsafe`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defect_types: Vec<DefectType>,

    /// Classifier confidence in [0, 1]
    pub confidence: f64,
    pub image_urls: Vec<String>,
    pub processing_duration_ms: u64,
}

impl InspectionRecord {
    pub fn is_unsafe(&self) -> bool {
        self.status == InspectionStatus::Unsafe
    }

    /// Check the structural invariants a record must satisfy before it is
    /// admitted to the ledger
    pub fn validate(&self) -> Result<()> {
        if self.inspection_id.is_empty() {
            return Err(MonitorError::validation("inspection id is empty"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(MonitorError::validation(format!(
                "confidence {} outside [0, 1]",
                self.confidence
            )));
        }
        if self.image_urls.is_empty() {
            return Err(MonitorError::validation("inspection has no images"));
        }
        match (self.status, self.defect_types.is_empty()) {
            (InspectionStatus::Unsafe, true) => Err(MonitorError::validation(
                "unsafe inspection must list at least one defect",
            )),
            (InspectionStatus::Safe, false) => Err(MonitorError::validation(
                "safe inspection must not list defects",
            )),
            _ => Ok(()),
        }
    }
}
