// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Dashboard statistics and report aggregation over the inspection ledger

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};
use crate::inspection::{DefectType, InspectionRecord, InspectionStatus, SITES};

/// Days covered by a trend report
pub const TREND_DAYS: i64 = 7;

/// Longest range a daily report will bucket
pub const MAX_REPORT_DAYS: i64 = 366;

/// Headline figures for one UTC day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_inspections: usize,
    pub safe_count: usize,
    pub unsafe_count: usize,
    pub avg_processing_latency_ms: u64,
    pub alerts_pending: usize,
}

impl DashboardStats {
    /// Stats for inspections captured on `day`. `alerts_pending` comes from
    /// the alert store.
    pub fn compute<'a, I>(records: I, day: NaiveDate, alerts_pending: usize) -> Self
    where
        I: IntoIterator<Item = &'a InspectionRecord>,
    {
        let mut stats = Self {
            alerts_pending,
            ..Self::default()
        };
        let mut latency_sum = 0u64;

        for record in records.into_iter().filter(|r| r.timestamp.date_naive() == day) {
            stats.total_inspections += 1;
            latency_sum += record.processing_duration_ms;
            match record.status {
                InspectionStatus::Safe => stats.safe_count += 1,
                InspectionStatus::Unsafe => stats.unsafe_count += 1,
            }
        }

        if stats.total_inspections > 0 {
            let avg = latency_sum as f64 / stats.total_inspections as f64;
            stats.avg_processing_latency_ms = avg.round() as u64;
        }
        stats
    }
}

/// Report flavours offered by the reports page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Per day, the last seven days of the range
    Trend,
    /// Count per defect type
    Defects,
    /// Per site, split safe / unsafe
    Locations,
    /// Per day across the whole range
    Daily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
}

/// One bar / slice of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    pub value: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<usize>,
    #[serde(rename = "unsafe", default, skip_serializing_if = "Option::is_none")]
    pub unsafe_count: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total: usize,
    pub safe: usize,
    #[serde(rename = "unsafe")]
    pub unsafe_count: usize,
    pub avg_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub charts_data: Vec<ChartDataPoint>,
    pub summary: ReportSummary,
}

impl ReportRequest {
    pub fn new(kind: ReportKind, date_from: DateTime<Utc>, date_to: DateTime<Utc>) -> Self {
        Self {
            kind,
            date_from,
            date_to,
        }
    }

    /// Aggregate `records` that fall inside `[date_from, date_to]`
    pub fn generate<'a, I>(&self, records: I) -> Result<Report>
    where
        I: IntoIterator<Item = &'a InspectionRecord>,
    {
        if self.date_from > self.date_to {
            return Err(MonitorError::validation(format!(
                "report range is inverted: {} > {}",
                self.date_from, self.date_to
            )));
        }

        let in_range: Vec<&InspectionRecord> = records
            .into_iter()
            .filter(|r| r.timestamp >= self.date_from && r.timestamp <= self.date_to)
            .collect();

        let last_day = self.date_to.date_naive();
        let charts_data = match self.kind {
            ReportKind::Trend => {
                let first_day =
                    (last_day - Duration::days(TREND_DAYS - 1)).max(self.date_from.date_naive());
                per_day(&in_range, first_day, last_day)
            }
            ReportKind::Daily => {
                let first_day = self.date_from.date_naive();
                if (last_day - first_day).num_days() >= MAX_REPORT_DAYS {
                    return Err(MonitorError::validation(format!(
                        "daily reports cover at most {} days",
                        MAX_REPORT_DAYS
                    )));
                }
                per_day(&in_range, first_day, last_day)
            }
            ReportKind::Defects => per_defect(&in_range),
            ReportKind::Locations => per_location(&in_range),
        };

        Ok(Report {
            charts_data,
            summary: summarize(&in_range),
        })
    }
}

fn per_day(records: &[&InspectionRecord], first: NaiveDate, last: NaiveDate) -> Vec<ChartDataPoint> {
    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| {
            let (safe, unsafe_count) = split(records.iter().filter(|r| r.timestamp.date_naive() == day));
            ChartDataPoint {
                name: day.format("%a, %b %-d").to_string(),
                value: safe + unsafe_count,
                safe: Some(safe),
                unsafe_count: Some(unsafe_count),
            }
        })
        .collect()
}

fn per_defect(records: &[&InspectionRecord]) -> Vec<ChartDataPoint> {
    DefectType::ALL
        .iter()
        .map(|defect| ChartDataPoint {
            name: defect.label().to_string(),
            value: records
                .iter()
                .filter(|r| r.defect_types.contains(defect))
                .count(),
            safe: None,
            unsafe_count: None,
        })
        .collect()
}

fn per_location(records: &[&InspectionRecord]) -> Vec<ChartDataPoint> {
    SITES
        .iter()
        .map(|(location, _)| {
            let (safe, unsafe_count) = split(records.iter().filter(|r| r.location == *location));
            ChartDataPoint {
                name: site_name(location).to_string(),
                value: safe + unsafe_count,
                safe: Some(safe),
                unsafe_count: Some(unsafe_count),
            }
        })
        .collect()
}

/// Road name without the checkpoint suffix
fn site_name(location: &str) -> &str {
    location.split(" - ").next().unwrap_or(location)
}

fn split<'a, 'b: 'a>(records: impl Iterator<Item = &'a &'b InspectionRecord>) -> (usize, usize) {
    records.fold((0, 0), |(safe, unsafe_count), r| match r.status {
        InspectionStatus::Safe => (safe + 1, unsafe_count),
        InspectionStatus::Unsafe => (safe, unsafe_count + 1),
    })
}

fn summarize(records: &[&InspectionRecord]) -> ReportSummary {
    let (safe, unsafe_count) = split(records.iter());
    let avg_confidence = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| r.confidence).sum::<f64>() / records.len() as f64
    };
    ReportSummary {
        total: records.len(),
        safe,
        unsafe_count,
        avg_confidence,
    }
}
