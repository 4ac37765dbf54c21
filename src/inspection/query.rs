// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Stateless filter / sort / paginate over inspection records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{InspectionRecord, InspectionStatus};
use crate::error::{MonitorError, Result};

/// Filter and paging parameters. Every filter is optional; `page` is
/// 1-indexed and `page_size` falls back to the caller's default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectionQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub plate: Option<String>,
    pub status: Option<InspectionStatus>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// One page of results plus the pre-pagination match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }
}

impl InspectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn plate(mut self, plate: impl Into<String>) -> Self {
        self.plate = Some(plate.into());
        self
    }

    pub fn status(mut self, status: InspectionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    fn check(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(MonitorError::validation(format!(
                    "time range is inverted: {} > {}",
                    from, to
                )));
            }
        }
        if self.page == Some(0) {
            return Err(MonitorError::validation("page numbers start at 1"));
        }
        if self.page_size == Some(0) {
            return Err(MonitorError::validation("page size must be positive"));
        }
        Ok(())
    }

    /// Whether a single record passes every filter
    pub fn matches(&self, record: &InspectionRecord) -> bool {
        if self.from.is_some_and(|from| record.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.timestamp > to) {
            return false;
        }
        if self.status.is_some_and(|status| record.status != status) {
            return false;
        }
        match self.plate.as_deref().filter(|p| !p.is_empty()) {
            Some(needle) => record
                .license_plate
                .as_deref()
                .is_some_and(|plate| plate.to_lowercase().contains(&needle.to_lowercase())),
            None => true,
        }
    }

    /// Apply the query to `records`, newest first
    pub fn execute<'a, I>(&self, records: I, default_page_size: usize) -> Result<Page<InspectionRecord>>
    where
        I: IntoIterator<Item = &'a InspectionRecord>,
    {
        self.check()?;

        let mut matched: Vec<&InspectionRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(default_page_size).max(1);
        let total = matched.len();
        let start = (page - 1).saturating_mul(page_size);

        let items = matched
            .into_iter()
            .skip(start)
            .take(page_size)
            .cloned()
            .collect();

        Ok(Page {
            items,
            total,
            page,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::DefectType;
    use chrono::Duration;

    fn record(id: &str, minutes_ago: i64, plate: Option<&str>, status: InspectionStatus) -> InspectionRecord {
        InspectionRecord {
            inspection_id: id.to_string(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            location: "Route 66 East - Checkpoint A".to_string(),
            camera_id: "CAM-003".to_string(),
            license_plate: plate.map(str::to_string),
            status,
            defect_types: match status {
                InspectionStatus::Unsafe => vec![DefectType::Puncture],
                InspectionStatus::Safe => vec![],
            },
            confidence: 0.8,
            image_urls: vec!["img".to_string()],
            processing_duration_ms: 180,
        }
    }

    fn sample() -> Vec<InspectionRecord> {
        vec![
            record("a", 30, Some("ABC-1234"), InspectionStatus::Safe),
            record("b", 10, Some("abc-1234"), InspectionStatus::Unsafe),
            record("c", 5, Some("XABC-12345"), InspectionStatus::Safe),
            record("d", 1, None, InspectionStatus::Safe),
            record("e", 20, Some("ZZZ-0000"), InspectionStatus::Safe),
        ]
    }

    #[test]
    fn test_status_and_plate_filter() {
        let records = sample();
        let page = InspectionQuery::new()
            .status(InspectionStatus::Safe)
            .plate("ABC-1234")
            .execute(&records, 20)
            .unwrap();

        let ids: Vec<_> = page.items.iter().map(|r| r.inspection_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_plate_match_is_case_insensitive() {
        let records = sample();
        let page = InspectionQuery::new().plate("abc").execute(&records, 20).unwrap();
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_empty_plate_is_no_filter() {
        let records = sample();
        let page = InspectionQuery::new().plate("").execute(&records, 20).unwrap();
        assert_eq!(page.total, records.len());
    }

    #[test]
    fn test_time_range_inclusive() {
        let records = sample();
        let from = records[4].timestamp;
        let to = records[1].timestamp;
        let page = InspectionQuery::new().between(from, to).execute(&records, 20).unwrap();

        let ids: Vec<_> = page.items.iter().map(|r| r.inspection_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e"]);
    }

    #[test]
    fn test_pagination_reports_total() {
        let records = sample();
        let first = InspectionQuery::new().page(1, 2).execute(&records, 20).unwrap();
        let last = InspectionQuery::new().page(3, 2).execute(&records, 20).unwrap();
        let beyond = InspectionQuery::new().page(9, 2).execute(&records, 20).unwrap();

        assert_eq!(first.items.len(), 2);
        assert_eq!(first.items[0].inspection_id, "d");
        assert_eq!(first.page_count(), 3);
        assert_eq!(last.items.len(), 1);
        assert_eq!(last.items[0].inspection_id, "a");
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[test]
    fn test_default_page_size_applies() {
        let records = sample();
        let page = InspectionQuery::new().execute(&records, 3).unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.page_size, 3);
    }

    #[test]
    fn test_invalid_queries_rejected() {
        let records = sample();
        let now = Utc::now();
        assert!(InspectionQuery::new()
            .between(now, now - Duration::hours(1))
            .execute(&records, 20)
            .is_err());
        assert!(InspectionQuery::new().page(0, 10).execute(&records, 20).is_err());
        assert!(InspectionQuery::new().page(1, 0).execute(&records, 20).is_err());
    }
}
