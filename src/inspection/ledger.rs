// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Capped, newest-first inspection ledger

use std::collections::VecDeque;
use parking_lot::RwLock;
use tracing::trace;

use super::InspectionRecord;

/// In-memory inspection history. Index 0 is always the newest record;
/// once `capacity` is reached the oldest entry is evicted on every push.
pub struct InspectionLedger {
    records: RwLock<VecDeque<InspectionRecord>>,
    capacity: usize,
}

impl InspectionLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    /// Ledger preloaded with `records`, given newest first. Anything beyond
    /// the capacity is dropped from the old end.
    pub fn with_records(records: Vec<InspectionRecord>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut records: VecDeque<_> = records.into();
        records.truncate(capacity);
        Self {
            records: RwLock::new(records),
            capacity,
        }
    }

    /// Prepend a record, returning the evicted oldest entry if the cap was hit
    pub fn push(&self, record: InspectionRecord) -> Option<InspectionRecord> {
        let mut records = self.records.write();
        records.push_front(record);
        if records.len() > self.capacity {
            let evicted = records.pop_back();
            if let Some(ref old) = evicted {
                trace!(inspection_id = %old.inspection_id, "Evicted inspection from ledger");
            }
            evicted
        } else {
            None
        }
    }

    pub fn get(&self, inspection_id: &str) -> Option<InspectionRecord> {
        self.records
            .read()
            .iter()
            .find(|r| r.inspection_id == inspection_id)
            .cloned()
    }

    pub fn contains(&self, inspection_id: &str) -> bool {
        self.records.read().iter().any(|r| r.inspection_id == inspection_id)
    }

    /// Copy of the ledger, newest first
    pub fn snapshot(&self) -> Vec<InspectionRecord> {
        self.records.read().iter().cloned().collect()
    }

    /// Run `f` against the ledger contents without copying them
    pub fn with_records_ref<R>(&self, f: impl FnOnce(&VecDeque<InspectionRecord>) -> R) -> R {
        f(&self.records.read())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::inspection::InspectionGenerator;

    fn records(n: usize) -> Vec<InspectionRecord> {
        let mut gen = InspectionGenerator::from_seed(&SimulatorConfig::default(), 42).unwrap();
        (0..n).map(|_| gen.generate()).collect()
    }

    #[test]
    fn test_push_is_newest_first() {
        let ledger = InspectionLedger::new(10);
        let recs = records(3);
        for r in &recs {
            ledger.push(r.clone());
        }
        let snap = ledger.snapshot();
        assert_eq!(snap[0].inspection_id, recs[2].inspection_id);
        assert_eq!(snap[2].inspection_id, recs[0].inspection_id);
    }

    #[test]
    fn test_full_ledger_evicts_oldest() {
        let initial = records(501);
        let (newest, existing) = initial.split_first().unwrap();
        let ledger = InspectionLedger::with_records(existing.to_vec(), 500);
        assert_eq!(ledger.len(), 500);

        let oldest_id = existing[499].inspection_id.clone();
        let evicted = ledger.push(newest.clone()).unwrap();

        assert_eq!(evicted.inspection_id, oldest_id);
        assert_eq!(ledger.len(), 500);
        assert_eq!(ledger.snapshot()[0].inspection_id, newest.inspection_id);
        assert!(!ledger.contains(&oldest_id));
    }

    #[test]
    fn test_with_records_truncates_to_capacity() {
        let ledger = InspectionLedger::with_records(records(20), 5);
        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.capacity(), 5);
    }

    #[test]
    fn test_get_by_id() {
        let ledger = InspectionLedger::new(5);
        let rec = records(1).remove(0);
        ledger.push(rec.clone());
        assert_eq!(ledger.get(&rec.inspection_id), Some(rec));
        assert!(ledger.get("INS-missing").is_none());
    }
}
