// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Live inspection feed with a local display window

use std::collections::VecDeque;
use std::sync::Arc;
use parking_lot::RwLock;

use crate::core::{EventBus, Subscription};
use crate::inspection::{InspectionLedger, InspectionRecord};

/// Most recent inspections, newest first, capped at `window` entries
/// regardless of the ledger's own capacity
pub struct InspectionFeedView {
    window: usize,
    records: Arc<RwLock<VecDeque<InspectionRecord>>>,
    subscription: Option<Subscription>,
}

impl InspectionFeedView {
    pub fn attach(bus: &EventBus, ledger: &InspectionLedger, window: usize) -> Self {
        let window = window.max(1);
        let records = Arc::new(RwLock::new(VecDeque::<InspectionRecord>::with_capacity(window + 1)));

        let feed = Arc::clone(&records);
        let subscription = bus.on_inspection_created(move |record| {
            let mut feed = feed.write();
            if !feed.iter().any(|r| r.inspection_id == record.inspection_id) {
                feed.push_front(record.clone());
                feed.truncate(window);
            }
            Ok(())
        });

        {
            let mut feed = records.write();
            let backlog = ledger.with_records_ref(|all| {
                all.iter().take(window).cloned().collect::<Vec<_>>()
            });
            for record in backlog {
                if !feed.iter().any(|r| r.inspection_id == record.inspection_id) {
                    feed.push_back(record);
                }
            }
            feed.truncate(window);
        }

        Self {
            window,
            records,
            subscription: Some(subscription),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn records(&self) -> Vec<InspectionRecord> {
        self.records.read().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<InspectionRecord> {
        self.records.read().front().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

impl Drop for InspectionFeedView {
    fn drop(&mut self) {
        self.detach();
    }
}
