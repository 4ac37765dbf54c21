// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Dashboard stat cards

use std::collections::HashSet;
use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;

use super::pending::{self, PendingSet};
use crate::alerts::{AlertStatus, AlertStore};
use crate::core::{EventBus, Subscription};
use crate::inspection::{InspectionLedger, InspectionRecord, InspectionStatus};
use crate::reports::DashboardStats;

struct Cards {
    day: NaiveDate,
    stats: DashboardStats,
    latency_sum: u64,
    counted: HashSet<String>,
}

impl Cards {
    fn new(day: NaiveDate) -> Self {
        Self {
            day,
            stats: DashboardStats::default(),
            latency_sum: 0,
            counted: HashSet::new(),
        }
    }

    /// Count `record` once if it was captured on the card day
    fn count(&mut self, record: &InspectionRecord) {
        if record.timestamp.date_naive() != self.day
            || !self.counted.insert(record.inspection_id.clone())
        {
            return;
        }
        self.stats.total_inspections += 1;
        match record.status {
            InspectionStatus::Safe => self.stats.safe_count += 1,
            InspectionStatus::Unsafe => self.stats.unsafe_count += 1,
        }
        self.latency_sum += record.processing_duration_ms;
        self.stats.avg_processing_latency_ms =
            (self.latency_sum as f64 / self.stats.total_inspections as f64).round() as u64;
    }
}

/// Stat cards initialised from today's figures and advanced by live
/// events. Each inspection is counted once whether it arrives through the
/// ledger snapshot or the bus. The pending card follows the same
/// once-per-alert rule as [`super::PendingCountView`].
pub struct DashboardView {
    cards: Arc<Mutex<Cards>>,
    pending: Arc<Mutex<PendingSet>>,
    subscriptions: Vec<Subscription>,
}

impl DashboardView {
    pub fn attach(bus: &EventBus, ledger: &InspectionLedger, store: &AlertStore) -> Self {
        let today = Utc::now().date_naive();
        let cards = Arc::new(Mutex::new(Cards::new(today)));
        let pending = Arc::new(Mutex::new(PendingSet::default()));

        let on_inspection = Arc::clone(&cards);
        let mut subscriptions = vec![bus.on_inspection_created(move |record| {
            on_inspection.lock().count(record);
            Ok(())
        })];
        subscriptions.extend(pending::subscribe(bus, &pending));

        ledger.with_records_ref(|records| {
            let mut cards = cards.lock();
            for record in records {
                cards.count(record);
            }
        });
        {
            let mut set = pending.lock();
            for alert in store.query(Some(AlertStatus::Pending)) {
                set.observe(&alert);
            }
        }

        Self {
            cards,
            pending,
            subscriptions,
        }
    }

    /// Current card values
    pub fn stats(&self) -> DashboardStats {
        let mut stats = self.cards.lock().stats.clone();
        stats.alerts_pending = self.pending.lock().len();
        stats
    }

    pub fn detach(&mut self) {
        for sub in self.subscriptions.drain(..) {
            sub.unsubscribe();
        }
    }
}

impl Drop for DashboardView {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use crate::feed::InspectionPipeline;
    use crate::inspection::InspectionGenerator;

    fn pipeline(unsafe_probability: f64) -> InspectionPipeline {
        let config = SimulatorConfig {
            unsafe_probability,
            ..SimulatorConfig::default()
        };
        let bus = Arc::new(EventBus::new());
        InspectionPipeline::new(
            InspectionGenerator::from_seed(&config, 8).unwrap(),
            Arc::new(InspectionLedger::new(100)),
            Arc::new(AlertStore::new(Arc::clone(&bus))),
            bus,
        )
    }

    #[test]
    fn test_cards_follow_live_feed() {
        let p = pipeline(0.5);
        let view = DashboardView::attach(p.event_bus(), p.ledger(), p.alerts());
        assert_eq!(view.stats(), DashboardStats::default());

        for _ in 0..20 {
            p.tick().unwrap();
        }
        let stats = view.stats();
        let expected = DashboardStats::compute(
            &p.ledger().snapshot(),
            Utc::now().date_naive(),
            p.alerts().pending_count(),
        );
        assert_eq!(stats.total_inspections, 20);
        assert_eq!(stats.safe_count, expected.safe_count);
        assert_eq!(stats.unsafe_count, expected.unsafe_count);
        assert_eq!(stats.alerts_pending, expected.alerts_pending);
        assert_eq!(stats.avg_processing_latency_ms, expected.avg_processing_latency_ms);
    }

    #[test]
    fn test_pending_card_decrements_once() {
        let p = pipeline(1.0);
        let alert = p.tick().unwrap().alert.unwrap();
        let view = DashboardView::attach(p.event_bus(), p.ledger(), p.alerts());
        assert_eq!(view.stats().alerts_pending, 1);
        assert_eq!(view.stats().unsafe_count, 1);

        p.alerts().acknowledge(&alert.alert_id, 1).unwrap();
        p.alerts().resolve(&alert.alert_id).unwrap();
        assert_eq!(view.stats().alerts_pending, 0);
    }

    #[test]
    fn test_concurrent_ingest_counted_once() {
        let config = SimulatorConfig {
            unsafe_probability: 0.3,
            ..SimulatorConfig::default()
        };
        let bus = Arc::new(EventBus::new());
        let p = Arc::new(InspectionPipeline::new(
            InspectionGenerator::from_seed(&config, 21).unwrap(),
            Arc::new(InspectionLedger::new(100_000)),
            Arc::new(AlertStore::new(Arc::clone(&bus))),
            bus,
        ));

        let feeder = {
            let p = Arc::clone(&p);
            std::thread::spawn(move || {
                for _ in 0..3_000 {
                    p.tick().unwrap();
                }
            })
        };

        for _ in 0..100 {
            let mut view = DashboardView::attach(p.event_bus(), p.ledger(), p.alerts());
            view.detach();
            let total = view.stats().total_inspections;
            assert!(total <= p.ledger().len(), "{} counted, {} ingested", total, p.ledger().len());
        }
        feeder.join().unwrap();

        let view = DashboardView::attach(p.event_bus(), p.ledger(), p.alerts());
        assert_eq!(view.stats().total_inspections, 3_000);
    }

    #[test]
    fn test_other_days_not_counted_live() {
        let p = pipeline(0.0);
        let view = DashboardView::attach(p.event_bus(), p.ledger(), p.alerts());

        let yesterday = Utc::now() - chrono::Duration::days(1);
        let record = p.with_generator(|g| g.generate_at(yesterday));
        p.ingest(record).unwrap();
        p.tick().unwrap();

        assert_eq!(view.stats().total_inspections, 1);
    }
}
