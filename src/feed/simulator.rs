// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Timer-driven live feed

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use anyhow::{bail, Result};
use parking_lot::Mutex;
use rand::prelude::*;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::InspectionPipeline;
use crate::config::SimulatorConfig;
use crate::core::{spawn_task, TaskHandle};

/// Simulator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulatorState {
    Stopped,
    Running,
}

struct Inner {
    state: SimulatorState,
    task: Option<TaskHandle>,
    live: Option<Arc<AtomicBool>>,
}

/// Generates one inspection after every randomized delay while running.
/// Each tick schedules the next one, so jitter accumulates.
pub struct RealtimeSimulator {
    pipeline: Arc<InspectionPipeline>,
    config: SimulatorConfig,
    inner: Mutex<Inner>,
    ticks: Arc<AtomicU64>,
}

impl RealtimeSimulator {
    pub fn new(pipeline: Arc<InspectionPipeline>, config: SimulatorConfig) -> Self {
        Self {
            pipeline,
            config,
            inner: Mutex::new(Inner {
                state: SimulatorState::Stopped,
                task: None,
                live: None,
            }),
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start ticking. Returns `false` if already running.
    pub fn start(&self) -> Result<bool> {
        let mut inner = self.inner.lock();
        if inner.state == SimulatorState::Running {
            return Ok(false);
        }

        if self.config.max_interval_ms < self.config.min_interval_ms {
            bail!(
                "simulator interval is inverted: {} > {}",
                self.config.min_interval_ms,
                self.config.max_interval_ms
            );
        }
        let delays = Uniform::new_inclusive(self.config.min_interval_ms, self.config.max_interval_ms);
        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };

        let live = Arc::new(AtomicBool::new(true));
        let tick_live = Arc::clone(&live);
        let pipeline = Arc::clone(&self.pipeline);
        let ticks = Arc::clone(&self.ticks);

        let task = spawn_task(
            "simulator",
            move || Duration::from_millis(delays.sample(&mut rng)),
            move || {
                if !tick_live.load(Ordering::SeqCst) {
                    return;
                }
                ticks.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = pipeline.tick() {
                    warn!("Simulator tick failed: {}", e);
                }
            },
        )?;

        inner.task = Some(task);
        inner.live = Some(live);
        inner.state = SimulatorState::Running;
        info!(
            min_ms = self.config.min_interval_ms,
            max_ms = self.config.max_interval_ms,
            "Realtime simulator started"
        );
        Ok(true)
    }

    /// Stop ticking and cancel the pending tick. Returns `false` if already
    /// stopped.
    pub fn stop(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state == SimulatorState::Stopped {
            return false;
        }

        if let Some(live) = inner.live.take() {
            live.store(false, Ordering::SeqCst);
        }
        if let Some(task) = inner.task.take() {
            task.cancel();
        }
        inner.state = SimulatorState::Stopped;
        info!(ticks = self.ticks.load(Ordering::Relaxed), "Realtime simulator stopped");
        true
    }

    pub fn state(&self) -> SimulatorState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == SimulatorState::Running
    }

    /// Ticks performed since construction
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn pipeline(&self) -> &Arc<InspectionPipeline> {
        &self.pipeline
    }
}

impl Drop for RealtimeSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::AlertStore;
    use crate::core::EventBus;
    use crate::inspection::{InspectionGenerator, InspectionLedger};

    fn simulator(min_ms: u64, max_ms: u64) -> (RealtimeSimulator, Arc<AtomicU64>) {
        let config = SimulatorConfig {
            min_interval_ms: min_ms,
            max_interval_ms: max_ms,
            rng_seed: Some(5),
            ..SimulatorConfig::default()
        };
        let bus = Arc::new(EventBus::new());
        let created = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&created);
        let _sub = bus.on_inspection_created(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let pipeline = InspectionPipeline::new(
            InspectionGenerator::from_seed(&config, 3).unwrap(),
            Arc::new(InspectionLedger::new(config.ledger_capacity)),
            Arc::new(AlertStore::new(Arc::clone(&bus))),
            bus,
        );
        (RealtimeSimulator::new(Arc::new(pipeline), config), created)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_while_running() {
        let (sim, created) = simulator(5_000, 10_000);
        assert_eq!(sim.state(), SimulatorState::Stopped);
        assert!(sim.start().unwrap());
        assert!(sim.is_running());

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert_eq!(created.load(Ordering::SeqCst), 0);

        // Ten draws of at most 10s each
        tokio::time::sleep(Duration::from_millis(100_001)).await;
        let n = created.load(Ordering::SeqCst);
        assert!((10..=21).contains(&n), "got {} ticks", n);
        assert_eq!(sim.pipeline().ledger().len() as u64, n);
        sim.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_timer() {
        let (sim, created) = simulator(1_000, 1_000);
        assert!(sim.start().unwrap());
        assert!(!sim.start().unwrap());

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(created.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(created.load(Ordering::SeqCst), 2);
        sim.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_tick() {
        let (sim, created) = simulator(1_000, 1_000);
        sim.start().unwrap();
        tokio::time::sleep(Duration::from_millis(1_200)).await;
        assert_eq!(created.load(Ordering::SeqCst), 1);

        assert!(sim.stop());
        assert!(!sim.stop());
        assert_eq!(sim.state(), SimulatorState::Stopped);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let (sim, created) = simulator(1_000, 1_000);
        sim.start().unwrap();
        sim.stop();
        assert!(sim.start().unwrap());

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(sim.tick_count(), 2);
    }

    #[test]
    fn test_start_without_runtime_fails() {
        let (sim, _) = simulator(1_000, 2_000);
        assert!(sim.start().is_err());
        assert_eq!(sim.state(), SimulatorState::Stopped);
    }
}
