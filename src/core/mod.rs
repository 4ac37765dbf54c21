// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Core engine module - event distribution, scheduling and orchestration

mod engine;
mod scheduler;
mod event_bus;

pub use engine::Engine;
pub use scheduler::{spawn_task, Scheduler, TaskHandle};
pub use event_bus::{Event, EventBus, EventKind, HandlerResult, Subscription};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the running system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemState {
    pub running: bool,
    pub simulator_running: bool,
    pub inspections_retained: usize,
    pub alerts_total: usize,
    pub alerts_pending: usize,
    pub events_published: u64,
    pub uptime_seconds: u64,
    pub last_inspection: Option<DateTime<Utc>>,
}
