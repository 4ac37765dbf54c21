// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! ATIS - Automated Tire Inspection System
//!
//! Monitoring core for a tire-inspection station:
//! - Live feed of simulated inspections at a randomized cadence
//! - Authoritative alert derivation for unsafe tires
//! - Alert lifecycle (Pending -> Acknowledged -> Resolved) with escalation
//! - Filtered, paginated inspection queries and report aggregation
//! - Live views kept in sync through a typed event bus
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         ATIS Engine                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │ Simulator │→ │ Generator  │→ │  Pipeline  │→ │ Alerts  │  │
//! │  └───────────┘  └────────────┘  └────────────┘  └─────────┘  │
//! │                                      ↓              ↓        │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                       Event Bus                        │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │        ↓              ↓              ↓              ↓        │
//! │  ┌───────────┐  ┌────────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │  Pending  │  │ Alert List │  │    Feed    │  │Dashboard│  │
//! │  └───────────┘  └────────────┘  └────────────┘  └─────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod alerts;
pub mod api;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod feed;
pub mod inspection;
pub mod reports;
pub mod security;
pub mod views;

// Re-exports for convenience
pub use alerts::{Alert, AlertStatus, AlertStore};
pub use api::MonitorApi;
pub use config::Config;
pub use core::{Engine, Event, EventBus, EventKind};
pub use db::Database;
pub use error::{MonitorError, Result};
pub use feed::RealtimeSimulator;
pub use inspection::{InspectionQuery, InspectionRecord, InspectionStatus};

/// ATIS version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ATIS name
pub const NAME: &str = "ATIS";
