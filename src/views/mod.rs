// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Bus-driven views.
//!
//! Every view subscribes before it reads its initial snapshot and merges
//! the two, so nothing published in between is lost. Views unsubscribe on
//! `detach` or drop.

mod alarm;
mod alert_list;
mod dashboard;
mod feed;
mod pending;

pub use alarm::{AlarmNotifier, Notification, NOTIFICATION_CAPACITY};
pub use alert_list::{AlertListView, AlertScope};
pub use dashboard::DashboardView;
pub use feed::InspectionFeedView;
pub use pending::PendingCountView;
