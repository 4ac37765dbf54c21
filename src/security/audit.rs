// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Append-only audit trail

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Entries kept in memory before the oldest are dropped
pub const AUDIT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserLogin,
    UserLogout,
    AlertAcknowledged,
    AlertResolved,
    SettingsUpdated,
    UserEnabled,
    UserDisabled,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserLogin => "USER_LOGIN",
            Self::UserLogout => "USER_LOGOUT",
            Self::AlertAcknowledged => "ALERT_ACKNOWLEDGED",
            Self::AlertResolved => "ALERT_RESOLVED",
            Self::SettingsUpdated => "SETTINGS_UPDATED",
            Self::UserEnabled => "USER_ENABLED",
            Self::UserDisabled => "USER_DISABLED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: u32,
    pub user_name: String,
    pub action: AuditAction,
    pub details: String,
}

/// Audit log. Entries can only be appended; readers get copies.
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn record(
        &self,
        user_id: u32,
        user_name: &str,
        action: AuditAction,
        details: impl Into<String>,
    ) -> AuditEntry {
        let entry = AuditEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_id,
            user_name: user_name.to_string(),
            action,
            details: details.into(),
        };
        info!(user_id, action = %action, "Audit: {}", entry.details);

        let mut entries = self.entries.write();
        entries.push(entry.clone());
        if entries.len() > AUDIT_CAPACITY {
            let drain_count = entries.len() - AUDIT_CAPACITY;
            entries.drain(0..drain_count);
        }
        entry
    }

    /// Every entry, newest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().iter().rev().cloned().collect()
    }

    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }

    pub fn by_action(&self, action: AuditAction) -> Vec<AuditEntry> {
        self.entries
            .read()
            .iter()
            .rev()
            .filter(|e| e.action == action)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
