// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Persisted operator-facing settings

use std::sync::Arc;
use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::Database;
use crate::error::MonitorError;

/// Namespace key the settings are stored under
pub const SETTINGS_NAMESPACE: &str = "atis-settings";

/// Longest acknowledgment timeout accepted, one day
pub const MAX_ACK_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemSettings {
    /// Seconds a pending alert may wait before it is escalated
    #[serde(rename = "alertAcknowledgmentTimeout")]
    pub alert_acknowledgment_timeout_secs: u64,
    pub audio_alarm_enabled: bool,
    pub audio_muted: bool,
    pub api_base_url: String,
    pub ws_url: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            alert_acknowledgment_timeout_secs: 60,
            audio_alarm_enabled: true,
            audio_muted: false,
            api_base_url: "/api".to_string(),
            ws_url: "ws://localhost:8080/realtime".to_string(),
        }
    }
}

impl SystemSettings {
    pub fn acknowledgment_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.alert_acknowledgment_timeout_secs as i64)
    }

    /// Whether an alarm should sound for a new alert
    pub fn alarm_audible(&self) -> bool {
        self.audio_alarm_enabled && !self.audio_muted
    }
}

/// Settings cached in memory and written through to the database on
/// every change
pub struct SettingsStore {
    db: Arc<Database>,
    current: RwLock<SystemSettings>,
}

impl SettingsStore {
    /// Load stored settings, falling back to defaults when nothing is
    /// stored or the stored value is unreadable
    pub fn open(db: Arc<Database>) -> Result<Self> {
        let current = match db.get_json::<SystemSettings>(SETTINGS_NAMESPACE) {
            Ok(Some(settings)) => settings,
            Ok(None) => SystemSettings::default(),
            Err(e) => {
                warn!("Stored settings unreadable, using defaults: {}", e);
                SystemSettings::default()
            }
        };
        Ok(Self {
            db,
            current: RwLock::new(current),
        })
    }

    pub fn get(&self) -> SystemSettings {
        self.current.read().clone()
    }

    pub fn set_alert_timeout(&self, secs: u64) -> Result<SystemSettings> {
        check_timeout(secs)?;
        self.update(|s| s.alert_acknowledgment_timeout_secs = secs)
    }

    pub fn set_audio_alarm_enabled(&self, enabled: bool) -> Result<SystemSettings> {
        self.update(|s| s.audio_alarm_enabled = enabled)
    }

    pub fn toggle_audio_mute(&self) -> Result<SystemSettings> {
        self.update(|s| s.audio_muted = !s.audio_muted)
    }

    pub fn set_api_base_url(&self, url: &str) -> Result<SystemSettings> {
        let url = check_api_url(url)?;
        self.update(|s| s.api_base_url = url)
    }

    pub fn set_ws_url(&self, url: &str) -> Result<SystemSettings> {
        let url = check_ws_url(url)?;
        self.update(|s| s.ws_url = url)
    }

    /// Replace every setting at once. Nothing changes unless all values
    /// are valid.
    pub fn replace(&self, settings: SystemSettings) -> Result<SystemSettings> {
        check_timeout(settings.alert_acknowledgment_timeout_secs)?;
        let api_base_url = check_api_url(&settings.api_base_url)?;
        let ws_url = check_ws_url(&settings.ws_url)?;
        self.update(|s| {
            *s = SystemSettings {
                api_base_url,
                ws_url,
                ..settings
            }
        })
    }

    fn update(&self, apply: impl FnOnce(&mut SystemSettings)) -> Result<SystemSettings> {
        let mut current = self.current.write();
        let mut next = current.clone();
        apply(&mut next);
        self.db.put_json(SETTINGS_NAMESPACE, &next)?;
        *current = next.clone();
        info!("Settings updated");
        Ok(next)
    }
}

fn check_timeout(secs: u64) -> std::result::Result<(), MonitorError> {
    if secs == 0 || secs > MAX_ACK_TIMEOUT_SECS {
        return Err(MonitorError::validation(format!(
            "acknowledgment timeout must be within 1..={} seconds, got {}",
            MAX_ACK_TIMEOUT_SECS, secs
        )));
    }
    Ok(())
}

fn check_api_url(url: &str) -> std::result::Result<String, MonitorError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(MonitorError::validation("API base URL is empty"));
    }
    Ok(url.to_string())
}

fn check_ws_url(url: &str) -> std::result::Result<String, MonitorError> {
    let url = url.trim();
    let host = url
        .strip_prefix("wss://")
        .or_else(|| url.strip_prefix("ws://"))
        .unwrap_or_default();
    if host.is_empty() {
        return Err(MonitorError::validation(format!("not a websocket URL: {:?}", url)));
    }
    Ok(url.to_string())
}
