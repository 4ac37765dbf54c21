// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Configuration module

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::security::SecurityConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Data directory
    pub data_dir: PathBuf,

    /// Log level
    pub log_level: String,

    /// Live feed simulator
    pub simulator: SimulatorConfig,

    /// Inspection query defaults
    pub query: QueryConfig,

    /// Live view configuration
    pub views: ViewConfig,

    /// Pending alert escalation
    pub escalation: EscalationConfig,

    /// Simulated API latencies
    pub api: ApiConfig,

    /// Security configuration
    pub security: SecurityConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "ATIS".to_string(),
            data_dir: PathBuf::from("./data"),
            log_level: "info".to_string(),
            simulator: SimulatorConfig::default(),
            query: QueryConfig::default(),
            views: ViewConfig::default(),
            escalation: EscalationConfig::default(),
            api: ApiConfig::default(),
            security: SecurityConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Reject settings the simulator and query layer cannot work with
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulator;
        if sim.min_interval_ms == 0 || sim.max_interval_ms < sim.min_interval_ms {
            bail!(
                "simulator interval must satisfy 0 < min ({}) <= max ({})",
                sim.min_interval_ms,
                sim.max_interval_ms
            );
        }
        for (name, p) in [
            ("unsafe_probability", sim.unsafe_probability),
            ("plate_failure_probability", sim.plate_failure_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                bail!("simulator.{} must be within [0, 1], got {}", name, p);
            }
        }
        if sim.ledger_capacity == 0 {
            bail!("simulator.ledger_capacity must be positive");
        }
        if self.query.default_page_size == 0 {
            bail!("query.default_page_size must be positive");
        }
        if self.views.feed_window == 0 {
            bail!("views.feed_window must be positive");
        }
        if self.escalation.sweep_interval_secs == 0 {
            bail!("escalation.sweep_interval_secs must be positive");
        }
        Ok(())
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("atis"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Live feed simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Lower bound of the randomized tick delay
    pub min_interval_ms: u64,

    /// Upper bound of the randomized tick delay
    pub max_interval_ms: u64,

    /// Probability that a generated inspection is unsafe
    pub unsafe_probability: f64,

    /// Probability that plate capture fails
    pub plate_failure_probability: f64,

    /// Maximum inspections retained in the ledger
    pub ledger_capacity: usize,

    /// Backdated inspections generated at startup
    pub seed_inspections: usize,

    /// Fixed RNG seed for reproducible runs
    pub rng_seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 5_000,
            max_interval_ms: 10_000,
            unsafe_probability: 0.25,
            plate_failure_probability: 0.1,
            ledger_capacity: 500,
            seed_inspections: 150,
            rng_seed: None,
        }
    }
}

/// Inspection query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
        }
    }
}

/// Live view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Number of inspections kept by the live feed view
    pub feed_window: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { feed_window: 10 }
    }
}

/// Escalation sweep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    pub enabled: bool,
    pub sweep_interval_secs: u64,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 15,
        }
    }
}

/// Fixed latency applied by the API facade before each call resolves
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_latency_ms: u64,
    pub query_latency_ms: u64,
    pub report_latency_ms: u64,
    pub login_latency_ms: u64,
}

impl ApiConfig {
    /// No artificial latency at all
    pub fn immediate() -> Self {
        Self {
            base_latency_ms: 0,
            query_latency_ms: 0,
            report_latency_ms: 0,
            login_latency_ms: 0,
        }
    }

    pub fn base_latency(&self) -> Duration {
        Duration::from_millis(self.base_latency_ms)
    }

    pub fn query_latency(&self) -> Duration {
        Duration::from_millis(self.query_latency_ms)
    }

    pub fn report_latency(&self) -> Duration {
        Duration::from_millis(self.report_latency_ms)
    }

    pub fn login_latency(&self) -> Duration {
        Duration::from_millis(self.login_latency_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_latency_ms: 300,
            query_latency_ms: 400,
            report_latency_ms: 600,
            login_latency_ms: 800,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database path
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/atis.db"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulator.ledger_capacity, 500);
        assert_eq!(config.query.default_page_size, 20);
    }

    #[test]
    fn test_inverted_interval_rejected() {
        let mut config = Config::default();
        config.simulator.min_interval_ms = 10_000;
        config.simulator.max_interval_ms = 5_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let mut config = Config::default();
        config.simulator.unsafe_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_create_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.simulator.max_interval_ms, created.simulator.max_interval_ms);
        assert_eq!(loaded.database.path, created.database.path);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[simulator]\nledger_capacity = 42\n").unwrap();
        assert_eq!(config.simulator.ledger_capacity, 42);
        assert_eq!(config.simulator.min_interval_ms, 5_000);
        assert_eq!(config.api.report_latency_ms, 600);
    }
}
