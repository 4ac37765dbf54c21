// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Security module - credential checks, sessions, operators, audit trail

mod audit;
mod auth;
mod operators;

pub use audit::*;
pub use auth::*;
pub use operators::*;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Upper bound on a single credential check
    pub credential_timeout_ms: u64,

    /// Session timeout in seconds
    pub session_timeout_secs: u64,

    /// Minimum password length
    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            credential_timeout_ms: 2_000,
            session_timeout_secs: 3600, // 1 hour
            min_password_length: 8,
        }
    }
}

/// Generate secure random bytes using ring
pub fn secure_random_bytes(len: usize) -> Result<Vec<u8>> {
    use ring::rand::{SecureRandom, SystemRandom};

    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| anyhow!("Failed to generate random bytes"))?;
    Ok(bytes)
}
