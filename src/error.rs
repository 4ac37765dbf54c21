// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Error taxonomy shared by the alert store, query layer and collaborators

use thiserror::Error;

/// Errors surfaced synchronously by core operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Referenced alert, inspection or operator does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation attempted against a record in the wrong state
    #[error("cannot {operation} {id}: alert is {current}")]
    InvalidState {
        id: String,
        current: String,
        operation: &'static str,
    },

    /// Malformed input to a mutation or query
    #[error("validation failed: {0}")]
    Validation(String),
}

impl MonitorError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MonitorError::not_found("alert", "ALT-1");
        assert_eq!(err.to_string(), "alert not found: ALT-1");

        let err = MonitorError::InvalidState {
            id: "ALT-1".to_string(),
            current: "Resolved".to_string(),
            operation: "acknowledge",
        };
        assert_eq!(err.to_string(), "cannot acknowledge ALT-1: alert is Resolved");
    }
}
