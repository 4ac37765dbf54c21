// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Operator directory

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Operator,
    Admin,
}

/// An account allowed to sign in and respond to alerts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub operator_id: u32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Operator {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// In-memory list of operator accounts
pub struct OperatorDirectory {
    operators: RwLock<Vec<Operator>>,
}

impl OperatorDirectory {
    pub fn new(operators: Vec<Operator>) -> Self {
        Self {
            operators: RwLock::new(operators),
        }
    }

    /// Directory with the five stock accounts
    pub fn seeded() -> Self {
        let date = |y, m, d| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single().unwrap_or_default();
        let op = |id, name: &str, email: &str, role, enabled, created_at| Operator {
            operator_id: id,
            name: name.to_string(),
            email: email.to_string(),
            role,
            enabled,
            created_at,
        };

        Self::new(vec![
            op(1, "Admin User", "admin@atis.com", Role::Admin, true, date(2024, 1, 1)),
            op(2, "John Operator", "operator@atis.com", Role::Operator, true, date(2024, 1, 15)),
            op(3, "Sarah Inspector", "sarah@atis.com", Role::Operator, true, date(2024, 2, 1)),
            op(4, "Mike Wilson", "mike@atis.com", Role::Operator, false, date(2024, 2, 10)),
            op(5, "Emily Chen", "emily@atis.com", Role::Admin, true, date(2024, 3, 1)),
        ])
    }

    pub fn list(&self) -> Vec<Operator> {
        self.operators.read().clone()
    }

    pub fn get(&self, operator_id: u32) -> Result<Operator> {
        self.operators
            .read()
            .iter()
            .find(|o| o.operator_id == operator_id)
            .cloned()
            .ok_or_else(|| MonitorError::not_found("operator", operator_id.to_string()))
    }

    /// Case-insensitive lookup by email
    pub fn find_by_email(&self, email: &str) -> Option<Operator> {
        self.operators
            .read()
            .iter()
            .find(|o| o.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    pub fn set_enabled(&self, operator_id: u32, enabled: bool) -> Result<Operator> {
        self.modify(operator_id, |o| o.enabled = enabled)
    }

    pub fn toggle_enabled(&self, operator_id: u32) -> Result<Operator> {
        self.modify(operator_id, |o| o.enabled = !o.enabled)
    }

    fn modify(&self, operator_id: u32, apply: impl FnOnce(&mut Operator)) -> Result<Operator> {
        let updated = {
            let mut operators = self.operators.write();
            let operator = operators
                .iter_mut()
                .find(|o| o.operator_id == operator_id)
                .ok_or_else(|| MonitorError::not_found("operator", operator_id.to_string()))?;
            apply(operator);
            operator.clone()
        };
        info!(operator_id, enabled = updated.enabled, "Operator updated");
        Ok(updated)
    }

    pub fn len(&self) -> usize {
        self.operators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.read().is_empty()
    }
}

impl Default for OperatorDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_accounts() {
        let dir = OperatorDirectory::seeded();
        assert_eq!(dir.len(), 5);
        assert!(dir.get(1).unwrap().is_admin());
        assert!(!dir.get(4).unwrap().enabled);
        assert_eq!(dir.find_by_email("OPERATOR@atis.com").unwrap().operator_id, 2);
    }

    #[test]
    fn test_toggle_returns_updated_record() {
        let dir = OperatorDirectory::seeded();
        let toggled = dir.toggle_enabled(4).unwrap();
        assert!(toggled.enabled);
        assert_eq!(dir.get(4).unwrap(), toggled);

        assert!(!dir.set_enabled(4, false).unwrap().enabled);
        assert!(!dir.set_enabled(4, false).unwrap().enabled);
    }

    #[test]
    fn test_unknown_operator() {
        let dir = OperatorDirectory::seeded();
        assert!(matches!(dir.get(99), Err(MonitorError::NotFound { .. })));
        assert!(matches!(dir.toggle_enabled(99), Err(MonitorError::NotFound { .. })));
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(OperatorDirectory::seeded().get(2).unwrap()).unwrap();
        assert_eq!(value["operatorId"], 2);
        assert_eq!(value["role"], "Operator");
        assert_eq!(value["createdAt"], "2024-01-15T00:00:00Z");
    }
}
