// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Async API facade.
//!
//! Every call waits a fixed simulated latency before touching the engine,
//! so callers see the same timing they would against a remote backend.
//! Mutations that end up in the audit trail need a signed-in operator.

use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::alerts::{Alert, AlertStatus};
use crate::config::ApiConfig;
use crate::core::Engine;
use crate::db::{Database, SystemSettings};
use crate::error::MonitorError;
use crate::inspection::{InspectionQuery, InspectionRecord, Page};
use crate::reports::{DashboardStats, Report, ReportRequest};
use crate::security::{
    AuditAction, AuditEntry, AuthError, CredentialStore, Operator, Session, SessionManager,
};

/// Errors returned by the facade
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("not signed in")]
    Unauthenticated,

    #[error("operator {0} is not an administrator")]
    Forbidden(u32),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Outcome of an acknowledgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeResult {
    pub operator_id: u32,
    pub response_time_ms: u64,
}

/// API facade over a shared [`Engine`]
pub struct MonitorApi {
    engine: Arc<Engine>,
    credentials: CredentialStore,
    sessions: SessionManager,
    latency: ApiConfig,
}

impl MonitorApi {
    /// Facade with the demo sign-ins. With a database the active session
    /// survives restarts.
    pub fn new(engine: Arc<Engine>, db: Option<Arc<Database>>) -> anyhow::Result<Self> {
        let security = &engine.config.security;
        let credentials = CredentialStore::with_demo_accounts(Arc::clone(engine.directory()), security)?;
        let sessions = match db {
            Some(db) => SessionManager::restore(security, db)?,
            None => SessionManager::new(security, None),
        };
        let latency = engine.config.api.clone();

        Ok(Self {
            engine,
            credentials,
            sessions,
            latency,
        })
    }

    /// Override the simulated latencies
    pub fn with_latency(mut self, latency: ApiConfig) -> Self {
        self.latency = latency;
        self
    }

    async fn delay(&self, latency: Duration) {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn signed_in(&self) -> ApiResult<Operator> {
        self.sessions
            .current()
            .map(|s| s.user)
            .ok_or(ApiError::Unauthenticated)
    }

    fn admin(&self) -> ApiResult<Operator> {
        let user = self.signed_in()?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden(user.operator_id));
        }
        Ok(user)
    }

    pub async fn dashboard_stats(&self) -> DashboardStats {
        self.delay(self.latency.base_latency()).await;
        self.engine.dashboard_stats()
    }

    pub async fn inspections(&self, query: &InspectionQuery) -> ApiResult<Page<InspectionRecord>> {
        self.delay(self.latency.query_latency()).await;
        Ok(self.engine.query_inspections(query)?)
    }

    /// Single inspection, `None` when it is unknown or evicted
    pub async fn inspection(&self, inspection_id: &str) -> Option<InspectionRecord> {
        self.delay(self.latency.base_latency()).await;
        self.engine.inspection(inspection_id).ok()
    }

    pub async fn alerts(&self, status: Option<AlertStatus>) -> Vec<Alert> {
        self.delay(self.latency.base_latency()).await;
        self.engine.alerts(status)
    }

    pub async fn acknowledge_alert(&self, alert_id: &str, operator_id: u32) -> ApiResult<AcknowledgeResult> {
        self.delay(self.latency.base_latency()).await;
        let alert = self.engine.acknowledge_alert(alert_id, operator_id)?;
        Ok(AcknowledgeResult {
            operator_id,
            response_time_ms: alert.response_time_ms.unwrap_or_default(),
        })
    }

    /// Resolve on behalf of the signed-in operator
    pub async fn resolve_alert(&self, alert_id: &str) -> ApiResult<Alert> {
        self.delay(self.latency.base_latency()).await;
        let user = self.signed_in()?;
        Ok(self.engine.resolve_alert(alert_id, user.operator_id)?)
    }

    pub async fn report(&self, request: &ReportRequest) -> ApiResult<Report> {
        self.delay(self.latency.report_latency()).await;
        Ok(self.engine.report(request)?)
    }

    pub async fn operators(&self) -> Vec<Operator> {
        self.delay(self.latency.base_latency()).await;
        self.engine.directory().list()
    }

    /// Enable or disable an account. Administrators only.
    pub async fn toggle_operator(&self, operator_id: u32) -> ApiResult<Operator> {
        self.delay(self.latency.base_latency()).await;
        let admin = self.admin()?;
        Ok(self.engine.toggle_operator(&admin, operator_id)?)
    }

    /// Audit entries, newest first
    pub async fn audit_logs(&self, limit: Option<usize>) -> Vec<AuditEntry> {
        self.delay(self.latency.base_latency()).await;
        match limit {
            Some(limit) => self.engine.audit().recent(limit),
            None => self.engine.audit().entries(),
        }
    }

    pub async fn settings(&self) -> SystemSettings {
        self.delay(self.latency.base_latency()).await;
        self.engine.settings().get()
    }

    /// Replace the system settings. Administrators only.
    pub async fn update_settings(&self, settings: SystemSettings) -> ApiResult<SystemSettings> {
        self.delay(self.latency.base_latency()).await;
        let admin = self.admin()?;
        Ok(self.engine.update_settings(&admin, settings)?)
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        self.delay(self.latency.login_latency()).await;
        let session = self.sessions.login(&self.credentials, email, password).await?;
        self.engine.audit().record(
            session.user.operator_id,
            &session.user.name,
            AuditAction::UserLogin,
            format!("User {} logged in", session.user.email),
        );
        info!(operator_id = session.user.operator_id, "Login via API");
        Ok(session)
    }

    pub async fn logout(&self) -> ApiResult<Option<Session>> {
        let previous = self.sessions.logout()?;
        match &previous {
            Some(session) => {
                self.engine.audit().record(
                    session.user.operator_id,
                    &session.user.name,
                    AuditAction::UserLogout,
                    format!("User {} logged out", session.user.email),
                );
            }
            None => debug!("Logout without an active session"),
        }
        Ok(previous)
    }

    pub fn current_session(&self) -> Option<Session> {
        self.sessions.current()
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::reports::ReportKind;
    use chrono::{Duration as ChronoDuration, Utc};

    fn engine(seed_inspections: usize, unsafe_probability: f64) -> Arc<Engine> {
        let mut config = Config::default();
        config.simulator.seed_inspections = seed_inspections;
        config.simulator.unsafe_probability = unsafe_probability;
        config.simulator.rng_seed = Some(7);
        Arc::new(Engine::new(config).unwrap())
    }

    fn immediate(engine: Arc<Engine>) -> MonitorApi {
        MonitorApi::new(engine, None)
            .unwrap()
            .with_latency(ApiConfig::immediate())
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_wait_simulated_latency() {
        let api = MonitorApi::new(engine(20, 0.3), None).unwrap();

        let started = tokio::time::Instant::now();
        api.dashboard_stats().await;
        assert!(started.elapsed() >= Duration::from_millis(300));

        let started = tokio::time::Instant::now();
        api.inspections(&InspectionQuery::new()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(400));

        let now = Utc::now();
        let request = ReportRequest::new(ReportKind::Defects, now - ChronoDuration::days(1), now);
        let started = tokio::time::Instant::now();
        api.report(&request).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(600));
    }

    #[tokio::test]
    async fn test_acknowledge_returns_operator_and_response_time() {
        let engine = engine(0, 1.0);
        let alert = engine.generate_inspection().unwrap().alert.unwrap();
        let api = immediate(Arc::clone(&engine));

        let result = api.acknowledge_alert(&alert.alert_id, 2).await.unwrap();
        assert_eq!(result.operator_id, 2);
        assert_eq!(
            Some(result.response_time_ms),
            engine.alert_store().get(&alert.alert_id).unwrap().response_time_ms
        );

        let err = api.acknowledge_alert(&alert.alert_id, 2).await.unwrap_err();
        assert!(matches!(err, ApiError::Monitor(MonitorError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_mutations_require_session() {
        let engine = engine(0, 1.0);
        let alert = engine.generate_inspection().unwrap().alert.unwrap();
        let api = immediate(engine);

        assert!(matches!(api.resolve_alert(&alert.alert_id).await, Err(ApiError::Unauthenticated)));
        assert!(matches!(api.toggle_operator(3).await, Err(ApiError::Unauthenticated)));

        api.login("operator@atis.com", "operator123").await.unwrap();
        assert!(matches!(api.toggle_operator(3).await, Err(ApiError::Forbidden(2))));
        let resolved = api.resolve_alert(&alert.alert_id).await.unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);
    }

    #[tokio::test]
    async fn test_admin_flow_is_audited() {
        let api = immediate(engine(0, 0.0));

        let session = api.login("ADMIN@atis.com", "admin123").await.unwrap();
        assert_eq!(session.user.operator_id, 1);

        let toggled = api.toggle_operator(4).await.unwrap();
        assert!(toggled.enabled);
        let settings = SystemSettings {
            audio_muted: true,
            ..api.settings().await
        };
        assert!(api.update_settings(settings).await.unwrap().audio_muted);
        api.logout().await.unwrap();

        let actions: Vec<_> = api.audit_logs(None).await.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::UserLogout,
                AuditAction::SettingsUpdated,
                AuditAction::UserEnabled,
                AuditAction::UserLogin,
            ]
        );
        assert_eq!(api.audit_logs(Some(1)).await.len(), 1);
        assert!(api.current_session().is_none());
    }

    #[tokio::test]
    async fn test_login_failures_are_typed() {
        let api = immediate(engine(0, 0.0));
        assert!(matches!(
            api.login("nobody@atis.com", "whatever").await,
            Err(ApiError::Auth(AuthError::NotFound))
        ));
        assert!(matches!(
            api.login("admin@atis.com", "wrong-password").await,
            Err(ApiError::Auth(AuthError::InvalidSecret))
        ));
        assert!(api.engine().audit().is_empty());
    }

    #[tokio::test]
    async fn test_missing_inspection_is_none() {
        let engine = engine(5, 0.0);
        let known = engine.ledger().snapshot()[0].clone();
        let api = immediate(engine);

        assert_eq!(api.inspection(&known.inspection_id).await, Some(known));
        assert_eq!(api.inspection("INS-0-missing").await, None);
    }

    #[tokio::test]
    async fn test_session_restored_from_database() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let engine = engine(0, 0.0);

        let api = MonitorApi::new(Arc::clone(&engine), Some(Arc::clone(&db)))
            .unwrap()
            .with_latency(ApiConfig::immediate());
        let session = api.login("operator@atis.com", "operator123").await.unwrap();

        let reopened = MonitorApi::new(engine, Some(db)).unwrap();
        assert_eq!(reopened.current_session(), Some(session));
    }
}
