// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Authentication and session management

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use anyhow::{anyhow, bail, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::{secure_random_bytes, Operator, OperatorDirectory, SecurityConfig};
use crate::db::Database;

/// Namespace key the active session is stored under
pub const AUTH_NAMESPACE: &str = "atis-auth";

/// Typed credential-check failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("User not found")]
    NotFound,

    #[error("Invalid password")]
    InvalidSecret,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Credential check timed out")]
    Timeout,

    #[error("Authentication failed: {0}")]
    Internal(String),
}

/// Checks an (identifier, secret) pair and yields the operator behind it
#[async_trait]
pub trait CredentialCheck: Send + Sync {
    async fn check(&self, identifier: &str, secret: &str) -> std::result::Result<Operator, AuthError>;
}

struct Credential {
    operator_id: u32,
    hash: String,
}

/// Argon2-backed credential store. Identifiers are matched
/// case-insensitively; account state comes from the operator directory.
pub struct CredentialStore {
    credentials: RwLock<HashMap<String, Credential>>,
    directory: Arc<OperatorDirectory>,
    timeout: StdDuration,
    min_password_length: usize,
}

impl CredentialStore {
    pub fn new(directory: Arc<OperatorDirectory>, config: &SecurityConfig) -> Self {
        Self {
            credentials: RwLock::new(HashMap::new()),
            directory,
            timeout: StdDuration::from_millis(config.credential_timeout_ms),
            min_password_length: config.min_password_length,
        }
    }

    /// Store with the two demo sign-ins
    pub fn with_demo_accounts(directory: Arc<OperatorDirectory>, config: &SecurityConfig) -> Result<Self> {
        let store = Self::new(directory, config);
        store.register("admin@atis.com", "admin123")?;
        store.register("operator@atis.com", "operator123")?;
        Ok(store)
    }

    /// Set the password of the directory account with `email`
    pub fn register(&self, email: &str, password: &str) -> Result<()> {
        if password.len() < self.min_password_length {
            bail!(
                "Password should be at least {} characters",
                self.min_password_length
            );
        }
        let operator = self
            .directory
            .find_by_email(email)
            .ok_or_else(|| anyhow!("no operator with email {}", email))?;

        let hash = hash_password(password)?;
        self.credentials.write().insert(
            email.to_lowercase(),
            Credential {
                operator_id: operator.operator_id,
                hash,
            },
        );
        debug!(operator_id = operator.operator_id, "Credential registered");
        Ok(())
    }

    /// [`CredentialCheck::check`] bounded by the configured timeout
    pub async fn check_with_timeout(
        &self,
        identifier: &str,
        secret: &str,
    ) -> std::result::Result<Operator, AuthError> {
        check_within(self, self.timeout, identifier, secret).await
    }
}

/// Run `credentials.check`, failing with [`AuthError::Timeout`] once
/// `timeout` elapses
pub async fn check_within<C>(
    credentials: &C,
    timeout: StdDuration,
    identifier: &str,
    secret: &str,
) -> std::result::Result<Operator, AuthError>
where
    C: CredentialCheck + ?Sized,
{
    match tokio::time::timeout(timeout, credentials.check(identifier, secret)).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Credential check timed out after {:?}", timeout);
            Err(AuthError::Timeout)
        }
    }
}

#[async_trait]
impl CredentialCheck for CredentialStore {
    async fn check(&self, identifier: &str, secret: &str) -> std::result::Result<Operator, AuthError> {
        let (operator_id, hash) = {
            let credentials = self.credentials.read();
            let credential = credentials
                .get(&identifier.to_lowercase())
                .ok_or(AuthError::NotFound)?;
            (credential.operator_id, credential.hash.clone())
        };

        let secret = Zeroizing::new(secret.to_string());
        let verified = tokio::task::spawn_blocking(move || verify_password(&secret, &hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !verified {
            return Err(AuthError::InvalidSecret);
        }

        let operator = self
            .directory
            .get(operator_id)
            .map_err(|_| AuthError::NotFound)?;
        if !operator.enabled {
            return Err(AuthError::AccountDisabled);
        }
        Ok(operator)
    }
}

/// Hash password using Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}

/// Verify password against hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| anyhow!("Invalid hash format: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Signed-in operator session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: Operator,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Holds the single active session and mirrors it to the database
pub struct SessionManager {
    current: RwLock<Option<Session>>,
    db: Option<Arc<Database>>,
    session_timeout: Duration,
    credential_timeout: StdDuration,
}

impl SessionManager {
    pub fn new(config: &SecurityConfig, db: Option<Arc<Database>>) -> Self {
        Self {
            current: RwLock::new(None),
            db,
            session_timeout: Duration::seconds(config.session_timeout_secs as i64),
            credential_timeout: StdDuration::from_millis(config.credential_timeout_ms),
        }
    }

    /// Manager resuming whatever session was persisted, if still valid
    pub fn restore(config: &SecurityConfig, db: Arc<Database>) -> Result<Self> {
        let stored = db.get_json::<Option<Session>>(AUTH_NAMESPACE)?.flatten();
        let manager = Self::new(config, Some(db));
        if let Some(session) = stored.filter(|s| !s.is_expired(Utc::now())) {
            info!(operator_id = session.user.operator_id, "Restored session");
            *manager.current.write() = Some(session);
        }
        Ok(manager)
    }

    /// Check credentials, bounded by the credential timeout, and open a new
    /// session replacing any current one
    pub async fn login<C>(
        &self,
        credentials: &C,
        identifier: &str,
        secret: &str,
    ) -> std::result::Result<Session, AuthError>
    where
        C: CredentialCheck + ?Sized,
    {
        let user = match check_within(credentials, self.credential_timeout, identifier, secret).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Login rejected");
                return Err(e);
            }
        };

        let now = Utc::now();
        let session = Session {
            token: generate_session_token().map_err(|e| AuthError::Internal(e.to_string()))?,
            user,
            created_at: now,
            expires_at: now + self.session_timeout,
        };
        self.persist(Some(&session))
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        *self.current.write() = Some(session.clone());

        info!(operator_id = session.user.operator_id, "Operator signed in");
        Ok(session)
    }

    /// End the current session, returning it
    pub fn logout(&self) -> Result<Option<Session>> {
        let previous = self.current.write().take();
        self.persist(None)?;
        if let Some(ref session) = previous {
            info!(operator_id = session.user.operator_id, "Operator signed out");
        }
        Ok(previous)
    }

    /// Active, unexpired session
    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .as_ref()
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    /// Session matching `token`, if it is the active one
    pub fn validate(&self, token: &str) -> Option<Session> {
        self.current().filter(|s| s.token == token)
    }

    fn persist(&self, session: Option<&Session>) -> Result<()> {
        if let Some(db) = &self.db {
            db.put_json(AUTH_NAMESPACE, &session)?;
        }
        Ok(())
    }
}

/// Generate secure session token
pub fn generate_session_token() -> Result<String> {
    use base64::Engine;

    let bytes = secure_random_bytes(32)?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SecurityConfig {
        SecurityConfig::default()
    }

    fn demo_store() -> CredentialStore {
        CredentialStore::with_demo_accounts(Arc::new(OperatorDirectory::seeded()), &config()).unwrap()
    }

    #[test]
    fn test_password_hash_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
        assert!(verify_password(password, "not-a-hash").is_err());
    }

    #[tokio::test]
    async fn test_credential_outcomes() {
        let store = demo_store();

        let admin = store.check("Admin@ATIS.com", "admin123").await.unwrap();
        assert_eq!(admin.operator_id, 1);
        assert_eq!(store.check("nobody@atis.com", "x").await, Err(AuthError::NotFound));
        assert_eq!(
            store.check("operator@atis.com", "admin123").await,
            Err(AuthError::InvalidSecret)
        );
    }

    #[tokio::test]
    async fn test_disabled_account_rejected() {
        let directory = Arc::new(OperatorDirectory::seeded());
        let store = CredentialStore::new(Arc::clone(&directory), &config());
        store.register("mike@atis.com", "wilson-pass").unwrap();

        assert_eq!(
            store.check_with_timeout("mike@atis.com", "wilson-pass").await,
            Err(AuthError::AccountDisabled)
        );
        directory.set_enabled(4, true).unwrap();
        assert!(store.check_with_timeout("mike@atis.com", "wilson-pass").await.is_ok());
    }

    #[test]
    fn test_register_enforces_length() {
        let store = CredentialStore::new(Arc::new(OperatorDirectory::seeded()), &config());
        assert!(store.register("sarah@atis.com", "short").is_err());
        assert!(store.register("ghost@atis.com", "long-enough").is_err());
    }

    struct Stalled;

    #[async_trait]
    impl CredentialCheck for Stalled {
        async fn check(&self, _: &str, _: &str) -> std::result::Result<Operator, AuthError> {
            tokio::time::sleep(StdDuration::from_secs(3600)).await;
            Err(AuthError::NotFound)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_bounds_check() {
        let result = check_within(&Stalled, StdDuration::from_millis(2_000), "a", "b").await;
        assert_eq!(result, Err(AuthError::Timeout));

        let sessions = SessionManager::new(&config(), None);
        assert_eq!(sessions.login(&Stalled, "a", "b").await, Err(AuthError::Timeout));
        assert!(!sessions.is_authenticated());
    }

    #[tokio::test]
    async fn test_session_lifecycle_persisted() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let store = demo_store();
        let sessions = SessionManager::new(&config(), Some(Arc::clone(&db)));

        assert!(sessions.login(&store, "operator@atis.com", "nope").await.is_err());
        assert!(!sessions.is_authenticated());

        let session = sessions.login(&store, "operator@atis.com", "operator123").await.unwrap();
        assert_eq!(session.user.operator_id, 2);
        assert!(sessions.validate(&session.token).is_some());
        assert!(sessions.validate("forged").is_none());

        let restored = SessionManager::restore(&config(), Arc::clone(&db)).unwrap();
        assert_eq!(restored.current(), Some(session.clone()));

        assert_eq!(sessions.logout().unwrap(), Some(session));
        let after_logout = SessionManager::restore(&config(), db).unwrap();
        assert!(after_logout.current().is_none());
    }

    #[test]
    fn test_session_tokens_unique() {
        let a = generate_session_token().unwrap();
        let b = generate_session_token().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
    }
}
