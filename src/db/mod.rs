// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/atis-rs

//! Database module for persistent storage.
//!
//! Persisted state is opaque key-value data scoped by a namespace key per
//! store (`atis-auth`, `atis-settings`), stored as JSON text in sqlite.

mod settings;

pub use settings::*;

use anyhow::Result;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// Database manager
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&config.path)?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        "#,
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.create_tables()?;

        info!("Database opened at {:?}", config.path);
        Ok(db)
    }

    /// Throwaway database for tests and ephemeral runs
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                namespace TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    /// Replace the value stored under `namespace`
    pub fn put(&self, namespace: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO kv_store (namespace, value, updated_at) VALUES (?1, ?2, ?3)",
            params![namespace, value, Utc::now().to_rfc3339()],
        )?;
        debug!(namespace, "Stored value");
        Ok(())
    }

    pub fn get(&self, namespace: &str) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1",
                params![namespace],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Remove `namespace`. Returns whether anything was stored.
    pub fn delete(&self, namespace: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM kv_store WHERE namespace = ?1", params![namespace])?;
        Ok(removed > 0)
    }

    pub fn put_json<T: Serialize>(&self, namespace: &str, value: &T) -> Result<()> {
        self.put(namespace, &serde_json::to_string(value)?)
    }

    pub fn get_json<T: DeserializeOwned>(&self, namespace: &str) -> Result<Option<T>> {
        match self.get(namespace)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    pub fn namespaces(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT namespace FROM kv_store ORDER BY namespace")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row?);
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_put_get_delete() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("missing").unwrap(), None);

        db.put("ns", "one").unwrap();
        db.put("ns", "two").unwrap();
        assert_eq!(db.get("ns").unwrap().as_deref(), Some("two"));
        assert_eq!(db.namespaces().unwrap(), vec!["ns"]);

        assert!(db.delete("ns").unwrap());
        assert!(!db.delete("ns").unwrap());
    }

    #[test]
    fn test_json_values() {
        let db = Database::open_in_memory().unwrap();
        let sample = Sample {
            name: "gate".to_string(),
            count: 3,
        };
        db.put_json("sample", &sample).unwrap();
        assert_eq!(db.get_json::<Sample>("sample").unwrap(), Some(sample));

        db.put("broken", "{not json").unwrap();
        assert!(db.get_json::<Sample>("broken").is_err());
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            path: dir.path().join("nested").join("atis.db"),
        };

        Database::open(&config).unwrap().put("atis-settings", "{}").unwrap();
        let reopened = Database::open(&config).unwrap();
        assert_eq!(reopened.get("atis-settings").unwrap().as_deref(), Some("{}"));
    }
}
