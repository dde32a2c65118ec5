//! SQLite storage medium.
//!
//! Envelopes live in a single `records` table keyed by name. Writes use an
//! upsert so the previous envelope is replaced in one statement; SQLite's
//! own journaling keeps a failed write from leaving a torn row behind.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::medium::StorageMedium;
use crate::error::{GlossError, Result};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    name TEXT PRIMARY KEY,
    envelope TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// File-backed (or in-memory) SQLite medium.
#[derive(Clone)]
pub struct SqliteMedium {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMedium {
    /// Open (creating if needed) a store database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `GlossError::StorageUnavailable` if the parent directory or the
    /// database cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    GlossError::StorageUnavailable(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| {
                GlossError::StorageUnavailable("SQLite connection poisoned".to_string())
            })?;
            f(&guard)
        })
        .await
        .map_err(|e| GlossError::StorageUnavailable(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl StorageMedium for SqliteMedium {
    async fn read(&self, name: &str) -> Result<Option<String>> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            let envelope = conn
                .query_row(
                    "SELECT envelope FROM records WHERE name = ?1",
                    params![name],
                    |row| row.get::<_, String>(0),
                )
                .optional()?;
            Ok(envelope)
        })
        .await
    }

    async fn write(&self, name: &str, envelope: &str) -> Result<()> {
        let name = name.to_string();
        let envelope = envelope.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                r#"
                INSERT INTO records (name, envelope, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name) DO UPDATE SET
                    envelope = excluded.envelope,
                    updated_at = excluded.updated_at
                "#,
                params![name, envelope, Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            conn.execute("DELETE FROM records WHERE name = ?1", params![name])?;
            Ok(())
        })
        .await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM records WHERE substr(name, 1, length(?1)) = ?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![prefix], |row| row.get::<_, String>(0))?;
            let mut names = Vec::new();
            for row in rows {
                names.push(row?);
            }
            Ok(names)
        })
        .await
    }
}
