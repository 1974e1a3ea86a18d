// SQLite persistence for session snapshots.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::SnapshotStorage;

/// SQLite-backed key-value store of serialized session snapshots.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS session_slots (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn save_slot(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO session_slots (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .context("failed to save session slot")?;
        Ok(())
    }

    /// Raw value stored under `key`. The text is returned unparsed so the
    /// caller decides how to treat a corrupt snapshot.
    pub fn load_slot(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT value FROM session_slots WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read session slot")
    }

    /// Bind this database to one slot key, producing a snapshot port.
    pub fn slot(self, key: impl Into<String>) -> SqliteSlot {
        SqliteSlot {
            db: self,
            key: key.into(),
        }
    }
}

/// One named snapshot slot inside a [`Database`].
pub struct SqliteSlot {
    db: Database,
    key: String,
}

impl SqliteSlot {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl SnapshotStorage for SqliteSlot {
    fn load(&self) -> Result<Option<String>> {
        self.db.load_slot(&self.key)
    }

    fn save(&self, json: &str) -> Result<()> {
        self.db.save_slot(&self.key, json)
    }
}
