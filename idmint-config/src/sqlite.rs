//! Persistent configuration store backed by SQLite.
//!
//! Records are kept as JSON text in a single `config` table, keyed by their
//! fully-qualified name.

use crate::error::{ConfigError, ConfigResult};
use crate::store::ConfigStore;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

const UPSERT: &str = "INSERT INTO config (name, data) VALUES (?1, ?2)
     ON CONFLICT(name) DO UPDATE SET data = excluded.data";

/// SQLite-backed [`ConfigStore`].
pub struct SqliteConfigStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConfigStore {
    /// Opens (or creates) a configuration store at the given path.
    pub fn new(path: &Path) -> ConfigResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| ConfigError::Store(format!("failed to open config store: {e}")))?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory configuration store (for testing).
    pub fn open_in_memory() -> ConfigResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            ConfigError::Store(format!("failed to open in-memory config store: {e}"))
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> ConfigResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS config (
                name TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| ConfigError::Store(format!("failed to init config schema: {e}")))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> ConfigResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ConfigError::Store("config store lock poisoned".to_string()))
    }

    /// Inserts or replaces a record.
    pub fn put(&self, name: &str, record: &Value) -> ConfigResult<()> {
        let data = serde_json::to_string(record)?;
        self.lock()?.execute(UPSERT, params![name, data])?;
        Ok(())
    }

    /// Upserts every record of a JSON object of named records in one
    /// transaction. Returns the number of records written.
    pub fn import(&self, records: Value) -> ConfigResult<usize> {
        let Value::Object(records) = records else {
            return Err(ConfigError::Invalid {
                key: "<root>".to_string(),
                reason: "expected an object of named records".to_string(),
            });
        };

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (name, record) in &records {
            tx.execute(UPSERT, params![name, serde_json::to_string(record)?])?;
        }
        tx.commit()?;

        debug!(count = records.len(), "Imported configuration records");
        Ok(records.len())
    }
}

impl ConfigStore for SqliteConfigStore {
    fn get(&self, name: &str) -> ConfigResult<Option<Value>> {
        let data: Option<String> = self
            .lock()?
            .query_row(
                "SELECT data FROM config WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| ConfigError::Invalid {
                    key: name.to_string(),
                    reason: format!("stored record is not JSON: {e}"),
                }),
            None => Ok(None),
        }
    }
}
