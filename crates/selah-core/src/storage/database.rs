//! SQLite-backed settings store.
//!
//! A single `kv` table holds every persisted record: reminder categories,
//! the per-note reminder map, and the delivery log. Values are opaque
//! strings at this layer; the reminder modules decide their encoding.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::StoreError;

use super::{data_dir, SettingsStore};

/// SQLite database implementing [`SettingsStore`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/selah/selah.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        let path = data_dir()?.join("selah.db");
        Self::open_at(&path)
    }

    /// Open the database at an explicit path. Embedding hosts use this to
    /// keep the store inside their own data directory.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }
}

impl SettingsStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let result = self
            .conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .and_then(|mut stmt| stmt.query_row(params![key], |row| row.get::<_, String>(0)));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| StoreError::WriteFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.get("test").unwrap().is_none());
        db.set("test", "hello").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn kv_replace_overwrites() {
        let db = Database::open_memory().unwrap();
        db.set("test", "first").unwrap();
        db.set("test", "second").unwrap();
        assert_eq!(db.get("test").unwrap().unwrap(), "second");
    }
}
