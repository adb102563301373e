//! Database connection management

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::kv::KeyValueStore;
use super::migrations;
use crate::error::{Error, Result};

/// SQLite-backed durable key-value storage
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let database = Self { conn };
        database.configure(true)?;
        database.migrate()?;
        Ok(database)
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let database = Self { conn };
        database.configure(false)?;
        database.migrate()?;
        Ok(database)
    }

    fn configure(&self, on_disk: bool) -> Result<()> {
        if on_disk {
            // journal_mode answers with a row; failure only costs concurrency
            self.conn
                .query_row("PRAGMA journal_mode = WAL;", [], |row| {
                    row.get::<_, String>(0)
                })
                .ok();
        }
        self.conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        migrations::run(&self.conn)
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?, ?)",
                params![key, value],
            )
            .map_err(storage_error)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?", params![key])
            .map_err(storage_error)?;
        Ok(())
    }
}

fn storage_error(error: rusqlite::Error) -> Error {
    Error::StorageUnavailable(error.to_string())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_open_in_memory_creates_kv_table() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_get_remove() {
        let db = Database::open_in_memory().unwrap();
        db.set("remoteUser", "octo").unwrap();
        assert_eq!(db.get("remoteUser").unwrap().as_deref(), Some("octo"));

        db.set("remoteUser", "cat").unwrap();
        assert_eq!(db.get("remoteUser").unwrap().as_deref(), Some("cat"));

        db.remove("remoteUser").unwrap();
        assert_eq!(db.get("remoteUser").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("patients.db");

        {
            let db = Database::open(&path).unwrap();
            db.set("patients", "[]").unwrap();
        }

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get("patients").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_dropped_table_surfaces_storage_unavailable() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute_batch("DROP TABLE kv_store;")
            .unwrap();

        assert!(matches!(
            db.set("patients", "[]"),
            Err(Error::StorageUnavailable(_))
        ));
    }
}
