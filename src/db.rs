use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::debug;

use crate::error::Result;

/// Single-table key/value storage; the whole note list lives under one key.
pub struct Database {
    connection: Connection,
}

impl Database {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Database> {
        let conn = Connection::open(db_path.as_ref())?;
        debug!(path = %db_path.as_ref().display(), "opened storage");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Database> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Opens an existing storage file without write access; writes fail with an error.
    #[cfg(test)]
    pub fn open_read_only(db_path: impl AsRef<Path>) -> Result<Database> {
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Database { connection: conn })
    }

    fn init(conn: Connection) -> Result<Database> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Database { connection: conn })
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .connection
            .query_row(
                "SELECT value FROM storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.connection.execute(
            "INSERT INTO storage (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        debug!(key, bytes = value.len(), "wrote storage item");

        Ok(())
    }
}
