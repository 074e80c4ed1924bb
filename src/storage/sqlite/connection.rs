use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::errors::{GatorError, GatorResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BLOB PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feeds (
    id BLOB PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    user_id BLOB NOT NULL,
    last_fetched_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_feeds_last_fetched_at ON feeds(last_fetched_at);

CREATE TABLE IF NOT EXISTS feed_follows (
    id BLOB PRIMARY KEY,
    user_id BLOB NOT NULL,
    feed_id BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (user_id, feed_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (feed_id) REFERENCES feeds(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS posts (
    id BLOB PRIMARY KEY,
    feed_id BLOB NOT NULL,
    title TEXT NOT NULL,
    url TEXT NOT NULL UNIQUE,
    description TEXT,
    published_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (feed_id) REFERENCES feeds(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_posts_feed_id ON posts(feed_id);
"#;

#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> GatorResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn in_memory() -> GatorResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> GatorResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, GatorError> {
        self.conn
            .lock()
            .map_err(|_| GatorError::Database(rusqlite::Error::InvalidQuery))
    }
}

/// True when `err` is SQLite rejecting a row for a UNIQUE or PRIMARY KEY clash.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_in_memory_storage() {
        let storage = SqliteStorage::in_memory().unwrap();
        let conn = storage.connection().unwrap();

        let mut stmt = conn
            .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('users', 'feeds', 'feed_follows', 'posts')")
            .unwrap();
        let count: i64 = stmt.query_row([], |row| row.get(0)).unwrap();

        assert_eq!(count, 4);
    }

    #[test]
    fn test_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gator.db");

        SqliteStorage::new(&path).unwrap();
        assert!(SqliteStorage::new(&path).is_ok());
    }

    #[test]
    fn test_unique_violation_detected() {
        let storage = SqliteStorage::in_memory().unwrap();
        let conn = storage.connection().unwrap();
        let insert = "INSERT INTO users (id, name, created_at, updated_at) VALUES (?1, 'alice', 'now', 'now')";

        conn.execute(insert, [uuid::Uuid::new_v4()]).unwrap();
        let err = conn.execute(insert, [uuid::Uuid::new_v4()]).unwrap_err();

        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&rusqlite::Error::QueryReturnedNoRows));
    }
}
