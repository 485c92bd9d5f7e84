use crate::app::ports::KeyValueStore;
use crate::common::constants::SQLITE_FILE_NAME;
use crate::common::error::{Result, SwipeError};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Slots kept in a single SQLite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open_at_root<P: AsRef<Path>>(data_root: P) -> Result<Self> {
        let db_path = data_root.as_ref().join(SQLITE_FILE_NAME);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&db_path).map_err(|e| SwipeError::persistence("*", e))?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS kv_slots (
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                updated_at  INTEGER NOT NULL
            );
            "#,
        )
        .map_err(|e| SwipeError::persistence("*", e))?;
        debug!("Opened sqlite store at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|e| SwipeError::persistence(key, e))?;
        let mut stmt = conn
            .prepare("SELECT value FROM kv_slots WHERE key = ?1")
            .map_err(|e| SwipeError::persistence(key, e))?;
        let mut rows = stmt
            .query(params![key])
            .map_err(|e| SwipeError::persistence(key, e))?;
        let value = match rows.next().map_err(|e| SwipeError::persistence(key, e))? {
            Some(row) => Some(row.get::<_, String>(0).map_err(|e| SwipeError::persistence(key, e))?),
            None => None,
        };
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let conn = self.conn.lock().map_err(|e| SwipeError::persistence(key, e))?;
        conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
            params![key, value, now],
        )
        .map_err(|e| SwipeError::persistence(key, e))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn upserts_and_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = SqliteStore::open_at_root(dir.path()).unwrap();
            assert_eq!(store.get("myMatches").unwrap(), None);
            store.set("myMatches", "[]").unwrap();
            store.set("myMatches", r#"[{"id":1}]"#).unwrap();
        }
        let store = SqliteStore::open_at_root(dir.path()).unwrap();
        assert_eq!(store.get("myMatches").unwrap().as_deref(), Some(r#"[{"id":1}]"#));
        assert_eq!(store.get("stats").unwrap(), None);
    }
}
