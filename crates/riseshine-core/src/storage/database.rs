//! SQLite-backed key-value storage.
//!
//! The task list lives as one JSON document under [`TIMER_STORAGE_KEY`],
//! mirroring a browser-style local store.

use std::path::Path;

use rusqlite::{params, Connection};

use super::{data_dir, TaskStore};
use crate::error::StorageError;
use crate::routine::Timer;

pub const TIMER_STORAGE_KEY: &str = "rise_and_shine_timers";

/// SQLite database holding the kv table.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/riseshine/riseshine.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(&data_dir()?.join("riseshine.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
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

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl TaskStore for Database {
    /// A document that no longer parses reads as an empty list so the app
    /// stays usable; the next write replaces it.
    fn list(&self) -> Result<Vec<Timer>, StorageError> {
        let Some(json) = self.kv_get(TIMER_STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json) {
            Ok(timers) => Ok(timers),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load timers, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn replace_all(&mut self, timers: &[Timer]) -> Result<(), StorageError> {
        let json = serde_json::to_string(timers).map_err(|e| StorageError::Corrupt {
            key: TIMER_STORAGE_KEY.into(),
            message: e.to_string(),
        })?;
        self.kv_set(TIMER_STORAGE_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::{SoundType, ThemeColor};

    fn timer(id: &str, name: &str) -> Timer {
        Timer {
            id: id.into(),
            task_name: name.into(),
            duration_sec: 90,
            image_uri: "https://example.com/x.png".into(),
            theme_color: ThemeColor::Green,
            sound_type: SoundType::Chimes,
            last_completed: None,
        }
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn upsert_replaces_in_place_and_appends_new() {
        let mut db = Database::open_memory().unwrap();
        db.upsert(timer("a", "Teeth")).unwrap();
        db.upsert(timer("b", "Shoes")).unwrap();
        let list = db.upsert(timer("a", "Brush Teeth")).unwrap();

        let names: Vec<_> = list.iter().map(|t| t.task_name.as_str()).collect();
        assert_eq!(names, ["Brush Teeth", "Shoes"]);
    }

    #[test]
    fn remove_and_clear_marks() {
        let mut db = Database::open_memory().unwrap();
        let mut done = timer("a", "Teeth");
        done.mark_completed(1_700_000_000_000);
        db.upsert(done).unwrap();
        db.upsert(timer("b", "Shoes")).unwrap();

        let cleared = db.clear_all_completion_marks().unwrap();
        assert!(cleared.iter().all(|t| t.last_completed.is_none()));

        let remaining = db.remove("a").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, "b");
        assert_eq!(db.remove("missing").unwrap().len(), 1);
    }

    #[test]
    fn corrupt_document_reads_as_empty() {
        let mut db = Database::open_memory().unwrap();
        db.kv_set(TIMER_STORAGE_KEY, "{not json").unwrap();
        assert!(db.list().unwrap().is_empty());

        let list = db.upsert(timer("a", "Teeth")).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("riseshine.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            db.upsert(timer("a", "Teeth")).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.list().unwrap()[0].task_name, "Teeth");
    }
}
