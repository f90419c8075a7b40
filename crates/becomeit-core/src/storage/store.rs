//! SQLite-backed persistence.
//!
//! One key-value table holding JSON blobs: the habit list under
//! `habits`, the stats aggregate under `stats`, and one
//! `trigger_ref:<habit-id>` row per scheduled notification trigger.

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{data_dir, PersistenceGateway};
use crate::error::{Result, StorageError};
use crate::habit::Habit;
use crate::scheduling::TriggerRef;
use crate::stats::HabitStats;

const KEY_HABITS: &str = "habits";
const KEY_STATS: &str = "stats";
const TRIGGER_REF_PREFIX: &str = "trigger_ref:";

/// SQLite store for habits, stats and trigger refs.
pub struct HabitStore {
    conn: Connection,
}

impl HabitStore {
    /// Open the store at `~/.config/becomeit/becomeit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(data_dir()?.join("becomeit.db"))
    }

    /// Open the store at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl Into<std::path::PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store. Used by tests and by callers that want
    /// a throwaway ledger.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn trigger_key(habit_id: Uuid) -> String {
        format!("{TRIGGER_REF_PREFIX}{habit_id}")
    }
}

impl PersistenceGateway for HabitStore {
    fn load_habits(&self) -> Result<Vec<Habit>> {
        match self.kv_get(KEY_HABITS)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        self.kv_set(KEY_HABITS, &serde_json::to_string(habits)?)
    }

    fn load_stats(&self) -> Result<HabitStats> {
        match self.kv_get(KEY_STATS)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(HabitStats::default()),
        }
    }

    fn save_stats(&self, stats: &HabitStats) -> Result<()> {
        self.kv_set(KEY_STATS, &serde_json::to_string(stats)?)
    }

    fn trigger_ref(&self, habit_id: Uuid) -> Result<Option<TriggerRef>> {
        Ok(self.kv_get(&Self::trigger_key(habit_id))?.map(TriggerRef::new))
    }

    fn set_trigger_ref(&self, habit_id: Uuid, trigger_ref: Option<&TriggerRef>) -> Result<()> {
        let key = Self::trigger_key(habit_id);
        match trigger_ref {
            Some(trigger_ref) => self.kv_set(&key, trigger_ref.as_str()),
            None => self.kv_delete(&key),
        }
    }

    fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }
}
