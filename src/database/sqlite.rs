use std::sync::Arc;

use log::info;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OptionalExtension;

use crate::timing::schedule::Schedule;

use super::error::StoreError;

/// Fixed key the single schedule record is stored under.
pub const SCHEDULE_KEY: &str = "restaurant_schedule_settings";

/// Durable home of the one schedule record.
///
/// Both operations work on the whole record. Readers see either the previous or
/// the new schedule, never a mix of the two.
pub trait ScheduleStore: Send + Sync {
    fn load(&self) -> Result<Schedule, StoreError>;
    fn save(&self, schedule: &Schedule) -> Result<(), StoreError>;
}

pub struct SqliteScheduleStore {
    connection_pool: Arc<Pool<SqliteConnectionManager>>,
}

impl SqliteScheduleStore {
    pub fn setup(connection_pool: Arc<Pool<SqliteConnectionManager>>) -> Result<Self, StoreError> {
        let store = Self { connection_pool };
        store.create_table()?;
        Ok(store)
    }

    fn get_connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.connection_pool.get()?)
    }

    fn create_table(&self) -> Result<(), StoreError> {
        let connection = self.get_connection()?;
        connection.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            (),
        )?;
        Ok(())
    }
}

impl ScheduleStore for SqliteScheduleStore {
    /**
    Read the stored schedule.

    Returns an empty schedule when nothing has been saved yet.
    Days or holidays missing from the stored JSON come back empty.
    */
    fn load(&self) -> Result<Schedule, StoreError> {
        let connection = self.get_connection()?;
        let value: Option<String> = connection
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                rusqlite::params![SCHEDULE_KEY],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(Schedule::new()),
        }
    }

    /**
    Replace the stored schedule.

    A single upsert statement, so the record is swapped as a whole.
    */
    fn save(&self, schedule: &Schedule) -> Result<(), StoreError> {
        let value = serde_json::to_string(schedule)?;
        let connection = self.get_connection()?;
        connection.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![SCHEDULE_KEY, value],
        )?;
        info!("Schedule saved ({} holidays)", schedule.holidays().len());
        Ok(())
    }
}

#[cfg(test)]
pub mod tests {
    use serde_json::json;

    use super::*;
    use crate::{sanitizer::schedule::sanitize_schedule, timing::week_day::WeekDay};

    /// In-memory databases are per connection, so the pool holds exactly one.
    pub fn memory_store() -> SqliteScheduleStore {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager).unwrap();
        SqliteScheduleStore::setup(Arc::new(pool)).unwrap()
    }

    #[test]
    fn empty_database_loads_default_schedule() {
        let store = memory_store();
        assert_eq!(store.load().unwrap(), Schedule::new());
    }

    #[test]
    fn saved_schedule_loads_back() {
        let store = memory_store();
        let schedule = sanitize_schedule(&json!({
            "monday": [{"start": "22:00", "end": "02:00"}],
            "holidays": ["2024-12-25"],
        }));
        store.save(&schedule).unwrap();
        assert_eq!(store.load().unwrap(), schedule);
    }

    #[test]
    fn save_replaces_the_whole_record() {
        let store = memory_store();
        store
            .save(&sanitize_schedule(&json!({
                "monday": [{"start": "09:00", "end": "17:00"}],
                "holidays": ["2024-12-25"],
            })))
            .unwrap();
        let replacement = sanitize_schedule(&json!({"tuesday": [{"start": "10:00", "end": "11:00"}]}));
        store.save(&replacement).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, replacement);
        assert!(loaded.ranges(WeekDay::Monday).is_empty());
        assert!(loaded.holidays().is_empty());
    }

    #[test]
    fn partial_record_fills_missing_days() {
        let store = memory_store();
        store
            .get_connection()
            .unwrap()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)",
                rusqlite::params![SCHEDULE_KEY, r#"{"sunday": [{"start": "12:00", "end": "15:00"}]}"#],
            )
            .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.ranges(WeekDay::Sunday).len(), 1);
        assert!(loaded.holidays().is_empty());
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let store = memory_store();
        store
            .get_connection()
            .unwrap()
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, 'not json')",
                rusqlite::params![SCHEDULE_KEY],
            )
            .unwrap();
        assert!(matches!(store.load(), Err(StoreError::Serde(_))));
    }
}
