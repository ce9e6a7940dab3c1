use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

/// Fixed keys under which the schedule and preferences are persisted.
pub mod keys {
    pub const PRAYER_TIMES: &str = "prayer_times";
    pub const CALCULATION_METHOD: &str = "calculation_method";
}

/// String key/value persistence. Anything satisfying `get`/`set` can back
/// the schedule store.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

// ─── SQLite ─────────────────────────────────────────────────────────────────

pub struct SqliteKv<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteKv<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKv<'_> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM app_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(anyhow::Error::from)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO app_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

// ─── In-memory ──────────────────────────────────────────────────────────────

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
