//! SQLite persistence for companies, staff, task ledgers, and KPI sets.
//!
//! Everything lives in one database file under the data dir:
//!
//! ```text
//! <root>/taskbook.sqlite
//!   company  # directory of client companies (JSON columns for shares etc.)
//!   staff    # staff roster
//!   task     # one row per (company, period, template key)
//!   kpi      # one row per (company, period, indicator)
//! ```
//!
//! Ledgers are the unit of write: `store_ledger` rewrites the whole
//! (company, period) partition in one transaction, so a ledger is never
//! partially overwritten field-by-field.

mod company;
mod kpi;
mod ledger;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("company not found: {0}")]
    CompanyNotFound(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// SQLite-backed storage rooted at the data directory.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (creating if needed) the database under the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let conn = Connection::open(root.join("taskbook.sqlite"))?;
        let storage = Self { conn };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Returns the default data root: `~/.taskbook/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".taskbook"))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS company (
                 id                TEXT PRIMARY KEY,
                 tax_id            TEXT,
                 name              TEXT NOT NULL,
                 active            INTEGER NOT NULL,
                 contract_amount   REAL NOT NULL,
                 shares            TEXT NOT NULL,
                 assignments       TEXT NOT NULL,
                 enabled_templates TEXT
             );
             CREATE TABLE IF NOT EXISTS staff (
                 id   TEXT PRIMARY KEY,
                 name TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS task (
                 company_id   TEXT NOT NULL,
                 period       TEXT NOT NULL,
                 template_key TEXT NOT NULL,
                 status       TEXT NOT NULL,
                 raw_value    TEXT,
                 created_at   TEXT NOT NULL,
                 updated_at   TEXT NOT NULL,
                 PRIMARY KEY (company_id, period, template_key)
             );
             CREATE TABLE IF NOT EXISTS kpi (
                 company_id TEXT NOT NULL,
                 period     TEXT NOT NULL,
                 indicator  TEXT NOT NULL,
                 satisfied  INTEGER NOT NULL,
                 PRIMARY KEY (company_id, period, indicator)
             );",
        )?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

/// Parse a stored UUID column.
pub(crate) fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    raw.parse()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

/// Parse a stored timestamp column.
pub(crate) fn parse_timestamp(raw: &str, what: &str) -> Result<jiff::Timestamp> {
    raw.parse()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}
