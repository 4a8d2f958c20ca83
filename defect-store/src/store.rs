use crate::error::{Result, StoreError};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS vehicle_cache (
    model_year      INTEGER NOT NULL,
    make            TEXT NOT NULL,
    model           TEXT NOT NULL,
    fetched_at      TEXT NOT NULL,
    recalls_json    TEXT NOT NULL,
    complaints_json TEXT NOT NULL,
    PRIMARY KEY (model_year, make, model)
);

CREATE TABLE IF NOT EXISTS complaints_flat (
    odi_number TEXT PRIMARY KEY,
    model_year INTEGER NOT NULL,
    make       TEXT NOT NULL,
    model      TEXT NOT NULL,
    date_filed TEXT,
    state      TEXT,
    crash      INTEGER NOT NULL,
    fire       INTEGER NOT NULL,
    injuries   INTEGER NOT NULL,
    deaths     INTEGER NOT NULL,
    components TEXT NOT NULL,
    summary    TEXT NOT NULL,
    raw_json   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_complaints_flat_vehicle
    ON complaints_flat(model_year, make, model);
";

/// Handle to the SQLite file behind the payload cache and the flattened
/// complaint table.
///
/// The caller opens it, passes it by reference to [`crate::CacheStore`] and
/// [`crate::ComplaintFlattener`], and drops it to close. The handle is
/// `Send + Sync`; separate processes may open the same file, and SQLite's
/// WAL mode gives them single-writer/many-reader access.
pub struct DefectStore {
    conn: Mutex<Connection>,
}

impl DefectStore {
    /// Open (or create) the store at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening defect store at {}", path.display());

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run `f` inside an IMMEDIATE transaction. Commits on Ok; the
    /// transaction rolls back when dropped on Err.
    pub(crate) fn write<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
