use crate::error::{GeoIndexError, Result};
use crate::layout::GeoKey;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS state_counts (
    yeartxt  TEXT NOT NULL,
    maketxt  TEXT NOT NULL,
    modeltxt TEXT NOT NULL,
    state    TEXT NOT NULL,
    count    INTEGER NOT NULL,
    PRIMARY KEY (yeartxt, maketxt, modeltxt, state)
);

CREATE INDEX IF NOT EXISTS idx_state_counts_vehicle
    ON state_counts(yeartxt, maketxt, modeltxt);
";

/// One stored (year, make, model, state) count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCount {
    pub key: GeoKey,
    pub count: u64,
}

/// Total count for one stored model spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVariant {
    pub model_text: String,
    pub total: u64,
}

/// Persistent, append-only count table.
///
/// Counts only grow: [`GeoCountStore::accumulate`] adds to whatever is
/// already stored, so feeding the same input twice counts it twice.
pub struct GeoCountStore {
    conn: Mutex<Connection>,
}

impl GeoCountStore {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening geo index at {}", path.display());

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        Self::init(Connection::open(path)?)
    }

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

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| GeoIndexError::Poisoned)
    }

    /// Add each group's count to the stored total in one transaction.
    ///
    /// The increment happens inside SQLite, so overlapping writers on the
    /// same key cannot lose updates. Returns the number of groups applied.
    pub fn accumulate(&self, groups: &HashMap<GeoKey, u64>) -> Result<usize> {
        if groups.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO state_counts (yeartxt, maketxt, modeltxt, state, count)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(yeartxt, maketxt, modeltxt, state)
                 DO UPDATE SET count = state_counts.count + excluded.count",
            )?;
            for (key, count) in groups {
                stmt.execute(params![
                    key.year_text,
                    key.make_text,
                    key.model_text,
                    key.state,
                    i64::try_from(*count).unwrap_or(i64::MAX),
                ])?;
            }
        }
        tx.commit()?;

        debug!("Accumulated {} groups", groups.len());
        Ok(groups.len())
    }

    /// Every stored count for an exact (year, make) pair.
    pub fn candidates(&self, year_text: &str, make_text: &str) -> Result<Vec<GeoCount>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT yeartxt, maketxt, modeltxt, state, count
             FROM state_counts
             WHERE yeartxt = ?1 AND maketxt = ?2",
        )?;

        let rows = stmt
            .query_map(params![year_text, make_text], |row| {
                Ok(GeoCount {
                    key: GeoKey {
                        year_text: row.get(0)?,
                        make_text: row.get(1)?,
                        model_text: row.get(2)?,
                        state: row.get(3)?,
                    },
                    count: u64::try_from(row.get::<_, i64>(4)?).unwrap_or(0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Stored model spellings for (year, make), largest total first.
    pub fn model_variants(
        &self,
        year_text: &str,
        make_text: &str,
        limit: usize,
    ) -> Result<Vec<ModelVariant>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT modeltxt, SUM(count) AS total
             FROM state_counts
             WHERE yeartxt = ?1 AND maketxt = ?2
             GROUP BY modeltxt
             ORDER BY total DESC, modeltxt ASC
             LIMIT ?3",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![year_text, make_text, limit], |row| {
                Ok(ModelVariant {
                    model_text: row.get(0)?,
                    total: u64::try_from(row.get::<_, i64>(1)?).unwrap_or(0),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Number of stored keys.
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM state_counts", [], |row| row.get(0))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Stored count for one exact key; zero when absent.
    pub fn count(&self, key: &GeoKey) -> Result<u64> {
        let conn = self.conn()?;
        let n: Option<i64> = conn
            .query_row(
                "SELECT count FROM state_counts
                 WHERE yeartxt = ?1 AND maketxt = ?2 AND modeltxt = ?3 AND state = ?4",
                params![key.year_text, key.make_text, key.model_text, key.state],
                |row| row.get(0),
            )
            .optional()?;
        Ok(n.and_then(|n| u64::try_from(n).ok()).unwrap_or(0))
    }
}
