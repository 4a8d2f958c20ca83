use crate::error::Result;
use crate::store::DefectStore;
use chrono::NaiveDate;
use log::{debug, info, warn};
use recallscope_records::{FlatComplaint, ProviderPayload, VehicleKey};
use rusqlite::{OptionalExtension, Row, params};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "odi_number, model_year, make, model, date_filed, state,
    crash, fire, injuries, deaths, components, summary, raw_json";

/// Turns raw complaint payloads into [`FlatComplaint`] rows and keeps at
/// most one row per record id.
pub struct ComplaintFlattener<'a> {
    store: &'a DefectStore,
}

impl<'a> ComplaintFlattener<'a> {
    pub fn new(store: &'a DefectStore) -> Self {
        Self { store }
    }

    /// Flatten every record of `payload` and insert-or-replace it by id.
    ///
    /// Returns how many rows were written. Records without an id are
    /// skipped, and a failed payload writes nothing. The whole payload is
    /// applied in one transaction.
    pub fn upsert(&self, key: &VehicleKey, payload: &ProviderPayload) -> Result<usize> {
        if let Some(reason) = payload.failure_reason() {
            warn!("Not flattening failed complaints payload for {key}: {reason}");
            return Ok(0);
        }

        let mut skipped = 0usize;
        let rows: Vec<FlatComplaint> = payload
            .records()
            .filter_map(|record| {
                let row = FlatComplaint::from_record(key, record);
                if row.is_none() {
                    skipped += 1;
                }
                row
            })
            .collect();

        if skipped > 0 {
            debug!("Skipped {skipped} complaint records without an id for {key}");
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let written = self.store.write(|tx| {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO complaints_flat (
                   odi_number, model_year, make, model, date_filed, state,
                   crash, fire, injuries, deaths, components, summary, raw_json
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(odi_number) DO UPDATE SET
                   model_year = excluded.model_year,
                   make = excluded.make,
                   model = excluded.model,
                   date_filed = excluded.date_filed,
                   state = excluded.state,
                   crash = excluded.crash,
                   fire = excluded.fire,
                   injuries = excluded.injuries,
                   deaths = excluded.deaths,
                   components = excluded.components,
                   summary = excluded.summary,
                   raw_json = excluded.raw_json",
            )?;

            for row in &rows {
                stmt.execute(params![
                    row.record_id,
                    row.year,
                    row.make,
                    row.model,
                    row.date_filed.map(|d| d.format(DATE_FORMAT).to_string()),
                    row.state,
                    row.crash,
                    row.fire,
                    row.injuries,
                    row.deaths,
                    row.components,
                    row.summary,
                    serde_json::to_string(&row.raw)?,
                ])?;
            }
            Ok(rows.len())
        })?;

        info!("Flattened {written} complaints for {key}");
        Ok(written)
    }

    /// All rows stored under `key`, in first-ingestion order.
    pub fn complaints_for(&self, key: &VehicleKey) -> Result<Vec<FlatComplaint>> {
        let conn = self.store.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM complaints_flat
             WHERE model_year = ?1 AND make = ?2 AND model = ?3
             ORDER BY rowid"
        ))?;

        let stored = stmt
            .query_map(params![key.year(), key.make(), key.model()], StoredRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        stored.into_iter().map(StoredRow::into_complaint).collect()
    }

    /// One row by record id.
    pub fn complaint(&self, record_id: &str) -> Result<Option<FlatComplaint>> {
        let conn = self.store.conn()?;
        let stored = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM complaints_flat WHERE odi_number = ?1"),
                params![record_id.trim()],
                StoredRow::from_row,
            )
            .optional()?;

        stored.map(StoredRow::into_complaint).transpose()
    }
}

struct StoredRow {
    record_id: String,
    year: u32,
    make: String,
    model: String,
    date_filed: Option<String>,
    state: Option<String>,
    crash: bool,
    fire: bool,
    injuries: u32,
    deaths: u32,
    components: String,
    summary: String,
    raw_json: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            record_id: row.get(0)?,
            year: row.get(1)?,
            make: row.get(2)?,
            model: row.get(3)?,
            date_filed: row.get(4)?,
            state: row.get(5)?,
            crash: row.get(6)?,
            fire: row.get(7)?,
            injuries: row.get(8)?,
            deaths: row.get(9)?,
            components: row.get(10)?,
            summary: row.get(11)?,
            raw_json: row.get(12)?,
        })
    }

    fn into_complaint(self) -> Result<FlatComplaint> {
        Ok(FlatComplaint {
            record_id: self.record_id,
            year: self.year,
            make: self.make,
            model: self.model,
            date_filed: self
                .date_filed
                .and_then(|d| NaiveDate::parse_from_str(&d, DATE_FORMAT).ok()),
            state: self.state,
            crash: self.crash,
            fire: self.fire,
            injuries: self.injuries,
            deaths: self.deaths,
            components: self.components,
            summary: self.summary,
            raw: serde_json::from_str(&self.raw_json)?,
        })
    }
}
