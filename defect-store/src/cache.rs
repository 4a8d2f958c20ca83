use crate::error::Result;
use crate::store::DefectStore;
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use recallscope_records::VehicleKey;
use rusqlite::{OptionalExtension, params};
use serde_json::Value;

/// A fresh cache hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedVehicle {
    pub recalls: Value,
    pub complaints: Value,
    pub fetched_at: DateTime<Utc>,
}

/// TTL-gated cache of raw provider payloads, one entry per normalized key.
pub struct CacheStore<'a> {
    store: &'a DefectStore,
}

impl<'a> CacheStore<'a> {
    pub fn new(store: &'a DefectStore) -> Self {
        Self { store }
    }

    /// Cached payloads for `key` if they are no older than `max_age`.
    ///
    /// A missing entry, an expired entry and an entry whose timestamp no
    /// longer parses all read as `None`; each means "go fetch".
    pub fn get(&self, key: &VehicleKey, max_age: TimeDelta) -> Result<Option<CachedVehicle>> {
        self.get_at(key, max_age, Utc::now())
    }

    /// [`CacheStore::get`] evaluated against an explicit clock.
    pub fn get_at(
        &self,
        key: &VehicleKey,
        max_age: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Option<CachedVehicle>> {
        let conn = self.store.conn()?;
        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT fetched_at, recalls_json, complaints_json
                 FROM vehicle_cache
                 WHERE model_year = ?1 AND make = ?2 AND model = ?3",
                params![key.year(), key.make(), key.model()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        drop(conn);

        let Some((fetched_at, recalls, complaints)) = row else {
            debug!("Cache miss for {key}");
            return Ok(None);
        };

        let Some(fetched_at) = parse_timestamp(&fetched_at) else {
            warn!("Unreadable cache timestamp {fetched_at:?} for {key}; treating as expired");
            return Ok(None);
        };

        if now - fetched_at > max_age {
            debug!("Cache entry for {key} expired (fetched {fetched_at})");
            return Ok(None);
        }

        debug!("Cache hit for {key}");
        Ok(Some(CachedVehicle {
            recalls: serde_json::from_str(&recalls)?,
            complaints: serde_json::from_str(&complaints)?,
            fetched_at,
        }))
    }

    /// Insert or replace the entry for `key`, stamped with the current time.
    pub fn put(&self, key: &VehicleKey, recalls: &Value, complaints: &Value) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        self.put_at(key, recalls, complaints, now)?;
        Ok(now)
    }

    /// [`CacheStore::put`] with an explicit timestamp. Last writer wins.
    pub fn put_at(
        &self,
        key: &VehicleKey,
        recalls: &Value,
        complaints: &Value,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        let recalls = serde_json::to_string(recalls)?;
        let complaints = serde_json::to_string(complaints)?;

        self.store.write(|tx| {
            tx.execute(
                "INSERT INTO vehicle_cache
                   (model_year, make, model, fetched_at, recalls_json, complaints_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(model_year, make, model) DO UPDATE SET
                   fetched_at = excluded.fetched_at,
                   recalls_json = excluded.recalls_json,
                   complaints_json = excluded.complaints_json",
                params![
                    key.year(),
                    key.make(),
                    key.model(),
                    fetched_at.to_rfc3339(),
                    recalls,
                    complaints,
                ],
            )?;
            Ok(())
        })?;

        debug!("Cached payloads for {key}");
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
