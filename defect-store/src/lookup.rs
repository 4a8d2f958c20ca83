use crate::cache::CacheStore;
use crate::complaints::ComplaintFlattener;
use crate::error::Result;
use crate::store::DefectStore;
use chrono::{DateTime, TimeDelta, Utc};
use log::{info, warn};
use recallscope_records::{ProviderPayload, VehicleKey};

/// Source of raw provider payloads for one vehicle.
///
/// Implementations never fail outright: a transport problem comes back as
/// a [`ProviderPayload::Failed`].
pub trait Fetcher {
    fn fetch_recalls(&self, key: &VehicleKey) -> ProviderPayload;

    fn fetch_complaints(&self, key: &VehicleKey) -> ProviderPayload;
}

/// What a caller should tell the user about a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStatus {
    /// At least one payload carried records.
    Ok,
    /// Both payloads were fetched fine but hold nothing.
    NoData,
    /// At least one upstream call failed; each field holds that call's reason.
    FetchFailed {
        recalls: Option<String>,
        complaints: Option<String>,
    },
}

/// Outcome of [`VehicleLookup::run`].
#[derive(Debug, Clone)]
pub struct LookupReport {
    pub key: VehicleKey,
    pub recalls: ProviderPayload,
    pub complaints: ProviderPayload,
    pub from_cache: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub recall_count: usize,
    pub complaint_count: usize,
    pub complaints_flattened: usize,
    pub status: LookupStatus,
}

/// Cache-or-fetch, then flatten: the per-vehicle query path.
pub struct VehicleLookup<'a> {
    store: &'a DefectStore,
    max_age: TimeDelta,
}

impl<'a> VehicleLookup<'a> {
    pub fn new(store: &'a DefectStore, max_age: TimeDelta) -> Self {
        Self { store, max_age }
    }

    /// Resolve payloads for `key`, refreshing the cache when the entry is
    /// missing, stale, or `force_refresh` is set.
    ///
    /// Only fetches where neither payload failed are cached, so a transient
    /// upstream failure is retried on the next lookup.
    pub fn run<F: Fetcher + ?Sized>(
        &self,
        key: &VehicleKey,
        fetcher: &F,
        force_refresh: bool,
    ) -> Result<LookupReport> {
        let cache = CacheStore::new(self.store);

        let cached = if force_refresh {
            None
        } else {
            cache.get(key, self.max_age)?
        };

        let (recalls, complaints, from_cache, fetched_at) = match cached {
            Some(hit) => (
                ProviderPayload::from_value(hit.recalls),
                ProviderPayload::from_value(hit.complaints),
                true,
                Some(hit.fetched_at),
            ),
            None => {
                info!("Fetching payloads for {key}");
                let recalls = fetcher.fetch_recalls(key);
                let complaints = fetcher.fetch_complaints(key);

                let fetched_at = if recalls.is_failed() || complaints.is_failed() {
                    warn!("Upstream lookup failed for {key}; not caching");
                    None
                } else {
                    Some(cache.put(key, recalls.raw(), complaints.raw())?)
                };
                (recalls, complaints, false, fetched_at)
            }
        };

        let complaints_flattened = ComplaintFlattener::new(self.store).upsert(key, &complaints)?;
        let recall_count = recalls.record_count();
        let complaint_count = complaints.record_count();

        let status = if recalls.is_failed() || complaints.is_failed() {
            LookupStatus::FetchFailed {
                recalls: recalls.failure_reason().map(str::to_string),
                complaints: complaints.failure_reason().map(str::to_string),
            }
        } else if recall_count == 0 && complaint_count == 0 {
            LookupStatus::NoData
        } else {
            LookupStatus::Ok
        };

        Ok(LookupReport {
            key: key.clone(),
            recalls,
            complaints,
            from_cache,
            fetched_at,
            recall_count,
            complaint_count,
            complaints_flattened,
            status,
        })
    }
}
