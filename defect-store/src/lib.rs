//! # Defect Store
//!
//! SQLite persistence for per-vehicle lookups:
//!
//! - [`CacheStore`]: raw recall/complaint payloads per normalized vehicle,
//!   gated by a freshness window
//! - [`ComplaintFlattener`]: idempotent flatten-and-upsert of complaint
//!   records keyed by provider record id
//! - [`VehicleLookup`]: cache-or-fetch orchestration over a [`Fetcher`]
//!
//! All three borrow one explicitly opened [`DefectStore`].
//!
//! ## Example
//!
//! ```no_run
//! use recallscope_records::{ProviderPayload, VehicleKey};
//! use recallscope_store::{CacheStore, ComplaintFlattener, DefectStore, StoreConfig};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = StoreConfig::default();
//!     let store = DefectStore::open(&config.db_path)?;
//!     let key = VehicleKey::parse("2020", "Honda", "Accord")?;
//!
//!     if CacheStore::new(&store).get(&key, config.cache_ttl())?.is_none() {
//!         let complaints = ProviderPayload::from_value(json!({"results": []}));
//!         ComplaintFlattener::new(&store).upsert(&key, &complaints)?;
//!     }
//!     Ok(())
//! }
//! ```

mod cache;
mod complaints;
mod config;
mod error;
mod lookup;
mod store;

pub use cache::{CacheStore, CachedVehicle};
pub use complaints::ComplaintFlattener;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use lookup::{Fetcher, LookupReport, LookupStatus, VehicleLookup};
pub use store::DefectStore;
