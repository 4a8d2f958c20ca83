//! # Vehicle Records
//!
//! Shared vocabulary for recall/complaint data keyed by model year, make and
//! model.
//!
//! - [`VehicleKey`]: the normalized identity every store is keyed on
//! - [`ProviderPayload`]: a raw provider body, tagged as usable or failed
//! - [`FlatComplaint`]: one loosely-shaped complaint reduced to a fixed row
//! - [`normalize_state`]: free-form location to two-letter state code
//!
//! ## Example
//!
//! ```
//! use recallscope_records::{FlatComplaint, ProviderPayload, VehicleKey};
//! use serde_json::json;
//!
//! let key = VehicleKey::parse("2020", "honda", " accord ").unwrap();
//! let payload = ProviderPayload::from_value(json!({
//!     "results": [{"odiNumber": "11300123", "summary": "stalled", "state": "Austin, Texas"}]
//! }));
//!
//! let rows: Vec<FlatComplaint> = payload
//!     .records()
//!     .filter_map(|record| FlatComplaint::from_record(&key, record))
//!     .collect();
//!
//! assert_eq!(rows[0].state.as_deref(), Some("TX"));
//! ```

mod complaint;
mod error;
pub mod fields;
mod key;
mod payload;
mod state;

pub use complaint::{COMPONENT_SEPARATOR, FlatComplaint, parse_filed_date};
pub use error::{RecordError, Result};
pub use key::VehicleKey;
pub use payload::{ERROR_MARKER, ProviderPayload};
pub use state::{StateCount, US_STATES, complaints_by_state, normalize_state, record_state};
