use crate::fields::{
    COMPONENTS_KEYS, CRASH_KEYS, DATE_FILED_KEYS, DEATHS_KEYS, FIRE_KEYS, INJURIES_KEYS,
    RECORD_ID_KEYS, SUMMARY_KEYS, first_count, first_present, first_text, first_truthy_flag,
    scalar_text,
};
use crate::key::VehicleKey;
use crate::state::record_state;
use chrono::{DateTime, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator used when a component list is collapsed into one string.
pub const COMPONENT_SEPARATOR: &str = ", ";

/// One complaint reduced to a fixed schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatComplaint {
    /// Provider-assigned id; the only identity a row has.
    pub record_id: String,
    pub year: u32,
    pub make: String,
    pub model: String,
    pub date_filed: Option<NaiveDate>,
    /// Two-letter code, when the record's location could be resolved.
    pub state: Option<String>,
    pub crash: bool,
    pub fire: bool,
    pub injuries: u32,
    pub deaths: u32,
    pub components: String,
    pub summary: String,
    /// The record as received.
    pub raw: Value,
}

impl FlatComplaint {
    /// Flatten one raw record under `key`.
    ///
    /// Returns `None` when the record has no usable id. Every other field
    /// degrades to a default instead of failing.
    pub fn from_record(key: &VehicleKey, record: &Map<String, Value>) -> Option<Self> {
        let Some(record_id) = first_text(record, RECORD_ID_KEYS)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
        else {
            debug!("Dropping complaint record for {key} without an id");
            return None;
        };

        let date_filed = first_text(record, DATE_FILED_KEYS).and_then(|raw| parse_filed_date(&raw));
        let components = first_present(record, COMPONENTS_KEYS)
            .map(join_components)
            .unwrap_or_default();
        let summary = first_text(record, SUMMARY_KEYS).unwrap_or_default();

        Some(Self {
            record_id,
            year: key.year(),
            make: key.make().to_string(),
            model: key.model().to_string(),
            date_filed,
            state: record_state(record).map(str::to_string),
            crash: first_truthy_flag(record, CRASH_KEYS),
            fire: first_truthy_flag(record, FIRE_KEYS),
            injuries: first_count(record, INJURIES_KEYS),
            deaths: first_count(record, DEATHS_KEYS),
            components,
            summary,
            raw: Value::Object(record.clone()),
        })
    }
}

/// Lists keep distinct trimmed non-empty entries in original order;
/// scalars are trimmed and used as-is.
fn join_components(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let mut seen: Vec<String> = Vec::new();
            for item in items {
                let Some(text) = scalar_text(item) else {
                    continue;
                };
                let text = text.trim();
                if !text.is_empty() && !seen.iter().any(|s| s == text) {
                    seen.push(text.to_string());
                }
            }
            seen.join(COMPONENT_SEPARATOR)
        }
        other => scalar_text(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Accepts `MM/DD/YYYY`, `YYYY-MM-DD`, ISO/RFC 3339 datetimes and `YYYYMMDD`.
pub fn parse_filed_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for format in ["%m/%d/%Y", "%Y-%m-%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    // Datetime without offset, e.g. "2021-03-04T10:00:00" or "2021-03-04 10:00".
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
