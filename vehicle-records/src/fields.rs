//! Ordered alias lists for the loosely-shaped provider records, and the
//! first-present-wins lookup and coercion helpers that read them.

use serde_json::{Map, Value};

pub const RESULTS_KEYS: &[&str] = &["results", "Results"];

pub const RECORD_ID_KEYS: &[&str] = &["odiNumber", "ODINumber", "odi_number"];
pub const DATE_FILED_KEYS: &[&str] = &["dateComplaintFiled", "dateFiled", "DateComplaintFiled"];
pub const CRASH_KEYS: &[&str] = &["crash", "Crash"];
pub const FIRE_KEYS: &[&str] = &["fire", "Fire"];
pub const INJURIES_KEYS: &[&str] = &["numberOfInjuries", "injuries"];
pub const DEATHS_KEYS: &[&str] = &["numberOfDeaths", "deaths"];
pub const COMPONENTS_KEYS: &[&str] = &["components", "Components"];
pub const SUMMARY_KEYS: &[&str] = &["summary", "Summary", "description"];
pub const STATE_KEYS: &[&str] = &[
    "state",
    "State",
    "locationState",
    "LocationState",
    "consumerState",
    "ConsumerState",
    "incidentState",
    "IncidentState",
    "location",
    "Location",
    "city",
    "City",
];

/// Strings treated as false by [`truthy`].
const FALSE_WORDS: &[&str] = &["false", "no", "n", "0", "off"];

/// Returns the value of the first alias that is present.
///
/// A key counts as present when it exists, is not `null`, and is not a
/// string that is empty after trimming.
pub fn first_present<'a>(record: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| record.get(*alias))
        .find(|value| is_present(value))
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Scalar rendering used for ids, states and summaries.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !FALSE_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w))
        }
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Non-negative count coercion. Anything unparseable reads as zero.
pub fn count(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };
    raw.map(|n| n.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

pub fn first_truthy_flag(record: &Map<String, Value>, aliases: &[&str]) -> bool {
    first_present(record, aliases).is_some_and(truthy)
}

pub fn first_count(record: &Map<String, Value>, aliases: &[&str]) -> u32 {
    first_present(record, aliases).map(count).unwrap_or(0)
}

pub fn first_text(record: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    first_present(record, aliases).and_then(scalar_text)
}
