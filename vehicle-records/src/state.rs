use crate::fields::{STATE_KEYS, first_text};
use crate::payload::ProviderPayload;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Fifty states plus the District of Columbia, as (full name, code).
pub const US_STATES: [(&str, &str); 51] = [
    ("ALABAMA", "AL"),
    ("ALASKA", "AK"),
    ("ARIZONA", "AZ"),
    ("ARKANSAS", "AR"),
    ("CALIFORNIA", "CA"),
    ("COLORADO", "CO"),
    ("CONNECTICUT", "CT"),
    ("DELAWARE", "DE"),
    ("FLORIDA", "FL"),
    ("GEORGIA", "GA"),
    ("HAWAII", "HI"),
    ("IDAHO", "ID"),
    ("ILLINOIS", "IL"),
    ("INDIANA", "IN"),
    ("IOWA", "IA"),
    ("KANSAS", "KS"),
    ("KENTUCKY", "KY"),
    ("LOUISIANA", "LA"),
    ("MAINE", "ME"),
    ("MARYLAND", "MD"),
    ("MASSACHUSETTS", "MA"),
    ("MICHIGAN", "MI"),
    ("MINNESOTA", "MN"),
    ("MISSISSIPPI", "MS"),
    ("MISSOURI", "MO"),
    ("MONTANA", "MT"),
    ("NEBRASKA", "NE"),
    ("NEVADA", "NV"),
    ("NEW HAMPSHIRE", "NH"),
    ("NEW JERSEY", "NJ"),
    ("NEW MEXICO", "NM"),
    ("NEW YORK", "NY"),
    ("NORTH CAROLINA", "NC"),
    ("NORTH DAKOTA", "ND"),
    ("OHIO", "OH"),
    ("OKLAHOMA", "OK"),
    ("OREGON", "OR"),
    ("PENNSYLVANIA", "PA"),
    ("RHODE ISLAND", "RI"),
    ("SOUTH CAROLINA", "SC"),
    ("SOUTH DAKOTA", "SD"),
    ("TENNESSEE", "TN"),
    ("TEXAS", "TX"),
    ("UTAH", "UT"),
    ("VERMONT", "VT"),
    ("VIRGINIA", "VA"),
    ("WASHINGTON", "WA"),
    ("WEST VIRGINIA", "WV"),
    ("WISCONSIN", "WI"),
    ("WYOMING", "WY"),
    ("DISTRICT OF COLUMBIA", "DC"),
];

/// Complaint count for one two-letter state code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCount {
    pub state: String,
    pub count: u64,
}

/// Map a free-form location to a two-letter code.
///
/// Accepts a code (`"TX"`), a full name (`"texas"`), or a composite such as
/// `"Austin, Texas"` where only the last comma-separated token is looked
/// at. `None` means unknown.
pub fn normalize_state(raw: &str) -> Option<&'static str> {
    let upper = raw.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }

    if let Some(code) = match_token(&upper) {
        return Some(code);
    }

    if upper.contains(',') {
        let last = upper
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .next_back()?;
        return match_token(last);
    }

    None
}

fn match_token(token: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(name, code)| (token.len() == 2 && *code == token) || *name == token)
        .map(|(_, code)| *code)
}

/// Resolve the state of one raw record using the state alias priority list.
pub fn record_state(record: &Map<String, Value>) -> Option<&'static str> {
    first_text(record, STATE_KEYS).and_then(|raw| normalize_state(&raw))
}

/// Count complaints per state straight from a live complaints payload.
///
/// Ordered by count descending; equal counts keep first-appearance order.
/// Records without a resolvable state are left out. A failed payload
/// yields nothing.
pub fn complaints_by_state(payload: &ProviderPayload) -> Vec<StateCount> {
    let mut order: Vec<&'static str> = Vec::new();
    let mut counts: HashMap<&'static str, u64> = HashMap::new();

    for record in payload.records() {
        let Some(code) = record_state(record) else {
            continue;
        };
        let entry = counts.entry(code).or_insert_with(|| {
            order.push(code);
            0
        });
        *entry += 1;
    }

    let mut out: Vec<StateCount> = order
        .into_iter()
        .map(|code| StateCount {
            state: code.to_string(),
            count: counts.get(code).copied().unwrap_or(0),
        })
        .collect();
    out.sort_by_key(|c| Reverse(c.count));
    out
}
