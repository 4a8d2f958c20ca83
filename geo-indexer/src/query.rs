use crate::error::Result;
use crate::store::{GeoCountStore, ModelVariant};
use log::debug;
use recallscope_records::{StateCount, VehicleKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upper-cased, alphanumeric-only form used to line up model spellings
/// ("F-150" and "F150 4DR" both start with "F150").
pub fn normalize_model(model: &str) -> String {
    model
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// State counts from the offline index for `key`.
///
/// Candidates are the stored rows for the exact year and make; a candidate
/// matches when its normalized model starts with the normalized query
/// model. Matches are summed per state, largest first, ties by state code.
pub fn state_counts(store: &GeoCountStore, key: &VehicleKey) -> Result<Vec<StateCount>> {
    let wanted = normalize_model(key.model());
    if wanted.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = store.candidates(&key.year_text(), key.make())?;
    let mut by_state: HashMap<String, u64> = HashMap::new();
    let mut matched_rows = 0usize;

    for candidate in candidates {
        if normalize_model(&candidate.key.model_text).starts_with(&wanted) {
            matched_rows += 1;
            *by_state.entry(candidate.key.state).or_insert(0) += candidate.count;
        }
    }

    debug!("Geo index: {matched_rows} stored rows matched {key}");

    let mut counts: Vec<StateCount> = by_state
        .into_iter()
        .map(|(state, count)| StateCount { state, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.state.cmp(&b.state)));
    Ok(counts)
}

/// Model spellings stored for the key's year and make.
pub fn model_variants(
    store: &GeoCountStore,
    key: &VehicleKey,
    limit: usize,
) -> Result<Vec<ModelVariant>> {
    store.model_variants(&key.year_text(), key.make(), limit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakdownSource {
    /// Counted from the live complaints payload
    Live,
    /// Read from the offline bulk index
    OfflineIndex,
    /// Neither source had anything
    Unavailable,
}

/// Per-state complaint distribution for one vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBreakdown {
    pub source: BreakdownSource,
    pub counts: Vec<StateCount>,
}

impl StateBreakdown {
    /// Prefer live counts; fall back to the offline index when the live
    /// feed carried no usable locations.
    pub fn resolve(
        live: Vec<StateCount>,
        index: Option<&GeoCountStore>,
        key: &VehicleKey,
    ) -> Result<Self> {
        if !live.is_empty() {
            return Ok(Self {
                source: BreakdownSource::Live,
                counts: live,
            });
        }

        let offline = match index {
            Some(store) => state_counts(store, key)?,
            None => Vec::new(),
        };

        let source = if offline.is_empty() {
            BreakdownSource::Unavailable
        } else {
            BreakdownSource::OfflineIndex
        };
        Ok(Self {
            source,
            counts: offline,
        })
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn peak(&self) -> Option<&StateCount> {
        self.counts.iter().max_by_key(|c| c.count)
    }

    /// True when one state holds more than 30% of all complaints.
    pub fn is_concentrated(&self) -> bool {
        let total = self.total();
        let peak = self.peak().map(|c| c.count).unwrap_or(0);
        total > 0 && peak * 10 > total * 3
    }
}
