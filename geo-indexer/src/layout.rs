//! Positional layout of the flat complaint dump.
//!
//! The file has no header row; every line is 49 tab-separated fields in the
//! order below. Only make, model, year and state are consumed.

use serde::{Deserialize, Serialize};

pub const COLUMNS: [&str; 49] = [
    "CMPLID",
    "ODINO",
    "MFR_NAME",
    "MAKETXT",
    "MODELTXT",
    "YEARTXT",
    "CRASH",
    "FAILDATE",
    "FIRE",
    "INJURED",
    "DEATHS",
    "COMPDESC",
    "CITY",
    "STATE",
    "VIN",
    "DATEA",
    "LDATE",
    "MILES",
    "OCCURENCES",
    "CDESCR",
    "CMPL_TYPE",
    "POLICE_RPT_YN",
    "PURCH_DT",
    "ORIG_OWNER_YN",
    "ANTI_BRAKES_YN",
    "CRUISE_CONT_YN",
    "NUM_CYLS",
    "DRIVE_TRAIN",
    "FUEL_SYS",
    "FUEL_TYPE",
    "TRANS_TYPE",
    "VEH_SPEED",
    "DOT",
    "TIRE_SIZE",
    "LOC_OF_TIRE",
    "TIRE_FAIL_TYPE",
    "ORIG_EQUIP_YN",
    "MANUF_DT",
    "SEAT_TYPE",
    "RESTRAINT_TYPE",
    "DEALER_NAME",
    "DEALER_TEL",
    "DEALER_CITY",
    "DEALER_STATE",
    "DEALER_ZIP",
    "PROD_TYPE",
    "REPAIRED_YN",
    "MEDICAL_ATTN",
    "VEHICLES_TOWED_YN",
];

pub const FIELD_COUNT: usize = COLUMNS.len();

pub const MAKE_COL: usize = 3;
pub const MODEL_COL: usize = 4;
pub const YEAR_COL: usize = 5;
pub const STATE_COL: usize = 13;

/// The four consumed fields of one line, untrimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpRow {
    pub make: String,
    pub model: String,
    pub year: String,
    pub state: String,
}

/// Identity of one accumulated count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeoKey {
    pub year_text: String,
    pub make_text: String,
    pub model_text: String,
    pub state: String,
}

/// Split one line into its consumed fields.
///
/// Returns `None` for blank lines and for lines with more than
/// [`FIELD_COUNT`] fields. Short lines read their missing fields as empty.
pub fn parse_line(line: &str) -> Option<DumpRow> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return None;
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() > FIELD_COUNT {
        return None;
    }

    let field = |idx: usize| fields.get(idx).copied().unwrap_or_default().to_string();
    Some(DumpRow {
        make: field(MAKE_COL),
        model: field(MODEL_COL),
        year: field(YEAR_COL),
        state: field(STATE_COL),
    })
}

impl DumpRow {
    /// Normalize and filter.
    ///
    /// Make, model and state are trimmed and upper-cased, the year trimmed.
    /// Rows whose state is not two characters, whose make or model is
    /// empty, or whose year is not four characters are rejected.
    pub fn into_key(self) -> Option<GeoKey> {
        let make_text = self.make.trim().to_uppercase();
        let model_text = self.model.trim().to_uppercase();
        let year_text = self.year.trim().to_string();
        let state = self.state.trim().to_uppercase();

        if state.chars().count() != 2
            || make_text.is_empty()
            || model_text.is_empty()
            || year_text.chars().count() != 4
        {
            return None;
        }

        Some(GeoKey {
            year_text,
            make_text,
            model_text,
            state,
        })
    }
}
