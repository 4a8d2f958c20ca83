use crate::error::{RecordError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical (model year, make, model) identity.
///
/// Instances can only be built through [`VehicleKey::normalize`] or
/// [`VehicleKey::parse`], so make and model are always trimmed and
/// upper-cased and the year is always positive. Storage keys and equality
/// are computed on this form, never on raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleKey {
    year: u32,
    make: String,
    model: String,
}

impl VehicleKey {
    /// Build a key from an already numeric year.
    pub fn normalize(year: i64, make: &str, model: &str) -> Result<Self> {
        let year = positive_year(year)?;
        let make = upper_part("make", make)?;
        let model = upper_part("model", model)?;
        Ok(Self { year, make, model })
    }

    /// Build a key from free-form text, as typed by a user.
    pub fn parse(year: &str, make: &str, model: &str) -> Result<Self> {
        Self::normalize(integer_year(year)?, make, model)
    }

    /// Validate a (year, make) pair without a model, for listing the models
    /// stored under a make. Applies the same rules as [`VehicleKey::parse`].
    pub fn parse_make(year: &str, make: &str) -> Result<(u32, String)> {
        let year = positive_year(integer_year(year)?)?;
        Ok((year, upper_part("make", make)?))
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The year as the bulk complaint dump spells it.
    pub fn year_text(&self) -> String {
        self.year.to_string()
    }
}

fn integer_year(year: &str) -> Result<i64> {
    let trimmed = year.trim();
    trimmed
        .parse()
        .map_err(|_| RecordError::invalid_key(format!("year is not an integer: {trimmed:?}")))
}

fn positive_year(year: i64) -> Result<u32> {
    u32::try_from(year)
        .ok()
        .filter(|y| *y > 0)
        .ok_or_else(|| RecordError::invalid_key(format!("year must be positive, got {year}")))
}

fn upper_part(name: &str, value: &str) -> Result<String> {
    let value = value.trim().to_uppercase();
    if value.is_empty() {
        return Err(RecordError::invalid_key(format!("{name} is empty")));
    }
    Ok(value)
}

impl fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.year, self.make, self.model)
    }
}
