use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::person::{Monarch, President};

/// The canonical, persisted timeline of one country.
///
/// A country owns its presidents and monarchs exclusively; nothing is shared
/// between records. `code` is a slug matching `[a-z0-9-]+` and is unique
/// across the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Country {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub start: NaiveDate,
    /// `None` while the country still exists.
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub presidents: Vec<President>,
    #[serde(default)]
    pub monarchs: Vec<Monarch>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a country.
///
/// Updates are whole-record replacements: the editing surface always sends
/// the complete normalized draft.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryInput {
    pub code: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub presidents: Vec<President>,
    #[serde(default)]
    pub monarchs: Vec<Monarch>,
}

impl CountryInput {
    /// Server-side checks applied on create and update.
    ///
    /// Returns the first problem found. The editing surface validates far
    /// more thoroughly before it ever sends a payload; this only guards the
    /// store against clients that skip that step.
    pub fn check(&self) -> Result<(), String> {
        if !is_valid_code(&self.code) {
            return Err(format!(
                "country code `{}` must match [a-z0-9-]+",
                self.code
            ));
        }
        if self.name.trim().is_empty() {
            return Err("country name must not be empty".to_string());
        }
        Ok(())
    }
}

impl From<Country> for CountryInput {
    fn from(country: Country) -> Self {
        Self {
            code: country.code,
            name: country.name,
            start: country.start,
            end: country.end,
            presidents: country.presidents,
            monarchs: country.monarchs,
        }
    }
}

/// Minimal country info for list responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountrySummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl From<Country> for CountrySummary {
    fn from(country: Country) -> Self {
        Self {
            id: country.id,
            code: country.code,
            name: country.name,
            start: country.start,
            end: country.end,
        }
    }
}

/// Who held each role of a country at a given instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HoldersResponse {
    pub at: DateTime<Utc>,
    pub president: Option<String>,
    pub monarch: Option<String>,
}

/// Whether `code` is a well-formed country slug.
pub fn is_valid_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
