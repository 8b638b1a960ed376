use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::event::TimelineEvent;

/// An elected office-holder.
///
/// Terms are not stored as intervals; they are derived from the
/// `TermBegins`/`TermEnds` entries in `events` (see [`crate::timeline`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct President {
    pub name: String,
    pub party: String,
    pub birth: NaiveDate,
    pub death: Option<NaiveDate>,
    #[serde(default)]
    pub events: Vec<TimelineEvent>,
    /// Opaque image reference set by the image collaborators.
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A hereditary ruler described by a single reign interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Monarch {
    pub name: String,
    pub birth: NaiveDate,
    pub death: Option<NaiveDate>,
    pub start_reign: NaiveDate,
    /// `None` while the reign is ongoing.
    pub end_reign: Option<NaiveDate>,
    pub death_cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}
