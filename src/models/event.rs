use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role-resolution meaning of a timeline event.
///
/// Serialized as the integer codes `1`, `2` and `3`. Events without a type
/// are general timeline entries and never affect role resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum EventType {
    TermBegins,
    TermEnds,
    Death,
}

impl EventType {
    pub fn code(&self) -> u8 {
        match self {
            Self::TermBegins => 1,
            Self::TermEnds => 2,
            Self::Death => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::TermBegins),
            2 => Some(Self::TermEnds),
            3 => Some(Self::Death),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TermBegins => "term_begins",
            Self::TermEnds => "term_ends",
            Self::Death => "death",
        }
    }
}

impl From<EventType> for u8 {
    fn from(kind: EventType) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for EventType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| format!("unknown event type code {code}"))
    }
}

/// A dated entry on a president's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineEvent {
    pub date: DateTime<Utc>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EventType>,
    pub text: String,
}

impl TimelineEvent {
    pub fn new(date: DateTime<Utc>, kind: Option<EventType>, text: impl Into<String>) -> Self {
        Self {
            date,
            kind,
            text: text.into(),
        }
    }
}
