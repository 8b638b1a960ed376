//! Coercion of drafts into persistence-ready shape.
//!
//! Normalization never fails. Missing or unparseable values are replaced by
//! fixed placeholders, so the result always converts into a typed
//! [`CountryInput`]. Structural validation runs on the draft *before* this
//! step; placeholders are a last resort for values the operator was already
//! told about, not a way of accepting them.

use crate::draft::{CountryDraft, MonarchForm, PresidentForm, TimelineEventForm};
use crate::models::dates::{
    default_date, default_instant, format_date, format_instant, parse_date, parse_instant,
    DEFAULT_DATE,
};
use crate::models::{CountryInput, Monarch, President, TimelineEvent};

pub const FALLBACK_CODE: &str = "country";
pub const PLACEHOLDER_COUNTRY_NAME: &str = "Unnamed country";
pub const PLACEHOLDER_PRESIDENT_NAME: &str = "Unnamed president";
pub const PLACEHOLDER_PARTY: &str = "Independent";
pub const PLACEHOLDER_MONARCH_NAME: &str = "Unnamed monarch";

/// Fill defaults and canonicalize every field of `draft`.
///
/// Idempotent: normalizing an already normalized draft returns it unchanged.
/// Form ids and image references pass through untouched.
pub fn normalize_for_save(draft: &CountryDraft) -> CountryDraft {
    CountryDraft {
        id: draft.id,
        code: normalize_code(&draft.code, &draft.name),
        name: required_text(&draft.name, PLACEHOLDER_COUNTRY_NAME),
        start: required_date(&draft.start),
        end: optional_date(draft.end.as_deref()),
        presidents: draft.presidents.iter().map(normalize_president).collect(),
        monarchs: draft.monarchs.iter().map(normalize_monarch).collect(),
    }
}

/// Normalize `draft` and convert it into a create/update payload.
pub fn to_payload(draft: &CountryDraft) -> CountryInput {
    let normalized = normalize_for_save(draft);
    CountryInput {
        code: normalized.code,
        name: normalized.name,
        start: typed_date(&normalized.start),
        end: normalized.end.as_deref().map(typed_date),
        presidents: normalized.presidents.iter().map(president_payload).collect(),
        monarchs: normalized.monarchs.iter().map(monarch_payload).collect(),
    }
}

/// Slug for a country: the trimmed, lowercased code, or one derived from the
/// name when the code is blank.
///
/// Whitespace runs become single hyphens and anything outside `[a-z0-9-]` is
/// dropped. Falls back to [`FALLBACK_CODE`] when nothing usable remains.
pub fn normalize_code(code: &str, name: &str) -> String {
    let from_code = slugify(code);
    if !from_code.is_empty() {
        return from_code;
    }
    let from_name = slugify(name);
    if !from_name.is_empty() {
        return from_name;
    }
    FALLBACK_CODE.to_string()
}

fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn normalize_president(form: &PresidentForm) -> PresidentForm {
    PresidentForm {
        form_id: form.form_id,
        name: required_text(&form.name, PLACEHOLDER_PRESIDENT_NAME),
        party: required_text(&form.party, PLACEHOLDER_PARTY),
        birth: required_date(&form.birth),
        death: optional_date(form.death.as_deref()),
        events: form.events.iter().map(normalize_event).collect(),
        image_url: form.image_url.clone(),
    }
}

fn normalize_event(form: &TimelineEventForm) -> TimelineEventForm {
    let date = parse_instant(&form.date).unwrap_or_else(default_instant);
    TimelineEventForm {
        form_id: form.form_id,
        date: format_instant(date),
        kind: form.kind,
        text: form.text.trim().to_string(),
    }
}

fn normalize_monarch(form: &MonarchForm) -> MonarchForm {
    MonarchForm {
        form_id: form.form_id,
        name: required_text(&form.name, PLACEHOLDER_MONARCH_NAME),
        birth: required_date(&form.birth),
        death: optional_date(form.death.as_deref()),
        start_reign: required_date(&form.start_reign),
        end_reign: optional_date(form.end_reign.as_deref()),
        death_cause: optional_text(form.death_cause.as_deref()),
        notes: optional_text(form.notes.as_deref()),
        image_url: form.image_url.clone(),
    }
}

fn required_text(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required_date(value: &str) -> String {
    parse_date(value)
        .map(format_date)
        .unwrap_or_else(|| DEFAULT_DATE.to_string())
}

/// Blank counts as absent; present but unparseable becomes the default.
fn optional_date(value: Option<&str>) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    Some(required_date(value))
}

fn typed_date(value: &str) -> chrono::NaiveDate {
    parse_date(value).unwrap_or_else(default_date)
}

fn president_payload(form: &PresidentForm) -> President {
    President {
        name: form.name.clone(),
        party: form.party.clone(),
        birth: typed_date(&form.birth),
        death: form.death.as_deref().map(typed_date),
        events: form
            .events
            .iter()
            .map(|event| TimelineEvent {
                date: parse_instant(&event.date).unwrap_or_else(default_instant),
                kind: event.kind,
                text: event.text.clone(),
            })
            .collect(),
        image_url: form.image_url.clone(),
    }
}

fn monarch_payload(form: &MonarchForm) -> Monarch {
    Monarch {
        name: form.name.clone(),
        birth: typed_date(&form.birth),
        death: form.death.as_deref().map(typed_date),
        start_reign: typed_date(&form.start_reign),
        end_reign: form.end_reign.as_deref().map(typed_date),
        death_cause: form.death_cause.clone(),
        notes: form.notes.clone(),
        image_url: form.image_url.clone(),
    }
}
