use crate::draft::{CountryDraft, MonarchForm, PresidentForm};
use crate::models::dates::{parse_date, parse_instant};

use super::describe;

/// Check that every required field is present and every date parses.
///
/// Runs on the draft as the operator left it, before normalization fills in
/// placeholders. Every check contributes independently; callers must show the
/// whole list. Entries are identified by 1-based position.
pub fn validate_structure(draft: &CountryDraft) -> Vec<String> {
    let mut errors = Vec::new();

    if draft.code.trim().is_empty() {
        errors.push("Country code is required".to_string());
    }
    if draft.name.trim().is_empty() {
        errors.push("Country name is required".to_string());
    }
    if parse_date(&draft.start).is_none() {
        errors.push("Country start date is missing or invalid".to_string());
    }
    if !optional_date_ok(draft.end.as_deref()) {
        errors.push("Country end date is invalid".to_string());
    }

    for (index, president) in draft.presidents.iter().enumerate() {
        check_president(index + 1, president, &mut errors);
    }
    for (index, monarch) in draft.monarchs.iter().enumerate() {
        check_monarch(index + 1, monarch, &mut errors);
    }

    errors
}

fn check_president(position: usize, president: &PresidentForm, errors: &mut Vec<String>) {
    let label = describe("President", position, &president.name);

    if president.name.trim().is_empty() {
        errors.push(format!("{label}: name is required"));
    }
    if president.party.trim().is_empty() {
        errors.push(format!("{label}: party is required"));
    }
    if parse_date(&president.birth).is_none() {
        errors.push(format!("{label}: birth date is missing or invalid"));
    }
    if !optional_date_ok(president.death.as_deref()) {
        errors.push(format!("{label}: death date is invalid"));
    }

    for (index, event) in president.events.iter().enumerate() {
        let event_position = index + 1;
        if parse_instant(&event.date).is_none() {
            errors.push(format!(
                "{label}, event {event_position}: date is missing or invalid"
            ));
        }
        if event.text.trim().is_empty() {
            errors.push(format!("{label}, event {event_position}: text is required"));
        }
    }
}

fn check_monarch(position: usize, monarch: &MonarchForm, errors: &mut Vec<String>) {
    let label = describe("Monarch", position, &monarch.name);

    if monarch.name.trim().is_empty() {
        errors.push(format!("{label}: name is required"));
    }
    if parse_date(&monarch.birth).is_none() {
        errors.push(format!("{label}: birth date is missing or invalid"));
    }
    if parse_date(&monarch.start_reign).is_none() {
        errors.push(format!("{label}: reign start date is missing or invalid"));
    }
    if !optional_date_ok(monarch.death.as_deref()) {
        errors.push(format!("{label}: death date is invalid"));
    }
    if !optional_date_ok(monarch.end_reign.as_deref()) {
        errors.push(format!("{label}: reign end date is invalid"));
    }
}

/// Absent and blank are both fine; anything else must parse.
fn optional_date_ok(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(value) => parse_date(value).is_some(),
    }
}
