use thiserror::Error;

use super::form::{CountryDraft, FormId, MonarchForm, PresidentForm, TimelineEventForm};
use crate::models::EventType;

/// Errors from edits that reference entries the draft does not contain.
///
/// These indicate a caller bug (a stale or fabricated form id) rather than
/// something the operator can fix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("no president with form id {0}")]
    UnknownPresident(FormId),

    #[error("no monarch with form id {0}")]
    UnknownMonarch(FormId),

    #[error("president {president} has no event with form id {event}")]
    UnknownEvent { president: FormId, event: FormId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryField {
    Code(String),
    Name(String),
    Start(String),
    End(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresidentField {
    Name(String),
    Party(String),
    Birth(String),
    Death(Option<String>),
    /// Set by the image collaborators; never interpreted.
    ImageUrl(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonarchField {
    Name(String),
    Birth(String),
    Death(Option<String>),
    StartReign(String),
    EndReign(Option<String>),
    DeathCause(Option<String>),
    Notes(Option<String>),
    ImageUrl(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventField {
    Date(String),
    Kind(Option<EventType>),
    Text(String),
}

/// One operator intent against a draft.
///
/// Every field update is a tagged variant, so there is no way to address a
/// field that does not exist. Entries are located by form id only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    Country(CountryField),
    AddPresident,
    RemovePresident(FormId),
    President(FormId, PresidentField),
    AddEvent(FormId),
    RemoveEvent {
        president: FormId,
        event: FormId,
    },
    Event {
        president: FormId,
        event: FormId,
        field: EventField,
    },
    AddMonarch,
    RemoveMonarch(FormId),
    Monarch(FormId, MonarchField),
}

impl DraftEdit {
    /// Apply the edit in place. On error `draft` is left unchanged.
    pub fn apply(self, draft: &mut CountryDraft) -> Result<(), DraftError> {
        match self {
            Self::Country(field) => {
                match field {
                    CountryField::Code(value) => draft.code = value,
                    CountryField::Name(value) => draft.name = value,
                    CountryField::Start(value) => draft.start = value,
                    CountryField::End(value) => draft.end = value,
                }
                Ok(())
            }
            Self::AddPresident => {
                draft.presidents.push(PresidentForm::blank());
                Ok(())
            }
            Self::RemovePresident(id) => {
                let index = draft
                    .presidents
                    .iter()
                    .position(|p| p.form_id == id)
                    .ok_or(DraftError::UnknownPresident(id))?;
                draft.presidents.remove(index);
                Ok(())
            }
            Self::President(id, field) => {
                let president = draft
                    .president_mut(id)
                    .ok_or(DraftError::UnknownPresident(id))?;
                match field {
                    PresidentField::Name(value) => president.name = value,
                    PresidentField::Party(value) => president.party = value,
                    PresidentField::Birth(value) => president.birth = value,
                    PresidentField::Death(value) => president.death = value,
                    PresidentField::ImageUrl(value) => president.image_url = value,
                }
                Ok(())
            }
            Self::AddEvent(id) => {
                let president = draft
                    .president_mut(id)
                    .ok_or(DraftError::UnknownPresident(id))?;
                president.events.push(TimelineEventForm::blank());
                Ok(())
            }
            Self::RemoveEvent { president, event } => {
                let form = draft
                    .president_mut(president)
                    .ok_or(DraftError::UnknownPresident(president))?;
                let index = form
                    .events
                    .iter()
                    .position(|e| e.form_id == event)
                    .ok_or(DraftError::UnknownEvent { president, event })?;
                form.events.remove(index);
                Ok(())
            }
            Self::Event {
                president,
                event,
                field,
            } => {
                let form = draft
                    .president_mut(president)
                    .ok_or(DraftError::UnknownPresident(president))?
                    .event_mut(event)
                    .ok_or(DraftError::UnknownEvent { president, event })?;
                match field {
                    EventField::Date(value) => form.date = value,
                    EventField::Kind(value) => form.kind = value,
                    EventField::Text(value) => form.text = value,
                }
                Ok(())
            }
            Self::AddMonarch => {
                draft.monarchs.push(MonarchForm::blank());
                Ok(())
            }
            Self::RemoveMonarch(id) => {
                let index = draft
                    .monarchs
                    .iter()
                    .position(|m| m.form_id == id)
                    .ok_or(DraftError::UnknownMonarch(id))?;
                draft.monarchs.remove(index);
                Ok(())
            }
            Self::Monarch(id, field) => {
                let monarch = draft
                    .monarch_mut(id)
                    .ok_or(DraftError::UnknownMonarch(id))?;
                match field {
                    MonarchField::Name(value) => monarch.name = value,
                    MonarchField::Birth(value) => monarch.birth = value,
                    MonarchField::Death(value) => monarch.death = value,
                    MonarchField::StartReign(value) => monarch.start_reign = value,
                    MonarchField::EndReign(value) => monarch.end_reign = value,
                    MonarchField::DeathCause(value) => monarch.death_cause = value,
                    MonarchField::Notes(value) => monarch.notes = value,
                    MonarchField::ImageUrl(value) => monarch.image_url = value,
                }
                Ok(())
            }
        }
    }
}
