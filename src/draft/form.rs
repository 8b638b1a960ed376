use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::models::dates::{format_date, format_instant};
use crate::models::{Country, EventType, Monarch, President, TimelineEvent};

static NEXT_FORM_ID: AtomicU64 = AtomicU64::new(1);

/// In-session correlation key for a form entry.
///
/// Form ids keep UI selection stable while the operator edits. They come from
/// a process-wide counter, so an id is never handed out twice (not even after
/// an undo brings back an older draft), and they are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormId(u64);

impl FormId {
    pub fn next() -> Self {
        Self(NEXT_FORM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The editable form of a [`Country`].
///
/// Dates are kept exactly as the operator typed them; an empty string means
/// "missing". Use [`crate::normalize`] to turn a draft into a payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryDraft {
    /// Server identifier, `None` until the country is first saved.
    pub id: Option<Uuid>,
    pub code: String,
    pub name: String,
    pub start: String,
    pub end: Option<String>,
    pub presidents: Vec<PresidentForm>,
    pub monarchs: Vec<MonarchForm>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresidentForm {
    pub form_id: FormId,
    pub name: String,
    pub party: String,
    pub birth: String,
    pub death: Option<String>,
    pub events: Vec<TimelineEventForm>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonarchForm {
    pub form_id: FormId,
    pub name: String,
    pub birth: String,
    pub death: Option<String>,
    pub start_reign: String,
    pub end_reign: Option<String>,
    pub death_cause: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEventForm {
    pub form_id: FormId,
    pub date: String,
    pub kind: Option<EventType>,
    pub text: String,
}

impl CountryDraft {
    /// A blank draft for a country that has never been saved.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Derive a fresh draft from a canonical record, assigning new form ids.
    pub fn from_record(country: &Country) -> Self {
        Self {
            id: Some(country.id),
            code: country.code.clone(),
            name: country.name.clone(),
            start: format_date(country.start),
            end: country.end.map(format_date),
            presidents: country
                .presidents
                .iter()
                .map(PresidentForm::from_president)
                .collect(),
            monarchs: country
                .monarchs
                .iter()
                .map(MonarchForm::from_monarch)
                .collect(),
        }
    }

    pub fn president(&self, id: FormId) -> Option<&PresidentForm> {
        self.presidents.iter().find(|p| p.form_id == id)
    }

    pub fn president_mut(&mut self, id: FormId) -> Option<&mut PresidentForm> {
        self.presidents.iter_mut().find(|p| p.form_id == id)
    }

    pub fn monarch(&self, id: FormId) -> Option<&MonarchForm> {
        self.monarchs.iter().find(|m| m.form_id == id)
    }

    pub fn monarch_mut(&mut self, id: FormId) -> Option<&mut MonarchForm> {
        self.monarchs.iter_mut().find(|m| m.form_id == id)
    }
}

impl PresidentForm {
    pub fn blank() -> Self {
        Self {
            form_id: FormId::next(),
            name: String::new(),
            party: String::new(),
            birth: String::new(),
            death: None,
            events: Vec::new(),
            image_url: None,
        }
    }

    pub fn from_president(president: &President) -> Self {
        Self {
            form_id: FormId::next(),
            name: president.name.clone(),
            party: president.party.clone(),
            birth: format_date(president.birth),
            death: president.death.map(format_date),
            events: president
                .events
                .iter()
                .map(TimelineEventForm::from_event)
                .collect(),
            image_url: president.image_url.clone(),
        }
    }

    pub fn event(&self, id: FormId) -> Option<&TimelineEventForm> {
        self.events.iter().find(|e| e.form_id == id)
    }

    pub fn event_mut(&mut self, id: FormId) -> Option<&mut TimelineEventForm> {
        self.events.iter_mut().find(|e| e.form_id == id)
    }
}

impl MonarchForm {
    pub fn blank() -> Self {
        Self {
            form_id: FormId::next(),
            name: String::new(),
            birth: String::new(),
            death: None,
            start_reign: String::new(),
            end_reign: None,
            death_cause: None,
            notes: None,
            image_url: None,
        }
    }

    pub fn from_monarch(monarch: &Monarch) -> Self {
        Self {
            form_id: FormId::next(),
            name: monarch.name.clone(),
            birth: format_date(monarch.birth),
            death: monarch.death.map(format_date),
            start_reign: format_date(monarch.start_reign),
            end_reign: monarch.end_reign.map(format_date),
            death_cause: monarch.death_cause.clone(),
            notes: monarch.notes.clone(),
            image_url: monarch.image_url.clone(),
        }
    }
}

impl TimelineEventForm {
    pub fn blank() -> Self {
        Self {
            form_id: FormId::next(),
            date: String::new(),
            kind: None,
            text: String::new(),
        }
    }

    pub fn from_event(event: &TimelineEvent) -> Self {
        Self {
            form_id: FormId::next(),
            date: format_instant(event.date),
            kind: event.kind,
            text: event.text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_ids_are_never_reused() {
        let first = PresidentForm::blank();
        let second = PresidentForm::blank();
        let event = TimelineEventForm::blank();
        assert_ne!(first.form_id, second.form_id);
        assert_ne!(second.form_id, event.form_id);
    }

    #[test]
    fn cloned_draft_is_independent_at_every_depth() {
        let mut original = CountryDraft::empty();
        let mut president = PresidentForm::blank();
        president.name = "Ada".to_string();
        let mut event = TimelineEventForm::blank();
        event.text = "Sworn in".to_string();
        president.events.push(event);
        original.presidents.push(president);
        original.monarchs.push(MonarchForm::blank());

        let mut copy = original.clone();
        assert_eq!(copy, original);

        copy.presidents[0].name = "Grace".to_string();
        copy.presidents[0].events[0].text = "Resigned".to_string();
        copy.presidents[0].events.push(TimelineEventForm::blank());
        copy.monarchs[0].notes = Some("changed".to_string());

        assert_eq!(original.presidents[0].name, "Ada");
        assert_eq!(original.presidents[0].events.len(), 1);
        assert_eq!(original.presidents[0].events[0].text, "Sworn in");
        assert_eq!(original.monarchs[0].notes, None);
    }
}
