//! Raw-text editing of the president and monarch collections.
//!
//! Each collection can be edited either through structured form fields or as
//! a JSON document. [`TextView`] holds the text for one collection and tracks
//! how it relates to the structured draft with a single [`TextState`]:
//!
//! - `Clean`: the text matches what was last generated or applied.
//! - `TextDirty`: the operator edited the text and has not applied it.
//! - `StructureDirty`: the draft changed underneath unedited text, so the
//!   text is stale and will be regenerated on the next sync.
//!
//! Parsing is all-or-nothing: undecodable text yields a single message, and a
//! decodable document with shape problems reports every problem at once.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::draft::{DraftModel, MonarchForm, PresidentForm, TimelineEventForm};
use crate::models::EventType;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Text is not valid JSON: {0}")]
    Decode(String),

    #[error("Text has {} problem(s): {}", .0.len(), .0.join("; "))]
    Shape(Vec<String>),
}

impl ParseError {
    /// Every message to display, one per line.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Decode(message) => vec![format!("Text is not valid JSON: {message}")],
            Self::Shape(problems) => problems.clone(),
        }
    }
}

/// The collections that have a text representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Presidents,
    Monarchs,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presidents => "presidents",
            Self::Monarchs => "monarchs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextState {
    #[default]
    Clean,
    TextDirty,
    StructureDirty,
}

// Text shapes. Field order here is the serialized order.

#[derive(Debug, Serialize)]
struct EventText<'a> {
    date: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<EventType>,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct PresidentText<'a> {
    name: &'a str,
    party: &'a str,
    birth: &'a str,
    death: Option<&'a str>,
    events: Vec<EventText<'a>>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct MonarchText<'a> {
    name: &'a str,
    birth: &'a str,
    death: Option<&'a str>,
    start_reign: &'a str,
    end_reign: Option<&'a str>,
    death_cause: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
}

/// Render presidents as pretty-printed JSON. Form ids are not included.
pub fn serialize_presidents(presidents: &[PresidentForm]) -> String {
    let texts: Vec<_> = presidents
        .iter()
        .map(|p| PresidentText {
            name: &p.name,
            party: &p.party,
            birth: &p.birth,
            death: p.death.as_deref(),
            events: p
                .events
                .iter()
                .map(|e| EventText {
                    date: &e.date,
                    kind: e.kind,
                    text: &e.text,
                })
                .collect(),
            image_url: p.image_url.as_deref(),
        })
        .collect();
    to_pretty(&texts)
}

/// Render monarchs as pretty-printed JSON. Form ids are not included.
pub fn serialize_monarchs(monarchs: &[MonarchForm]) -> String {
    let texts: Vec<_> = monarchs
        .iter()
        .map(|m| MonarchText {
            name: &m.name,
            birth: &m.birth,
            death: m.death.as_deref(),
            start_reign: &m.start_reign,
            end_reign: m.end_reign.as_deref(),
            death_cause: m.death_cause.as_deref(),
            notes: m.notes.as_deref(),
            image_url: m.image_url.as_deref(),
        })
        .collect();
    to_pretty(&texts)
}

fn to_pretty<T: Serialize>(value: &T) -> String {
    // Serializing plain structs of strings cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

/// Parse president text into forms with freshly assigned form ids.
pub fn parse_presidents(text: &str) -> Result<Vec<PresidentForm>, ParseError> {
    let items = decode_array(text)?;
    let mut problems = Vec::new();
    let forms = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let mut fields = Fields::new(format!("[{index}]"), item, &mut problems)?;
            let name = fields.required_string("name");
            let party = fields.required_string("party");
            let birth = fields.required_string("birth");
            let death = fields.nullable_string("death");
            let image_url = fields.optional_string("imageUrl");
            let events = fields.array("events").map(|events| {
                events
                    .iter()
                    .enumerate()
                    .filter_map(|(event_index, event)| {
                        let mut fields = Fields::new(
                            format!("[{index}].events[{event_index}]"),
                            event,
                            fields.problems,
                        )?;
                        let date = fields.required_string("date");
                        let kind = fields.event_type("type");
                        let text = fields.required_string("text");
                        Some(TimelineEventForm {
                            date: date?,
                            kind: kind?,
                            text: text?,
                            ..TimelineEventForm::blank()
                        })
                    })
                    .collect::<Vec<_>>()
            });
            Some(PresidentForm {
                name: name?,
                party: party?,
                birth: birth?,
                death: death?,
                events: events?,
                image_url: image_url?,
                ..PresidentForm::blank()
            })
        })
        .collect();
    finish(forms, problems)
}

/// Parse monarch text into forms with freshly assigned form ids.
pub fn parse_monarchs(text: &str) -> Result<Vec<MonarchForm>, ParseError> {
    let items = decode_array(text)?;
    let mut problems = Vec::new();
    let forms = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let mut fields = Fields::new(format!("[{index}]"), item, &mut problems)?;
            let name = fields.required_string("name");
            let birth = fields.required_string("birth");
            let death = fields.nullable_string("death");
            let start_reign = fields.required_string("start_reign");
            let end_reign = fields.nullable_string("end_reign");
            let death_cause = fields.nullable_string("death_cause");
            let notes = fields.optional_string("notes");
            let image_url = fields.optional_string("imageUrl");
            Some(MonarchForm {
                name: name?,
                birth: birth?,
                death: death?,
                start_reign: start_reign?,
                end_reign: end_reign?,
                death_cause: death_cause?,
                notes: notes?,
                image_url: image_url?,
                ..MonarchForm::blank()
            })
        })
        .collect();
    finish(forms, problems)
}

fn decode_array(text: &str) -> Result<Vec<Value>, ParseError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ParseError::Decode(e.to_string()))?;
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ParseError::Shape(vec![format!(
            "expected a list, found {}",
            kind_of(&other)
        )])),
    }
}

fn finish<T>(forms: Vec<T>, problems: Vec<String>) -> Result<Vec<T>, ParseError> {
    if problems.is_empty() {
        Ok(forms)
    } else {
        Err(ParseError::Shape(problems))
    }
}

/// Field reader for one JSON object that records problems instead of
/// stopping at the first one.
struct Fields<'a, 'p> {
    path: String,
    object: &'a Map<String, Value>,
    problems: &'p mut Vec<String>,
}

impl<'a, 'p> Fields<'a, 'p> {
    fn new(path: String, value: &'a Value, problems: &'p mut Vec<String>) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Self {
                path,
                object,
                problems,
            }),
            other => {
                problems.push(format!("{path}: expected an object, found {}", kind_of(other)));
                None
            }
        }
    }

    fn problem(&mut self, field: &str, message: impl std::fmt::Display) {
        self.problems.push(format!("{}.{field}: {message}", self.path));
    }

    fn required_string(&mut self, field: &str) -> Option<String> {
        match self.object.get(field) {
            Some(Value::String(value)) => Some(value.clone()),
            None => {
                self.problem(field, "is required");
                None
            }
            Some(other) => {
                self.problem(field, format!("expected a string, found {}", kind_of(other)));
                None
            }
        }
    }

    /// A key that must be present but may be `null`.
    fn nullable_string(&mut self, field: &str) -> Option<Option<String>> {
        match self.object.get(field) {
            None => {
                self.problem(field, "is required (use null when unknown)");
                None
            }
            Some(_) => self.optional_string(field),
        }
    }

    /// A key that may be missing or `null`.
    fn optional_string(&mut self, field: &str) -> Option<Option<String>> {
        match self.object.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(value)) => Some(Some(value.clone())),
            Some(other) => {
                self.problem(
                    field,
                    format!("expected a string or null, found {}", kind_of(other)),
                );
                None
            }
        }
    }

    fn array(&mut self, field: &str) -> Option<&'a Vec<Value>> {
        match self.object.get(field) {
            Some(Value::Array(items)) => Some(items),
            None => {
                self.problem(field, "is required");
                None
            }
            Some(other) => {
                self.problem(field, format!("expected a list, found {}", kind_of(other)));
                None
            }
        }
    }

    fn event_type(&mut self, field: &str) -> Option<Option<EventType>> {
        match self.object.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::Number(number)) => {
                let kind = number
                    .as_u64()
                    .and_then(|code| u8::try_from(code).ok())
                    .and_then(EventType::from_code);
                if kind.is_none() {
                    self.problem(field, format!("unknown event type {number} (expected 1, 2 or 3)"));
                    return None;
                }
                Some(kind)
            }
            Some(other) => {
                self.problem(field, format!("expected 1, 2, 3 or null, found {}", kind_of(other)));
                None
            }
        }
    }
}

fn same_entries<T>(parsed: &[T], current: &[T], same: fn(&T, &T) -> bool) -> bool {
    parsed.len() == current.len() && parsed.iter().zip(current).all(|(a, b)| same(a, b))
}

// Content comparisons that ignore form ids.

fn same_president(a: &PresidentForm, b: &PresidentForm) -> bool {
    a.name == b.name
        && a.party == b.party
        && a.birth == b.birth
        && a.death == b.death
        && a.image_url == b.image_url
        && same_entries(&a.events, &b.events, same_event)
}

fn same_event(a: &TimelineEventForm, b: &TimelineEventForm) -> bool {
    a.date == b.date && a.kind == b.kind && a.text == b.text
}

fn same_monarch(a: &MonarchForm, b: &MonarchForm) -> bool {
    *a == MonarchForm {
        form_id: a.form_id,
        ..b.clone()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// The text representation of one collection and its sync state.
#[derive(Debug, Clone)]
pub struct TextView {
    collection: Collection,
    text: String,
    state: TextState,
    /// Draft revision the text was last generated from or applied to.
    synced_revision: u64,
}

impl TextView {
    /// Generate a clean view from the current draft.
    pub fn new(collection: Collection, model: &DraftModel) -> Self {
        let mut view = Self {
            collection,
            text: String::new(),
            state: TextState::Clean,
            synced_revision: 0,
        };
        view.reset(model);
        view
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> TextState {
        self.state
    }

    /// Whether the text holds edits that have not been applied.
    pub fn is_text_dirty(&self) -> bool {
        self.state == TextState::TextDirty
    }

    /// Record an operator edit to the raw text.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.state = TextState::TextDirty;
    }

    /// Note a change to the structured draft.
    ///
    /// Unedited text becomes stale; edited text keeps its pending edits.
    pub fn observe(&mut self, model: &DraftModel) {
        if model.revision() != self.synced_revision && self.state == TextState::Clean {
            self.state = TextState::StructureDirty;
        }
    }

    /// Regenerate stale text. Pending text edits are left alone.
    pub fn sync(&mut self, model: &DraftModel) {
        self.observe(model);
        if self.state == TextState::StructureDirty {
            self.reset(model);
        }
    }

    /// Parse the text without touching the draft.
    pub fn check(&self) -> Result<(), ParseError> {
        match self.collection {
            Collection::Presidents => parse_presidents(&self.text).map(|_| ()),
            Collection::Monarchs => parse_monarchs(&self.text).map(|_| ()),
        }
    }

    /// Parse the text and replace the collection in the draft with it.
    ///
    /// The replacement goes through the draft's mutation gate, so it is
    /// undoable like any other change. Text describing exactly what the draft
    /// already holds is not a change: the draft, its form ids and its history
    /// are left alone. Returns whether the draft changed. On error nothing
    /// changes and the text stays dirty.
    pub fn apply(&mut self, model: &mut DraftModel) -> Result<bool, ParseError> {
        let changed = match self.collection {
            Collection::Presidents => {
                let presidents = parse_presidents(&self.text)?;
                !same_entries(&presidents, &model.draft().presidents, same_president)
                    && model.apply_change(|draft| draft.presidents = presidents)
            }
            Collection::Monarchs => {
                let monarchs = parse_monarchs(&self.text)?;
                !same_entries(&monarchs, &model.draft().monarchs, same_monarch)
                    && model.apply_change(|draft| draft.monarchs = monarchs)
            }
        };
        self.state = TextState::Clean;
        self.synced_revision = model.revision();
        Ok(changed)
    }

    /// Discard text edits and regenerate from the current draft.
    pub fn reset(&mut self, model: &DraftModel) {
        self.text = match self.collection {
            Collection::Presidents => serialize_presidents(&model.draft().presidents),
            Collection::Monarchs => serialize_monarchs(&model.draft().monarchs),
        };
        self.state = TextState::Clean;
        self.synced_revision = model.revision();
    }
}
