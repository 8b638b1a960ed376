//! One operator's editing session over a single country.
//!
//! [`EditingSession`] owns the draft model and the text views of both
//! collections, and drives saves against any [`CountryStore`]. Time is passed
//! in explicitly so autosave can be driven by whatever clock the host has.

use std::time::{Duration, Instant};

use thiserror::Error;
use uuid::Uuid;

use crate::draft::{CountryDraft, DraftEdit, DraftError, DraftModel, Selection};
use crate::models::{Country, CountryInput};
use crate::normalize::{normalize_for_save, to_payload};
use crate::store::{CountryStore, StoreError};
use crate::text_sync::{Collection, ParseError, TextView};
use crate::validate::{validate_semantics, validate_structure, SemanticWarning};

pub const DEFAULT_AUTOSAVE_IDLE: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("A save is already in progress")]
    AlreadySaving,

    #[error("Draft has {} validation error(s)", .0.len())]
    Invalid(Vec<String>),

    #[error("{} text could not be applied: {source}", .collection.as_str())]
    Parse {
        collection: Collection,
        source: ParseError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A save that has passed validation and is waiting on the store.
#[derive(Debug, Clone)]
pub struct SaveTicket {
    id: Option<Uuid>,
    payload: CountryInput,
    revision: u64,
}

impl SaveTicket {
    /// The record being replaced, or `None` for a first save.
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    pub fn payload(&self) -> &CountryInput {
        &self.payload
    }
}

/// Debounced idle timer. Every mutation pushes the deadline out again.
#[derive(Debug, Clone, Copy)]
struct Autosave {
    idle: Duration,
    deadline: Option<Instant>,
}

#[derive(Debug)]
pub struct EditingSession {
    model: DraftModel,
    presidents_text: TextView,
    monarchs_text: TextView,
    selection: Selection,
    saving: bool,
    message: Option<String>,
    autosave: Autosave,
}

impl EditingSession {
    pub fn new(model: DraftModel, autosave_idle: Duration) -> Self {
        let presidents_text = TextView::new(Collection::Presidents, &model);
        let monarchs_text = TextView::new(Collection::Monarchs, &model);
        Self {
            model,
            presidents_text,
            monarchs_text,
            selection: Selection::default(),
            saving: false,
            message: None,
            autosave: Autosave {
                idle: autosave_idle,
                deadline: None,
            },
        }
    }

    /// Start editing a persisted record.
    pub fn open(country: &Country) -> Self {
        Self::new(DraftModel::from_record(country), DEFAULT_AUTOSAVE_IDLE)
    }

    /// Start editing a country that does not exist yet.
    pub fn blank() -> Self {
        Self::new(DraftModel::empty(), DEFAULT_AUTOSAVE_IDLE)
    }

    pub fn model(&self) -> &DraftModel {
        &self.model
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = selection;
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_dirty(&self) -> bool {
        self.model.is_dirty()
            || self.presidents_text.is_text_dirty()
            || self.monarchs_text.is_text_dirty()
    }

    /// Structural errors from the last refused save.
    pub fn errors(&self) -> &[String] {
        self.model.errors()
    }

    /// The outcome of the last failed save, if it has not been superseded.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Advisory warnings for the current draft.
    pub fn warnings(&self) -> Vec<SemanticWarning> {
        validate_semantics(self.model.draft())
    }

    pub fn text(&self, collection: Collection) -> &TextView {
        match collection {
            Collection::Presidents => &self.presidents_text,
            Collection::Monarchs => &self.monarchs_text,
        }
    }

    fn text_mut(&mut self, collection: Collection) -> &mut TextView {
        match collection {
            Collection::Presidents => &mut self.presidents_text,
            Collection::Monarchs => &mut self.monarchs_text,
        }
    }

    // ============================================================
    // Mutations
    // ============================================================

    pub fn apply_edit(&mut self, edit: DraftEdit, now: Instant) -> Result<bool, DraftError> {
        let changed = self.model.apply_edit(edit)?;
        if changed {
            self.changed(now);
        }
        Ok(changed)
    }

    pub fn apply_change<F>(&mut self, updater: F, now: Instant) -> bool
    where
        F: FnOnce(&mut CountryDraft),
    {
        let changed = self.model.apply_change(updater);
        if changed {
            self.changed(now);
        }
        changed
    }

    pub fn undo(&mut self, now: Instant) -> bool {
        let undone = self.model.undo();
        if undone {
            self.changed(now);
        }
        undone
    }

    /// Throw away every edit, including unapplied text.
    pub fn reset(&mut self) {
        self.model.reset();
        self.presidents_text.reset(&self.model);
        self.monarchs_text.reset(&self.model);
        self.autosave.deadline = None;
        self.message = None;
    }

    /// Record a raw text edit. Nothing reaches the draft until it is applied.
    pub fn edit_text(&mut self, collection: Collection, text: impl Into<String>, now: Instant) {
        self.text_mut(collection).edit(text);
        self.touch(now);
    }

    /// Apply a collection's text. Returns whether the draft changed.
    pub fn apply_text(&mut self, collection: Collection, now: Instant) -> Result<bool, ParseError> {
        let view = match collection {
            Collection::Presidents => &mut self.presidents_text,
            Collection::Monarchs => &mut self.monarchs_text,
        };
        let changed = view.apply(&mut self.model)?;
        if changed {
            self.changed(now);
        }
        Ok(changed)
    }

    pub fn reset_text(&mut self, collection: Collection) {
        let view = match collection {
            Collection::Presidents => &mut self.presidents_text,
            Collection::Monarchs => &mut self.monarchs_text,
        };
        view.reset(&self.model);
    }

    fn changed(&mut self, now: Instant) {
        self.presidents_text.sync(&self.model);
        self.monarchs_text.sync(&self.model);
        self.touch(now);
    }

    // ============================================================
    // Saving
    // ============================================================

    /// Check and package the draft for the store.
    ///
    /// Pending text edits are applied first; a parse failure aborts the save.
    /// Structural errors are recorded on the model and refuse the save. On
    /// success the session is marked as saving until [`finish_save`] runs.
    ///
    /// [`finish_save`]: Self::finish_save
    pub fn begin_save(&mut self) -> Result<SaveTicket, SaveError> {
        if self.saving {
            tracing::warn!("Save requested while another save is in flight");
            return Err(SaveError::AlreadySaving);
        }

        let pending: Vec<_> = [Collection::Presidents, Collection::Monarchs]
            .into_iter()
            .filter(|collection| self.text(*collection).is_text_dirty())
            .collect();

        // Every pending text must parse before any of it reaches the draft.
        for &collection in &pending {
            if let Err(source) = self.text(collection).check() {
                let err = SaveError::Parse { collection, source };
                tracing::info!("Save refused: {}", err);
                self.message = Some(err.to_string());
                return Err(err);
            }
        }
        for collection in pending {
            let view = match collection {
                Collection::Presidents => &mut self.presidents_text,
                Collection::Monarchs => &mut self.monarchs_text,
            };
            view.apply(&mut self.model)
                .map_err(|source| SaveError::Parse { collection, source })?;
            tracing::debug!("Applied pending {} text before saving", collection.as_str());
        }
        self.presidents_text.sync(&self.model);
        self.monarchs_text.sync(&self.model);

        let errors = validate_structure(self.model.draft());
        if !errors.is_empty() {
            tracing::info!("Save refused with {} validation error(s)", errors.len());
            self.model.set_errors(errors.clone());
            return Err(SaveError::Invalid(errors));
        }

        let normalized = normalize_for_save(self.model.draft());
        let ticket = SaveTicket {
            id: normalized.id,
            payload: to_payload(&normalized),
            revision: self.model.revision(),
        };

        self.saving = true;
        self.message = None;
        self.autosave.deadline = None;
        tracing::info!("Saving country {}", ticket.payload.code);
        Ok(ticket)
    }

    /// Settle a save begun with [`begin_save`](Self::begin_save).
    ///
    /// On success the returned record becomes the new baseline, history and
    /// text edits are cleared, and the selection is carried over by position.
    /// On failure the draft is left as it is and the error becomes the
    /// session message.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        outcome: Result<Country, StoreError>,
    ) -> Result<Country, SaveError> {
        self.saving = false;
        match outcome {
            Ok(country) => {
                if self.model.revision() != ticket.revision {
                    tracing::warn!(
                        "Draft changed while saving {}; edits made since are replaced by the saved record",
                        country.code
                    );
                }
                self.selection = self.model.rebaseline(&country, self.selection);
                self.presidents_text.reset(&self.model);
                self.monarchs_text.reset(&self.model);
                self.autosave.deadline = None;
                self.message = None;
                tracing::info!("Saved country {} ({})", country.code, country.id);
                Ok(country)
            }
            Err(e) => {
                tracing::error!("Failed to save country {}: {}", ticket.payload.code, e);
                self.message = Some(e.to_string());
                Err(SaveError::Store(e))
            }
        }
    }

    /// Validate, persist and re-baseline in one step.
    pub async fn save<S: CountryStore>(&mut self, store: &S) -> Result<Country, SaveError> {
        let ticket = self.begin_save()?;
        let payload = ticket.payload.clone();
        let outcome = match ticket.id {
            Some(id) => store.update(id, payload).await,
            None => store.create(payload).await,
        };
        self.finish_save(ticket, outcome)
    }

    // ============================================================
    // Autosave
    // ============================================================

    /// Restart the idle timer.
    pub fn touch(&mut self, now: Instant) {
        self.autosave.deadline = Some(now + self.autosave.idle);
    }

    /// Whether the idle timer has expired with unsaved work and no save running.
    pub fn autosave_due(&self, now: Instant) -> bool {
        self.autosave.deadline.is_some_and(|deadline| now >= deadline)
            && self.is_dirty()
            && !self.saving
    }

    /// Save if the idle timer has expired. Returns `None` when nothing was due.
    pub async fn autosave<S: CountryStore>(
        &mut self,
        store: &S,
        now: Instant,
    ) -> Option<Result<Country, SaveError>> {
        if !self.autosave_due(now) {
            return None;
        }
        tracing::debug!("Autosave timer expired");
        self.autosave.deadline = None;
        Some(self.save(store).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::CountryField;

    #[test]
    fn touch_pushes_the_deadline_out() {
        let mut session = EditingSession::new(DraftModel::empty(), Duration::from_secs(2));
        let start = Instant::now();

        session
            .apply_edit(
                DraftEdit::Country(CountryField::Name("Ruritania".into())),
                start,
            )
            .unwrap();
        assert!(!session.autosave_due(start + Duration::from_secs(1)));
        assert!(session.autosave_due(start + Duration::from_secs(2)));

        session.touch(start + Duration::from_secs(1));
        assert!(!session.autosave_due(start + Duration::from_secs(2)));
        assert!(session.autosave_due(start + Duration::from_secs(3)));
    }

    #[test]
    fn clean_sessions_never_autosave() {
        let mut session = EditingSession::new(DraftModel::empty(), Duration::ZERO);
        let now = Instant::now();
        session.touch(now);
        assert!(!session.autosave_due(now));
    }

    #[test]
    fn invalid_drafts_are_refused_and_errors_recorded() {
        let mut session = EditingSession::blank();
        let err = session.begin_save().unwrap_err();

        assert!(matches!(err, SaveError::Invalid(ref errors) if !errors.is_empty()));
        assert!(!session.errors().is_empty());
        assert!(!session.is_saving());
    }
}
