//! Note session: the store plus its persistence bridge.
//!
//! # Responsibility
//! - Load the stored snapshot before any mutation is accepted.
//! - Expose the three UI entry points (`restore_state`, `add_note`,
//!   `remove_note`) and persist after each committed transition.
//! - Provide list/detail projections for rendering.
//!
//! # Invariants
//! - Opening a session completes the startup load before returning, so an
//!   early mutation can never be overwritten by a late load.
//! - A persistence failure is returned to the caller; the in-memory
//!   transition stays committed.

use crate::kv::KeyValueStore;
use crate::model::note::{Note, NoteForm, NoteFormError};
use crate::model::state::NoteState;
use crate::persistence::bridge::{
    CorruptStatePolicy, LoadOutcome, PersistenceBridge, PersistenceError, STORAGE_NOTE_STATE_KEY,
};
use crate::store::note_store::NoteStore;
use crate::text::single_line;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Body preview length on list cards, in characters.
pub const NOTE_PREVIEW_MAX_CHARS: usize = 240;

/// Session wiring options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Key holding the snapshot document.
    pub storage_key: String,
    /// Recovery policy for undecodable snapshots.
    pub corrupt_state_policy: CorruptStatePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_NOTE_STATE_KEY.to_string(),
            corrupt_state_policy: CorruptStatePolicy::default(),
        }
    }
}

/// Service error for note session use-cases.
#[derive(Debug)]
pub enum NoteSessionError {
    /// Edit-form input rejected; nothing was changed.
    InvalidForm(NoteFormError),
    /// Storage read/write failed.
    Persistence(PersistenceError),
}

impl Display for NoteSessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidForm(err) => write!(f, "invalid note: {err}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteSessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidForm(err) => Some(err),
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<NoteFormError> for NoteSessionError {
    fn from(value: NoteFormError) -> Self {
        Self::InvalidForm(value)
    }
}

impl From<PersistenceError> for NoteSessionError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

/// List-card projection of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub client: String,
    pub category: String,
    /// Whitespace-collapsed body, capped at `NOTE_PREVIEW_MAX_CHARS`.
    pub preview: String,
}

impl From<&Note> for NoteListItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            client: note.client.clone(),
            category: note.category.clone(),
            preview: derive_body_preview(&note.body),
        }
    }
}

/// Note store bound to a persistence bridge.
pub struct NoteSession<K: KeyValueStore> {
    store: NoteStore,
    bridge: PersistenceBridge<K>,
    load_outcome: LoadOutcome,
}

impl<K: KeyValueStore> NoteSession<K> {
    /// Opens a session over `kv` and performs the startup load.
    ///
    /// # Errors
    /// - `Persistence(ReadFailed)` when the snapshot cannot be read.
    /// - `Persistence(CorruptPersistedState)` under
    ///   `CorruptStatePolicy::Surface`.
    pub fn open(kv: K, config: SessionConfig) -> Result<Self, NoteSessionError> {
        let bridge = PersistenceBridge::new(kv, config.storage_key, config.corrupt_state_policy);
        let mut store = NoteStore::new();
        let load_outcome = bridge.load_on_startup(&mut store)?;

        let mut session = Self {
            store,
            bridge,
            load_outcome,
        };

        // Restore is a committed transition like any other.
        if matches!(load_outcome, LoadOutcome::Restored { .. }) {
            if let Err(err) = session.persist() {
                warn!(
                    "event=session_open module=service status=degraded error_code={} error={}",
                    err.code(),
                    err
                );
            }
        }

        info!(
            "event=session_open module=service status=ok note_count={}",
            session.store.state().len()
        );
        Ok(session)
    }

    /// Opens a session with `SessionConfig::default()`.
    pub fn open_default(kv: K) -> Result<Self, NoteSessionError> {
        Self::open(kv, SessionConfig::default())
    }

    /// Outcome of the startup load.
    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    /// Current collection.
    pub fn state(&self) -> &NoteState {
        self.store.state()
    }

    /// Current notes in display order.
    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    /// Finds one note by id, e.g. to seed the edit form.
    pub fn get_note(&self, id: &str) -> Option<&Note> {
        self.store.state().get(id)
    }

    /// List-card projections in display order.
    pub fn list_items(&self) -> Vec<NoteListItem> {
        self.store.notes().iter().map(NoteListItem::from).collect()
    }

    /// Replaces the whole collection and persists it.
    pub fn restore_state(&mut self, state: NoteState) -> Result<(), NoteSessionError> {
        self.store.restore(state);
        self.persist()?;
        Ok(())
    }

    /// Adds a new note or updates the one with the same id, then persists.
    pub fn add_note(&mut self, note: Note) -> Result<(), NoteSessionError> {
        self.store.add_or_update(note);
        self.persist()?;
        Ok(())
    }

    /// Removes the note with the same id (absent ids are ignored), then
    /// persists.
    pub fn remove_note(&mut self, note: &Note) -> Result<(), NoteSessionError> {
        self.store.remove(note);
        self.persist()?;
        Ok(())
    }

    /// Validates edit-form input and saves it.
    ///
    /// `existing` is the note the form was seeded from; its id is reused so
    /// the save updates in place. Returns the saved note.
    ///
    /// # Errors
    /// - `InvalidForm` before any state change.
    /// - `Persistence` after the note was committed in memory.
    pub fn submit_form(
        &mut self,
        existing: Option<&Note>,
        form: NoteForm,
    ) -> Result<Note, NoteSessionError> {
        form.validate()?;
        let note = form.into_note(existing.map(|note| note.id.as_str()));
        self.add_note(note.clone())?;
        Ok(note)
    }

    /// Read access to the backing store.
    pub fn kv(&self) -> &K {
        self.bridge.kv()
    }

    /// Closes the session and returns the backing store.
    pub fn into_kv(self) -> K {
        self.bridge.into_kv()
    }

    fn persist(&mut self) -> Result<(), PersistenceError> {
        self.bridge.persist_on_change(self.store.state())
    }
}

/// Collapses whitespace and caps the body for list cards.
pub fn derive_body_preview(body: &str) -> String {
    single_line(body, NOTE_PREVIEW_MAX_CHARS).0
}

#[cfg(test)]
mod tests {
    use super::{derive_body_preview, NOTE_PREVIEW_MAX_CHARS};

    #[test]
    fn preview_collapses_whitespace() {
        assert_eq!(derive_body_preview("  line1\n\n\tline2  "), "line1 line2");
    }

    #[test]
    fn preview_is_capped_by_chars() {
        let body = "ü".repeat(NOTE_PREVIEW_MAX_CHARS + 10);
        assert_eq!(
            derive_body_preview(&body).chars().count(),
            NOTE_PREVIEW_MAX_CHARS
        );
    }
}
