//! In-memory holder of the current note collection.
//!
//! # Responsibility
//! - Own the current `NoteState` and apply transitions through `reduce`.
//! - Expose read-only access for list rendering and form seeding.
//!
//! # Invariants
//! - All mutation goes through `restore`, `add_or_update` or `remove`.
//! - Transitions are synchronous and never touch storage.

use crate::model::note::Note;
use crate::model::state::NoteState;
use crate::store::reducer::{reduce, NoteAction};
use log::debug;

/// Owner of the in-memory note collection.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    state: NoteState,
}

impl NoteStore {
    /// Creates a store holding the empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collection.
    pub fn state(&self) -> &NoteState {
        &self.state
    }

    /// Current notes in collection order.
    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    /// Applies one transition and returns the new collection.
    pub fn dispatch(&mut self, action: NoteAction) -> &NoteState {
        let label = action.label();
        let next = reduce(&self.state, action);
        debug!(
            "event=note_transition module=store action={} before={} after={}",
            label,
            self.state.len(),
            next.len()
        );
        self.state = next;
        &self.state
    }

    /// Replaces the held collection verbatim.
    pub fn restore(&mut self, state: NoteState) -> &NoteState {
        self.dispatch(NoteAction::Restore(state))
    }

    /// Updates the note with the same id in place, or appends a copy.
    pub fn add_or_update(&mut self, note: Note) -> &NoteState {
        self.dispatch(NoteAction::Upsert(note))
    }

    /// Removes the note with the same id; absent ids are ignored.
    pub fn remove(&mut self, note: &Note) -> &NoteState {
        self.dispatch(NoteAction::Remove(note.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::NoteStore;
    use crate::model::note::Note;

    #[test]
    fn new_store_is_empty() {
        let store = NoteStore::new();
        assert!(store.state().is_empty());
        assert!(store.notes().is_empty());
    }

    #[test]
    fn snapshot_taken_before_mutation_stays_valid() {
        let mut store = NoteStore::new();
        store.add_or_update(Note::with_id("1", "Acme", "Bug", "T1", "B1"));
        let snapshot = store.state().clone();

        store.add_or_update(Note::with_id("1", "Acme", "Bug", "changed", "B1"));
        assert_eq!(snapshot.notes[0].title, "T1");
        assert_eq!(store.notes()[0].title, "changed");
    }
}
