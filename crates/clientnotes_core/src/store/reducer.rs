//! Pure transition function for the note collection.
//!
//! # Invariants
//! - `reduce` never mutates its input; callers holding the previous state
//!   keep seeing the previous content.
//! - Upsert matches strictly by id and keeps the matched position.
//! - Remove of an absent id is a no-op, not an error.

use crate::model::note::Note;
use crate::model::state::NoteState;

/// Intent applied to the note collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteAction {
    /// Replace the whole collection verbatim.
    Restore(NoteState),
    /// Update the note with the same id in place, or append it.
    Upsert(Note),
    /// Drop every note with the same id.
    Remove(Note),
}

impl NoteAction {
    /// Stable transition label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restore(_) => "RESTORE",
            Self::Upsert(_) => "UPSERT",
            Self::Remove(_) => "REMOVE",
        }
    }
}

/// Computes the next collection for `action`.
pub fn reduce(state: &NoteState, action: NoteAction) -> NoteState {
    match action {
        NoteAction::Restore(next) => next,
        NoteAction::Upsert(note) => upsert(state, note),
        NoteAction::Remove(note) => remove(state, &note),
    }
}

fn upsert(state: &NoteState, note: Note) -> NoteState {
    let mut notes = state.notes.clone();
    match state.position(&note.id) {
        Some(index) => notes[index].overwrite_fields_from(&note),
        None => notes.push(note),
    }
    NoteState { notes }
}

fn remove(state: &NoteState, note: &Note) -> NoteState {
    let notes = state
        .notes
        .iter()
        .filter(|current| current.id != note.id)
        .cloned()
        .collect();
    NoteState { notes }
}

#[cfg(test)]
mod tests {
    use super::{reduce, NoteAction};
    use crate::model::note::Note;
    use crate::model::state::NoteState;

    fn note(id: &str, title: &str) -> Note {
        Note::with_id(id, "Acme", "Bug", title, "body")
    }

    #[test]
    fn upsert_leaves_previous_state_untouched() {
        let before = NoteState::from_notes(vec![note("1", "old")]);
        let after = reduce(&before, NoteAction::Upsert(note("1", "new")));
        assert_eq!(before.notes[0].title, "old");
        assert_eq!(after.notes[0].title, "new");
    }

    #[test]
    fn remove_leaves_previous_state_untouched() {
        let before = NoteState::from_notes(vec![note("1", "t"), note("2", "t")]);
        let after = reduce(&before, NoteAction::Remove(note("1", "t")));
        assert_eq!(before.len(), 2);
        assert_eq!(after.ids(), vec!["2"]);
    }

    #[test]
    fn same_content_different_ids_are_distinct() {
        let state = reduce(&NoteState::new(), NoteAction::Upsert(note("1", "same")));
        let state = reduce(&state, NoteAction::Upsert(note("2", "same")));
        assert_eq!(state.ids(), vec!["1", "2"]);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(NoteAction::Restore(NoteState::new()).label(), "RESTORE");
        assert_eq!(NoteAction::Upsert(note("1", "t")).label(), "UPSERT");
        assert_eq!(NoteAction::Remove(note("1", "t")).label(), "REMOVE");
    }
}
