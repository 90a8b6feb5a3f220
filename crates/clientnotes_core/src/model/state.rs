//! Note collection state and its persisted shape.
//!
//! # Invariants
//! - At most one note per `id`.
//! - Order is insertion order; upserts of an existing id keep its position.
//! - Serialized form is `{"notes":[...]}` with no version field.

use crate::model::note::Note;
use serde::{Deserialize, Serialize};

/// Ordered note collection, unique by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteState {
    pub notes: Vec<Note>,
}

impl NoteState {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already ordered list of notes.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Returns the index of the note with `id`, if present.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    /// Returns the note with `id`, if present.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Returns note ids in collection order.
    pub fn ids(&self) -> Vec<&str> {
        self.notes.iter().map(|note| note.id.as_str()).collect()
    }
}
