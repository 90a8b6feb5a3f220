//! Domain model for client notes.
//!
//! # Responsibility
//! - Define the `Note` record and the ordered `NoteState` collection.
//! - Define the edit-form input shape and its validation rules.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - A collection never holds two notes with the same id.

pub mod note;
pub mod state;
