//! Core domain logic for ClientNotes.
//! This crate is the single source of truth for note invariants.

pub mod kv;
pub mod logging;
pub mod model;
pub mod persistence;
pub mod service;
pub mod store;
mod text;

pub use kv::{KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore, KV_SCHEMA_VERSION};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{generate_note_id, Note, NoteField, NoteForm, NoteFormError, NoteId};
pub use model::state::NoteState;
pub use persistence::bridge::{
    decode_snapshot, encode_snapshot, CorruptStatePolicy, LoadOutcome, PersistenceBridge,
    PersistenceError, STORAGE_NOTE_STATE_KEY,
};
pub use service::note_session::{
    derive_body_preview, NoteListItem, NoteSession, NoteSessionError, SessionConfig,
};
pub use store::note_store::NoteStore;
pub use store::reducer::{reduce, NoteAction};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
