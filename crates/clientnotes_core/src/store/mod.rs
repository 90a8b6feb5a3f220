//! Note store: state holder plus pure transitions.
//!
//! # Responsibility
//! - Compute next collections from `RESTORE`/`UPSERT`/`REMOVE` intents.
//! - Keep transitions free of side effects; persistence observes results.
//!
//! # See also
//! - crates/clientnotes_core/src/persistence/bridge.rs

pub mod note_store;
pub mod reducer;
