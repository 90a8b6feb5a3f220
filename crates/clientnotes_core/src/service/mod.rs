//! Core use-case services.
//!
//! # Responsibility
//! - Compose the note store with its persistence bridge.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_session;
