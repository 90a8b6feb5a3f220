//! Persistence bridge between the note store and local storage.
//!
//! # Responsibility
//! - Own the single snapshot key and its JSON document layout.
//! - Report read/write failures as values instead of swallowing them.

pub mod bridge;
