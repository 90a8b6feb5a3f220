//! Flutter-facing bindings for ClientNotes core.

pub mod api;
