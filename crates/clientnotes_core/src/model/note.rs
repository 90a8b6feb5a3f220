//! Note domain model and edit-form input shape.
//!
//! # Responsibility
//! - Define the canonical `Note` record rendered by list/detail screens.
//! - Define the `NoteForm` input captured by the edit screen and its rules.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes afterwards.
//! - Form rules are enforced by `NoteForm::validate()`, never by the store.
//!
//! # See also
//! - crates/clientnotes_core/src/store/reducer.rs

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum title length accepted by the edit form, in characters.
pub const NOTE_TITLE_MAX_CHARS: usize = 60;

/// Opaque, unique note identifier.
///
/// Kept as a type alias so persisted ids from older snapshots (any string)
/// still deserialize.
pub type NoteId = String;

/// One user-authored note tagged with a client and a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable identity used for upsert/remove matching.
    pub id: NoteId,
    /// Client label picked from the UI's client list.
    pub client: String,
    /// Category label picked from the UI's category list.
    pub category: String,
    /// Short title shown on the list card.
    pub title: String,
    /// Free text body.
    pub body: String,
}

impl Note {
    /// Creates a note with a freshly generated id.
    pub fn new(
        client: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::with_id(generate_note_id(), client, category, title, body)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used when re-saving a note seeded from an existing one, and by import
    /// paths where identity already exists.
    pub fn with_id(
        id: impl Into<NoteId>,
        client: impl Into<String>,
        category: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            client: client.into(),
            category: category.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// Copies every mutable field from `other`, leaving `id` untouched.
    pub fn overwrite_fields_from(&mut self, other: &Note) {
        self.client.clone_from(&other.client);
        self.category.clone_from(&other.category);
        self.title.clone_from(&other.title);
        self.body.clone_from(&other.body);
    }
}

/// Generates a new collision-resistant note id (UUID v4, hyphenated).
pub fn generate_note_id() -> NoteId {
    Uuid::new_v4().to_string()
}

/// Field identifiers used in form validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteField {
    Client,
    Category,
    Title,
    Body,
}

impl NoteField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Category => "category",
            Self::Title => "title",
            Self::Body => "body",
        }
    }
}

/// Validation error for edit-form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFormError {
    /// Required field is empty or whitespace only.
    MissingField(NoteField),
    /// Title exceeds `NOTE_TITLE_MAX_CHARS`.
    TitleTooLong { chars: usize, max: usize },
}

impl Display for NoteFormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "`{}` is required", field.as_str()),
            Self::TitleTooLong { chars, max } => {
                write!(f, "title has {chars} characters; at most {max} allowed")
            }
        }
    }
}

impl Error for NoteFormError {}

/// Edit-form input: every note field except identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    pub client: String,
    pub category: String,
    pub title: String,
    pub body: String,
}

impl NoteForm {
    /// Checks the rules the edit screen applies before saving.
    ///
    /// A value made only of whitespace counts as blank.
    ///
    /// # Errors
    /// - `MissingField` for the first blank field, in form order.
    /// - `TitleTooLong` when the title exceeds `NOTE_TITLE_MAX_CHARS`.
    pub fn validate(&self) -> Result<(), NoteFormError> {
        let fields = [
            (NoteField::Client, self.client.as_str()),
            (NoteField::Category, self.category.as_str()),
            (NoteField::Title, self.title.as_str()),
            (NoteField::Body, self.body.as_str()),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                return Err(NoteFormError::MissingField(field));
            }
        }

        let chars = self.title.chars().count();
        if chars > NOTE_TITLE_MAX_CHARS {
            return Err(NoteFormError::TitleTooLong {
                chars,
                max: NOTE_TITLE_MAX_CHARS,
            });
        }

        Ok(())
    }

    /// Builds the note to save.
    ///
    /// Reuses `existing_id` when the form was seeded from a note, otherwise
    /// generates a new id. Does not validate.
    pub fn into_note(self, existing_id: Option<&str>) -> Note {
        let id = existing_id.map_or_else(generate_note_id, str::to_string);
        Note {
            id,
            client: self.client,
            category: self.category,
            title: self.title,
            body: self.body,
        }
    }
}

impl From<&Note> for NoteForm {
    fn from(note: &Note) -> Self {
        Self {
            client: note.client.clone(),
            category: note.category.clone(),
            title: note.title.clone(),
            body: note.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteField, NoteForm, NoteFormError, NOTE_TITLE_MAX_CHARS};

    fn filled_form() -> NoteForm {
        NoteForm {
            client: "Acme".to_string(),
            category: "Bug".to_string(),
            title: "T1".to_string(),
            body: "B1".to_string(),
        }
    }

    #[test]
    fn new_notes_get_distinct_ids() {
        let first = Note::new("Acme", "Bug", "T", "B");
        let second = Note::new("Acme", "Bug", "T", "B");
        assert_ne!(first.id, second.id);
        assert!(uuid::Uuid::parse_str(&first.id).is_ok());
    }

    #[test]
    fn overwrite_fields_keeps_id() {
        let mut target = Note::with_id("1", "Acme", "Bug", "T1", "B1");
        let source = Note::with_id("other", "Globex", "Feature", "T2", "B2");
        target.overwrite_fields_from(&source);
        assert_eq!(target.id, "1");
        assert_eq!(target.client, "Globex");
        assert_eq!(target.title, "T2");
    }

    #[test]
    fn validate_reports_first_blank_field() {
        let mut form = filled_form();
        form.category = "  ".to_string();
        form.body = String::new();
        assert_eq!(
            form.validate(),
            Err(NoteFormError::MissingField(NoteField::Category))
        );
    }

    #[test]
    fn validate_treats_whitespace_only_values_as_blank() {
        let mut form = filled_form();
        form.title = " \t\n ".to_string();
        assert_eq!(
            form.validate(),
            Err(NoteFormError::MissingField(NoteField::Title))
        );

        form.title = " x ".to_string();
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn validate_limits_title_by_chars_not_bytes() {
        let mut form = filled_form();
        form.title = "é".repeat(NOTE_TITLE_MAX_CHARS);
        assert!(form.validate().is_ok());

        form.title.push('x');
        let err = form.validate().expect_err("61 chars must be rejected");
        assert_eq!(
            err,
            NoteFormError::TitleTooLong {
                chars: NOTE_TITLE_MAX_CHARS + 1,
                max: NOTE_TITLE_MAX_CHARS,
            }
        );
    }

    #[test]
    fn into_note_reuses_existing_id_or_generates_one() {
        let edited = filled_form().into_note(Some("42"));
        assert_eq!(edited.id, "42");

        let created = filled_form().into_note(None);
        assert!(!created.id.is_empty());
        assert_ne!(created.id, "42");
    }

    #[test]
    fn form_seeds_from_note() {
        let note = Note::with_id("7", "Acme", "Bug", "T", "B");
        let form = NoteForm::from(&note);
        assert_eq!(form.into_note(Some(note.id.as_str())), note);
    }
}
