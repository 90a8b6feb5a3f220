//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note list/edit use-cases to Dart via FRB.
//! - Own the process-wide note session used by the mobile UI.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - The session is opened (and its snapshot loaded) before the first
//!   mutation is applied.
//! - Once a database path is chosen, calls only ever touch that file: a
//!   failed open is reported on every later call instead of silently
//!   opening another database.
//! - Storage-touching calls are non-`sync`, so Dart awaits them off the UI
//!   isolate.

use clientnotes_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    LoadOutcome, Note, NoteForm, NoteListItem, NoteSession, NoteSessionError, NoteState,
    PersistenceError, SessionConfig, SqliteKvStore,
};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const NOTES_DB_FILE_NAME: &str = "clientnotes.sqlite3";
const NOTES_DB_PATH_ENV: &str = "CLIENTNOTES_DB_PATH";

const SESSION_OPEN_FAILED: &str = "session_open_failed";

static SESSION: Mutex<SessionSlot> = Mutex::new(SessionSlot::Unopened);

enum SessionSlot {
    /// No path chosen yet; the first call opens the default database.
    Unopened,
    Open {
        path: PathBuf,
        session: NoteSession<SqliteKvStore>,
    },
    /// The chosen database could not be opened; later calls retry this path
    /// only.
    Failed { path: PathBuf, reason: String },
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Full note shape exchanged with Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub client: String,
    pub category: String,
    pub title: String,
    pub body: String,
}

/// List-card row for the home screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListRow {
    pub id: String,
    pub title: String,
    pub client: String,
    pub category: String,
    /// Collapsed, capped body text.
    pub preview: String,
}

/// Response envelope for list/detail reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Rows in display order (empty on failure).
    pub items: Vec<NoteListRow>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Response envelope for single-note reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetailResponse {
    /// Whether the session could be read; a missing note is still `ok`.
    pub ok: bool,
    pub note: Option<NoteItem>,
    pub error_code: Option<String>,
    pub message: String,
}

/// Response envelope for open/save/remove/restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the in-memory change was applied.
    pub ok: bool,
    /// Whether the change also reached local storage.
    pub persisted: bool,
    /// Saved note id for `note_save`.
    pub note_id: Option<String>,
    /// Stable error code (`invalid_note`, `persistence_write_failed`, ...).
    pub error_code: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<String>) -> Self {
        Self {
            ok: true,
            persisted: true,
            note_id,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            persisted: false,
            note_id: None,
            error_code: Some(code.to_string()),
            message: message.into(),
        }
    }

    /// Maps a session error; write failures keep `ok = true` because the
    /// in-memory change stays committed.
    fn from_session_error(op: &str, err: &NoteSessionError, note_id: Option<String>) -> Self {
        match err {
            NoteSessionError::InvalidForm(form_err) => {
                Self::failure("invalid_note", format!("{op} rejected: {form_err}"))
            }
            NoteSessionError::Persistence(persist_err @ PersistenceError::WriteFailed(_)) => Self {
                ok: true,
                persisted: false,
                note_id,
                error_code: Some(persist_err.code().to_string()),
                message: format!("{op} applied but not saved: {persist_err}"),
            },
            NoteSessionError::Persistence(persist_err) => {
                Self::failure(persist_err.code(), format!("{op} failed: {persist_err}"))
            }
        }
    }
}

/// Opens the note session and loads the stored snapshot.
///
/// `db_path` overrides `CLIENTNOTES_DB_PATH` and the temp-dir default.
/// A successful open replaces the current session. A failed open keeps a
/// working session in place; without one, later calls fail with
/// `session_open_failed` until an open succeeds.
///
/// # FFI contract
/// - Async from Dart; performs the startup load.
/// - Never panics.
pub fn notes_open(db_path: Option<String>) -> NoteActionResponse {
    let path = resolve_db_path(db_path);
    let mut slot = lock_session();
    match open_session(&path) {
        Ok(session) => {
            let message = match session.load_outcome() {
                LoadOutcome::Empty => "No saved notes.".to_string(),
                LoadOutcome::Restored { note_count } => format!("Loaded {note_count} note(s)."),
                LoadOutcome::RecoveredFromCorrupt => {
                    "Saved notes were unreadable; starting empty.".to_string()
                }
            };
            *slot = SessionSlot::Open { path, session };
            NoteActionResponse::success(message, None)
        }
        Err(reason) => {
            let active = match &*slot {
                SessionSlot::Open { path: active, .. } => Some(active.display().to_string()),
                SessionSlot::Unopened | SessionSlot::Failed { .. } => None,
            };
            let message = match active {
                Some(active) => format!("{reason}; still using {active}"),
                None => {
                    *slot = SessionSlot::Failed {
                        path,
                        reason: reason.clone(),
                    };
                    reason
                }
            };
            NoteActionResponse::failure(SESSION_OPEN_FAILED, message)
        }
    }
}

/// Closes the session; the next call opens the default database again.
pub fn notes_close() -> NoteActionResponse {
    let mut slot = lock_session();
    let previous = std::mem::replace(&mut *slot, SessionSlot::Unopened);
    if let SessionSlot::Open { path, .. } = &previous {
        info!(
            "event=session_close module=ffi status=ok path={}",
            path.display()
        );
    }
    NoteActionResponse::success("Notes closed.", None)
}

/// Lists notes in display order.
pub fn notes_list() -> NotesListResponse {
    match with_session(|session| session.list_items()) {
        Ok(items) => {
            let items = items.into_iter().map(to_list_row).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No Notes".to_string()
            } else {
                format!("{} note(s).", items.len())
            };
            NotesListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(message) => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message,
        },
    }
}

/// Gets one note for seeding the edit form.
pub fn note_get(id: String) -> NoteDetailResponse {
    match with_session(|session| session.get_note(id.trim()).map(to_note_item)) {
        Ok(note) => {
            let message = if note.is_some() {
                "Note found."
            } else {
                "Note not found."
            };
            NoteDetailResponse {
                ok: true,
                note,
                error_code: None,
                message: message.to_string(),
            }
        }
        Err(message) => NoteDetailResponse {
            ok: false,
            note: None,
            error_code: Some(SESSION_OPEN_FAILED.to_string()),
            message,
        },
    }
}

/// Saves the edit form.
///
/// `id = None` creates a note with a fresh id; `Some(id)` updates that note
/// in place (or appends it when it no longer exists).
pub fn note_save(
    id: Option<String>,
    client: String,
    category: String,
    title: String,
    body: String,
) -> NoteActionResponse {
    let form = NoteForm {
        client,
        category,
        title,
        body,
    };
    let existing_id = id
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    let result = with_session(|session| {
        let seed = existing_id
            .as_deref()
            .map(|value| Note::with_id(value, "", "", "", ""));
        let saved_id = existing_id.clone();
        session
            .submit_form(seed.as_ref(), form)
            .map_err(|err| (err, saved_id))
    });

    match result {
        Ok(Ok(note)) => NoteActionResponse::success("Note saved.", Some(note.id)),
        Ok(Err((err, note_id))) => {
            NoteActionResponse::from_session_error("note_save", &err, note_id)
        }
        Err(message) => NoteActionResponse::failure(SESSION_OPEN_FAILED, message),
    }
}

/// Removes a note by id; unknown ids succeed as a no-op.
pub fn note_remove(id: String) -> NoteActionResponse {
    let target = Note::with_id(id.trim(), "", "", "", "");
    match with_session(|session| session.remove_note(&target)) {
        Ok(Ok(())) => NoteActionResponse::success("Note removed.", Some(target.id)),
        Ok(Err(err)) => NoteActionResponse::from_session_error("note_remove", &err, None),
        Err(message) => NoteActionResponse::failure(SESSION_OPEN_FAILED, message),
    }
}

/// Replaces all notes with `notes`, in the given order.
pub fn notes_restore(notes: Vec<NoteItem>) -> NoteActionResponse {
    let state = NoteState::from_notes(notes.into_iter().map(from_note_item).collect());
    match with_session(|session| session.restore_state(state)) {
        Ok(Ok(())) => NoteActionResponse::success("Notes restored.", None),
        Ok(Err(err)) => NoteActionResponse::from_session_error("notes_restore", &err, None),
        Err(message) => NoteActionResponse::failure(SESSION_OPEN_FAILED, message),
    }
}

fn lock_session() -> MutexGuard<'static, SessionSlot> {
    // A panic while holding the lock cannot leave the session half-mutated:
    // transitions replace state wholesale.
    SESSION.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn with_session<T>(f: impl FnOnce(&mut NoteSession<SqliteKvStore>) -> T) -> Result<T, String> {
    let mut slot = lock_session();
    let pending = match &*slot {
        SessionSlot::Open { .. } => None,
        SessionSlot::Unopened => Some(resolve_db_path(None)),
        SessionSlot::Failed { path, .. } => Some(path.clone()),
    };
    if let Some(path) = pending {
        *slot = match open_session(&path) {
            Ok(session) => SessionSlot::Open { path, session },
            Err(reason) => SessionSlot::Failed { path, reason },
        };
    }
    match &mut *slot {
        SessionSlot::Open { session, .. } => Ok(f(session)),
        SessionSlot::Failed { path, reason } => Err(format!(
            "notes at {} are unavailable: {reason}",
            path.display()
        )),
        SessionSlot::Unopened => Err("note session unavailable".to_string()),
    }
}

fn open_session(path: &Path) -> Result<NoteSession<SqliteKvStore>, String> {
    let kv = SqliteKvStore::open(path).map_err(|err| {
        error!(
            "event=session_open module=ffi status=error error_code=kv_open_failed path={} error={}",
            path.display(),
            err
        );
        format!("notes DB open failed: {err}")
    })?;
    let session = NoteSession::open(kv, SessionConfig::default())
        .map_err(|err| format!("notes load failed: {err}"))?;
    info!(
        "event=session_open module=ffi status=ok path={} note_count={}",
        path.display(),
        session.notes().len()
    );
    Ok(session)
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    let from_env = std::env::var(NOTES_DB_PATH_ENV).ok();
    [explicit, from_env]
        .into_iter()
        .flatten()
        .map(|raw| raw.trim().to_string())
        .find(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(NOTES_DB_FILE_NAME))
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id.clone(),
        client: note.client.clone(),
        category: note.category.clone(),
        title: note.title.clone(),
        body: note.body.clone(),
    }
}

fn from_note_item(item: NoteItem) -> Note {
    Note::with_id(item.id, item.client, item.category, item.title, item.body)
}

fn to_list_row(item: NoteListItem) -> NoteListRow {
    NoteListRow {
        id: item.id,
        title: item.title,
        client: item.client,
        category: item.category,
        preview: item.preview,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_get, note_remove, note_save, notes_close, notes_list,
        notes_open, notes_restore, ping, NoteItem,
    };
    use std::sync::Mutex;

    // The FFI session is process-wide; tests must not interleave.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    fn fresh_session(dir: &tempfile::TempDir) {
        let path = dir.path().join("ffi.sqlite3");
        let opened = notes_open(Some(path.to_string_lossy().into_owned()));
        assert!(opened.ok, "{}", opened.message);
    }

    fn save(id: Option<&str>, title: &str) -> super::NoteActionResponse {
        note_save(
            id.map(str::to_string),
            "Acme".to_string(),
            "Bug".to_string(),
            title.to_string(),
            "body".to_string(),
        )
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn save_edit_list_remove_flow() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);

        let created = save(None, "first");
        assert!(created.ok && created.persisted, "{}", created.message);
        let id = created.note_id.expect("save should return note_id");

        let second = save(None, "second");
        assert!(second.ok, "{}", second.message);

        let edited = save(Some(&id), "first edited");
        assert_eq!(edited.note_id.as_deref(), Some(id.as_str()));

        let listed = notes_list();
        assert!(listed.ok);
        assert_eq!(listed.items.len(), 2);
        assert_eq!(listed.items[0].id, id);
        assert_eq!(listed.items[0].title, "first edited");

        let removed = note_remove(id.clone());
        assert!(removed.ok, "{}", removed.message);
        let detail = note_get(id);
        assert!(detail.ok);
        assert!(detail.note.is_none());
        assert_eq!(notes_list().items.len(), 1);
    }

    #[test]
    fn reopen_loads_saved_notes() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);
        let created = save(None, "persisted");
        let id = created.note_id.unwrap();

        let path = dir.path().join("ffi.sqlite3");
        let reopened = notes_open(Some(path.to_string_lossy().into_owned()));
        assert!(reopened.ok);
        assert!(reopened.message.contains("Loaded 1"));
        assert_eq!(
            note_get(id).note.map(|note| note.title).as_deref(),
            Some("persisted")
        );
    }

    #[test]
    fn invalid_form_is_rejected_with_code() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);

        let response = save(None, "");
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("invalid_note"));
        assert!(response.message.contains("title"));
        assert!(notes_list().items.is_empty());
    }

    #[test]
    fn restore_replaces_all_notes() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);
        save(None, "to be replaced");

        let restored = notes_restore(vec![NoteItem {
            id: "9".to_string(),
            client: "Initech".to_string(),
            category: "Ops".to_string(),
            title: "T9".to_string(),
            body: "B9".to_string(),
        }]);
        assert!(restored.ok, "{}", restored.message);

        let listed = notes_list();
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].id, "9");
    }

    #[test]
    fn removing_unknown_id_is_ok() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);

        let response = note_remove("does-not-exist".to_string());
        assert!(response.ok);
        assert!(response.persisted);
    }

    #[test]
    fn failed_open_pins_the_chosen_path() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let missing_dir = dir.path().join("no_such_dir");
        let path = missing_dir.join("x.sqlite3");
        notes_close();

        let opened = notes_open(Some(path.to_string_lossy().into_owned()));
        assert!(!opened.ok);
        assert_eq!(opened.error_code.as_deref(), Some("session_open_failed"));

        let saved = save(None, "nowhere to go");
        assert!(!saved.ok && !saved.persisted, "{}", saved.message);
        assert_eq!(saved.error_code.as_deref(), Some("session_open_failed"));
        assert!(saved.message.contains("no_such_dir"));
        assert!(!notes_list().ok);
        let detail = note_get("any".to_string());
        assert!(!detail.ok);
        assert_eq!(detail.error_code.as_deref(), Some("session_open_failed"));
        assert!(!path.exists());

        // Once the directory appears, the same file is opened, not another.
        std::fs::create_dir(&missing_dir).unwrap();
        let saved = save(None, "landed");
        assert!(saved.ok && saved.persisted, "{}", saved.message);
        assert!(path.exists());
        let listed = notes_list();
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].title, "landed");
    }

    #[test]
    fn failed_reopen_keeps_current_session() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);
        assert!(save(None, "before").ok);

        let bad = dir.path().join("missing").join("other.sqlite3");
        let reopened = notes_open(Some(bad.to_string_lossy().into_owned()));
        assert!(!reopened.ok);
        assert!(reopened.message.contains("still using"));

        let after = save(None, "after");
        assert!(after.ok && after.persisted, "{}", after.message);

        let good = dir.path().join("ffi.sqlite3");
        let loaded = notes_open(Some(good.to_string_lossy().into_owned()));
        assert!(loaded.message.contains("Loaded 2"), "{}", loaded.message);
        assert!(!bad.exists());
    }

    #[test]
    fn note_get_reports_missing_note_as_ok() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        fresh_session(&dir);

        let missing = note_get("nope".to_string());
        assert!(missing.ok);
        assert!(missing.note.is_none());
        assert!(missing.error_code.is_none());

        let id = save(None, "present").note_id.unwrap();
        let found = note_get(id);
        assert!(found.ok);
        assert_eq!(found.note.map(|note| note.client).as_deref(), Some("Acme"));
    }
}
