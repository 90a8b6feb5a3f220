//! Snapshot persistence between the note store and a key-value store.
//!
//! # Responsibility
//! - Seed the note store from the stored snapshot once at startup.
//! - Rewrite the full snapshot after every committed transition.
//!
//! # Invariants
//! - Exactly one key is owned; nothing else reads or writes it.
//! - A failed write never rolls back in-memory state.
//! - A corrupt snapshot never panics; the configured policy decides.

use crate::kv::{KeyValueStore, KvError};
use crate::model::state::NoteState;
use crate::store::note_store::NoteStore;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Well-known key holding the serialized note collection.
pub const STORAGE_NOTE_STATE_KEY: &str = "STORAGE_NOTE_STATE";

/// What to do when the stored snapshot cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptStatePolicy {
    /// Log a warning and start from the empty collection.
    #[default]
    FallBackToEmpty,
    /// Return `PersistenceError::CorruptPersistedState` to the caller.
    Surface,
}

/// Result of the startup load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No snapshot stored yet; state stays empty.
    Empty,
    /// Snapshot decoded and restored into the store.
    Restored { note_count: usize },
    /// Snapshot was corrupt and `FallBackToEmpty` applied.
    RecoveredFromCorrupt,
}

/// Persistence failure surfaced to the session owner.
#[derive(Debug)]
pub enum PersistenceError {
    /// Stored value is not a valid snapshot.
    CorruptPersistedState(serde_json::Error),
    /// Snapshot could not be read from storage.
    ReadFailed(KvError),
    /// Snapshot could not be written; in-memory state is kept.
    WriteFailed(KvError),
    /// In-memory state could not be encoded.
    Encode(serde_json::Error),
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptPersistedState(err) => write!(f, "corrupt persisted note state: {err}"),
            Self::ReadFailed(err) => write!(f, "failed to read persisted note state: {err}"),
            Self::WriteFailed(err) => write!(f, "failed to persist note state: {err}"),
            Self::Encode(err) => write!(f, "failed to encode note state: {err}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CorruptPersistedState(err) | Self::Encode(err) => Some(err),
            Self::ReadFailed(err) | Self::WriteFailed(err) => Some(err),
        }
    }
}

impl PersistenceError {
    /// Stable short code for logs and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::CorruptPersistedState(_) => "corrupt_persisted_state",
            Self::ReadFailed(_) => "persistence_read_failed",
            Self::WriteFailed(_) => "persistence_write_failed",
            Self::Encode(_) => "persistence_encode_failed",
        }
    }
}

/// Owner of the snapshot key inside a key-value store.
pub struct PersistenceBridge<K: KeyValueStore> {
    kv: K,
    key: String,
    policy: CorruptStatePolicy,
}

impl<K: KeyValueStore> PersistenceBridge<K> {
    /// Creates a bridge over `kv` writing to `key`.
    pub fn new(kv: K, key: impl Into<String>, policy: CorruptStatePolicy) -> Self {
        Self {
            kv,
            key: key.into(),
            policy,
        }
    }

    /// Bridge using `STORAGE_NOTE_STATE_KEY` and the default policy.
    pub fn with_defaults(kv: K) -> Self {
        Self::new(kv, STORAGE_NOTE_STATE_KEY, CorruptStatePolicy::default())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn policy(&self) -> CorruptStatePolicy {
        self.policy
    }

    /// Read access to the backing store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Releases the backing store.
    pub fn into_kv(self) -> K {
        self.kv
    }

    /// Reads the snapshot and restores it into `store`.
    ///
    /// An absent or empty value leaves `store` untouched.
    ///
    /// # Errors
    /// - `ReadFailed` when storage cannot be read.
    /// - `CorruptPersistedState` under `CorruptStatePolicy::Surface`.
    pub fn load_on_startup(&self, store: &mut NoteStore) -> Result<LoadOutcome, PersistenceError> {
        let started_at = Instant::now();
        let raw = match self.kv.get(&self.key) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=snapshot_load module=persistence status=error error_code=persistence_read_failed error={}",
                    err
                );
                return Err(PersistenceError::ReadFailed(err));
            }
        };

        let Some(raw) = raw.filter(|value| !value.is_empty()) else {
            info!(
                "event=snapshot_load module=persistence status=ok outcome=empty duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(LoadOutcome::Empty);
        };

        match decode_snapshot(&raw) {
            Ok(state) => {
                let note_count = state.len();
                store.restore(state);
                info!(
                    "event=snapshot_load module=persistence status=ok outcome=restored note_count={} bytes={} duration_ms={}",
                    note_count,
                    raw.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(LoadOutcome::Restored { note_count })
            }
            Err(err) => match self.policy {
                CorruptStatePolicy::FallBackToEmpty => {
                    warn!(
                        "event=snapshot_load module=persistence status=error outcome=fallback_empty error_code=corrupt_persisted_state bytes={} error={}",
                        raw.len(),
                        err
                    );
                    Ok(LoadOutcome::RecoveredFromCorrupt)
                }
                CorruptStatePolicy::Surface => {
                    error!(
                        "event=snapshot_load module=persistence status=error outcome=surfaced error_code=corrupt_persisted_state bytes={} error={}",
                        raw.len(),
                        err
                    );
                    Err(PersistenceError::CorruptPersistedState(err))
                }
            },
        }
    }

    /// Serializes `state` and overwrites the snapshot key.
    ///
    /// # Errors
    /// - `WriteFailed` when storage rejects the write.
    pub fn persist_on_change(&mut self, state: &NoteState) -> Result<(), PersistenceError> {
        let started_at = Instant::now();
        let raw = encode_snapshot(state).map_err(PersistenceError::Encode)?;

        if let Err(err) = self.kv.set(&self.key, &raw) {
            error!(
                "event=snapshot_write module=persistence status=error error_code=persistence_write_failed note_count={} error={}",
                state.len(),
                err
            );
            return Err(PersistenceError::WriteFailed(err));
        }

        info!(
            "event=snapshot_write module=persistence status=ok note_count={} bytes={} duration_ms={}",
            state.len(),
            raw.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

/// Encodes the collection as the `{"notes":[...]}` snapshot document.
pub fn encode_snapshot(state: &NoteState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Decodes a snapshot document.
pub fn decode_snapshot(raw: &str) -> Result<NoteState, serde_json::Error> {
    serde_json::from_str(raw)
}
