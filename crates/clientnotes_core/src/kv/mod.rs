//! Local key-value storage abstraction.
//!
//! # Responsibility
//! - Define the string key/value contract the persistence bridge writes to.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - `set` overwrites any previous value for the key in full.
//! - `get` of a missing key is `Ok(None)`, never an error.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::{SqliteKvStore, KV_SCHEMA_VERSION};

pub type KvResult<T> = Result<T, KvError>;

/// Backend failure of a key-value store.
#[derive(Debug)]
pub enum KvError {
    /// SQLite-level failure (open, pragma, statement).
    Sqlite(rusqlite::Error),
    /// The database file was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
    /// Storage is unreachable for a backend-specific reason (full, locked,
    /// detached).
    Unavailable(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "kv_store schema version {found} is newer than supported {supported}"
            ),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key/value storage used for persistence snapshots.
///
/// The bridge owns exactly one key and only ever replaces it, so the
/// contract has no delete.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> KvResult<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for &mut K {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }
}
