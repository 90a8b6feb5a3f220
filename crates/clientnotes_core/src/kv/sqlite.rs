//! SQLite-backed key-value store.
//!
//! # Responsibility
//! - Open file or in-memory databases and bring the `kv_store` table up to
//!   the version this build understands.
//! - Serve snapshot reads and writes with single statements.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; a database stamped by a
//!   newer build is refused and left untouched.
//! - File databases run in WAL mode so a crash mid-write keeps the previous
//!   snapshot readable.
//! - `set` is a single UPSERT statement, so a failed write leaves the
//!   previous value intact.

use crate::kv::{KeyValueStore, KvError, KvResult};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::cmp::Ordering;
use std::path::Path;
use std::time::{Duration, Instant};

/// `kv_store` layout version written to `PRAGMA user_version`.
pub const KV_SCHEMA_VERSION: u32 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_KV_STORE: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
) WITHOUT ROWID;
";

/// Key-value store over one SQLite connection.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Opens (or creates) a database file.
    ///
    /// Parent directories are not created; callers resolve a writable path.
    ///
    /// # Side effects
    /// - Emits `kv_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        let path = path.as_ref();
        open_logged("file", || {
            let conn = Connection::open(path)?;
            let mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            if !mode.eq_ignore_ascii_case("wal") {
                warn!("event=kv_open module=kv status=degraded journal_mode={mode}");
            }
            Ok(conn)
        })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> KvResult<Self> {
        open_logged("memory", || Ok(Connection::open_in_memory()?))
    }

    /// Takes over an existing connection, creating `kv_store` if needed.
    ///
    /// # Errors
    /// - `SchemaTooNew` when the connection carries a newer schema version.
    /// - `Unavailable` when the version claims `kv_store` but the table is
    ///   missing.
    pub fn from_connection(mut conn: Connection) -> KvResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        ensure_schema(&mut conn)?;
        Ok(Self { conn })
    }
}

fn open_logged(
    backing: &'static str,
    connect: impl FnOnce() -> KvResult<Connection>,
) -> KvResult<SqliteKvStore> {
    let started_at = Instant::now();
    match connect().and_then(SqliteKvStore::from_connection) {
        Ok(store) => {
            info!(
                "event=kv_open module=kv status=ok backing={} schema_version={} duration_ms={}",
                backing,
                KV_SCHEMA_VERSION,
                started_at.elapsed().as_millis()
            );
            Ok(store)
        }
        Err(err) => {
            error!(
                "event=kv_open module=kv status=error backing={} duration_ms={} error_code=kv_open_failed error={}",
                backing,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn ensure_schema(conn: &mut Connection) -> KvResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    match found.cmp(&KV_SCHEMA_VERSION) {
        Ordering::Greater => {
            return Err(KvError::SchemaTooNew {
                found,
                supported: KV_SCHEMA_VERSION,
            })
        }
        Ordering::Less => {
            let tx = conn.transaction()?;
            tx.execute_batch(CREATE_KV_STORE)?;
            tx.pragma_update(None, "user_version", KV_SCHEMA_VERSION)?;
            tx.commit()?;
        }
        Ordering::Equal => {}
    }

    let has_table: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'kv_store');",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Err(KvError::Unavailable(
            "schema version is current but table `kv_store` is missing".to_string(),
        ));
    }
    Ok(())
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SqliteKvStore, KV_SCHEMA_VERSION};
    use crate::kv::{KeyValueStore, KvError};
    use rusqlite::Connection;

    #[test]
    fn set_replaces_value_under_same_key() {
        let mut kv = SqliteKvStore::open_in_memory().unwrap();
        assert_eq!(kv.get("STORAGE_NOTE_STATE").unwrap(), None);

        kv.set("STORAGE_NOTE_STATE", "{\"notes\":[]}").unwrap();
        kv.set("STORAGE_NOTE_STATE", "{\"notes\":[1]}").unwrap();
        assert_eq!(
            kv.get("STORAGE_NOTE_STATE").unwrap().as_deref(),
            Some("{\"notes\":[1]}")
        );
        assert_eq!(kv.get("OTHER").unwrap(), None);
    }

    #[test]
    fn from_connection_stamps_schema_on_blank_database() {
        let kv = SqliteKvStore::from_connection(Connection::open_in_memory().unwrap()).unwrap();
        let version: u32 = kv
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, KV_SCHEMA_VERSION);
    }

    #[test]
    fn from_connection_rejects_current_version_without_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", KV_SCHEMA_VERSION)
            .unwrap();

        let err = SqliteKvStore::from_connection(conn)
            .err()
            .expect("missing kv_store table must be rejected");
        assert!(matches!(err, KvError::Unavailable(_)));
    }
}
