//! [`SqliteKv`]: the SQLite implementation of [`KeyValue`].

use std::{path::Path, time::Duration};

use chrono::Utc;
use dormfix_core::mirror::KeyValue;
use rusqlite::{Connection, OptionalExtension as _};

use crate::{
  Error, Result,
  schema::{SCHEMA, SCHEMA_VERSION},
};

/// How long a connection waits for another process's write transaction
/// before giving up with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A key-value mirror backed by a single SQLite file.
#[derive(Debug)]
pub struct SqliteKv {
  conn: Connection,
}

impl SqliteKv {
  /// Open (or create) a mirror at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    Self::init(conn)
  }

  /// Open an in-memory mirror.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Self::init(conn)
  }

  fn init(conn: Connection) -> Result<Self> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let found: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }
    conn.execute_batch(SCHEMA)?;
    Ok(Self { conn })
  }

  /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
  ///
  /// The write lock is taken up front, so a read-modify-write cycle done in
  /// `f` (restore, change, persist) cannot interleave with another
  /// connection's; the other side waits up to [`BUSY_TIMEOUT`]. Everything
  /// `f` writes commits together, or is rolled back if `f` fails.
  pub fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
  where
    F: FnOnce(&Self) -> std::result::Result<T, E>,
    E: From<Error>,
  {
    self.conn.execute_batch("BEGIN IMMEDIATE").map_err(Error::from)?;
    match f(self) {
      Ok(value) => {
        if let Err(e) = self.conn.execute_batch("COMMIT") {
          let _ = self.conn.execute_batch("ROLLBACK");
          return Err(Error::from(e).into());
        }
        Ok(value)
      }
      Err(e) => {
        if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
          tracing::warn!(error = %rollback, "rollback failed");
        }
        Err(e)
      }
    }
  }

  /// All stored keys, sorted.
  pub fn keys(&self) -> Result<Vec<String>> {
    let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
    let keys = stmt
      .query_map([], |r| r.get::<_, String>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(keys)
  }
}

impl KeyValue for SqliteKv {
  type Error = Error;

  fn get(&self, key: &str) -> Result<Option<String>> {
    let value = self
      .conn
      .query_row("SELECT value FROM kv WHERE key = ?1", rusqlite::params![key], |r| r.get(0))
      .optional()?;
    Ok(value)
  }

  fn set(&self, key: &str, value: &str) -> Result<()> {
    let at = Utc::now().to_rfc3339();
    self.conn.execute(
      "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
       ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
      rusqlite::params![key, value, at],
    )?;
    tracing::debug!(key, bytes = value.len(), "mirrored value written");
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let removed = self.conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
    tracing::debug!(key, removed, "mirrored value removed");
    Ok(())
  }
}
