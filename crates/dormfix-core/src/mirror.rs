//! The persistence mirror: an opaque string key-value surface that session,
//! credential and issue state can be saved to and restored from.
//!
//! The trait is implemented by storage backends (e.g. `dormfix-store-sqlite`).
//! Values are JSON documents; the mirror itself never interprets them.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, session::Session};

pub const SESSION_KEY: &str = "session";
pub const STUDENTS_KEY: &str = "students";
pub const ISSUES_KEY: &str = "issues";

/// A durable (or not) string key-value store.
pub trait KeyValue {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

  fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

  /// Removing an absent key is not an error.
  fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

fn mirror_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Mirror(Box::new(e))
}

/// Read and decode the JSON value under `key`, if present.
pub fn load<T, K>(kv: &K, key: &str) -> Result<Option<T>>
where
  T: DeserializeOwned,
  K: KeyValue + ?Sized,
{
  match kv.get(key).map_err(mirror_err)? {
    Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
    None => Ok(None),
  }
}

/// Encode `value` as JSON and store it under `key`.
pub fn save<T, K>(kv: &K, key: &str, value: &T) -> Result<()>
where
  T: Serialize + ?Sized,
  K: KeyValue + ?Sized,
{
  let raw = serde_json::to_string(value)?;
  kv.set(key, &raw).map_err(mirror_err)
}

/// Restore the mirrored session. A value that no longer decodes is logged
/// and treated as logged out.
pub fn load_session<K: KeyValue + ?Sized>(kv: &K) -> Result<Session> {
  match load::<Session, K>(kv, SESSION_KEY) {
    Ok(session) => Ok(session.unwrap_or_default()),
    Err(Error::Serialization(e)) => {
      tracing::warn!(error = %e, "discarding unreadable mirrored session");
      Ok(Session::None)
    }
    Err(e) => Err(e),
  }
}

/// Mirror `session`; logging out clears the key.
pub fn save_session<K: KeyValue + ?Sized>(kv: &K, session: &Session) -> Result<()> {
  match session {
    Session::None => kv.remove(SESSION_KEY).map_err(mirror_err),
    _ => save(kv, SESSION_KEY, session),
  }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local [`KeyValue`]; useful for tests and ephemeral clients.
#[derive(Debug, Default)]
pub struct MemoryKv {
  entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
  pub fn new() -> Self { Self::default() }
}

impl KeyValue for MemoryKv {
  type Error = Infallible;

  fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key).cloned())
  }

  fn set(&self, key: &str, value: &str) -> Result<(), Infallible> {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), Infallible> {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.remove(key);
    Ok(())
  }
}
