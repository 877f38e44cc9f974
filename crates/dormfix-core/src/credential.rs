//! Student and admin credentials.
//!
//! Passwords are never kept in the clear: entries hold argon2 PHC strings
//! (`$argon2id$v=19$…`) and logins are checked with
//! [`argon2::PasswordVerifier`]. Every mismatch is reported as the same
//! [`Error::AuthFailure`], whichever half of the pair was wrong.

use std::collections::BTreeMap;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  dorm::{assign_dorm, is_known_building},
  issue::StudentId,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Hash `password` into an argon2 PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc)
    .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

// ─── Students ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
  pub password_hash:   String,
  /// Building chosen at signup; overrides [`assign_dorm`] when present.
  pub registered_dorm: Option<String>,
}

impl CredentialEntry {
  /// Check `password` against this entry and resolve the student's
  /// building: the registered dorm if there is one, otherwise the computed
  /// default. Needs no access to the store the entry came from.
  pub fn verify(&self, id: &StudentId, password: &str) -> Result<String> {
    if !verify_password(password, &self.password_hash) {
      return Err(Error::AuthFailure);
    }
    Ok(
      self
        .registered_dorm
        .clone()
        .unwrap_or_else(|| assign_dorm(id).to_owned()),
    )
  }
}

/// Signup form input, validated by [`CredentialStore::register`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
  pub student_id:       String,
  pub dorm:             Option<String>,
  pub password:         String,
  pub confirm_password: String,
}

impl SignupRequest {
  /// Form checks in form order; the first failure is returned.
  fn validate(&self) -> Result<(StudentId, String)> {
    let id = StudentId::parse(&self.student_id)?;

    let dorm = self
      .dorm
      .as_deref()
      .map(str::trim)
      .filter(|d| !d.is_empty())
      .ok_or_else(|| Error::validation("Please select your dormitory."))?;
    if !is_known_building(dorm) {
      return Err(Error::validation(format!("Unknown dormitory: {dorm}.")));
    }

    validate_new_password(&self.password, &self.confirm_password)?;
    Ok((id, dorm.to_owned()))
  }

  /// Validate the form and hash the password, ready for
  /// [`CredentialStore::add`]. Touches no store.
  pub fn prepare(&self) -> Result<NewAccount> {
    let (id, dorm) = self.validate()?;
    Ok(NewAccount {
      id,
      entry: CredentialEntry {
        password_hash:   hash_password(&self.password)?,
        registered_dorm: Some(dorm),
      },
    })
  }
}

/// A validated signup with its password already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub id:    StudentId,
  pub entry: CredentialEntry,
}

/// Registered students, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialStore {
  entries: BTreeMap<StudentId, CredentialEntry>,
}

impl CredentialStore {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn contains(&self, id: &StudentId) -> bool { self.entries.contains_key(id) }

  pub fn get(&self, id: &StudentId) -> Option<&CredentialEntry> { self.entries.get(id) }

  /// Validate a signup form and store the new account.
  ///
  /// Checks run in form order and the first failure is returned. An id that
  /// is already registered is rejected rather than overwritten.
  pub fn register(&mut self, request: &SignupRequest) -> Result<StudentId> {
    let (id, dorm) = request.validate()?;
    self.reject_duplicate(&id)?;
    let entry = CredentialEntry {
      password_hash:   hash_password(&request.password)?,
      registered_dorm: Some(dorm),
    };
    self.entries.insert(id.clone(), entry);
    Ok(id)
  }

  /// Store an account built by [`SignupRequest::prepare`]. The duplicate
  /// check runs here, against the store as it is now.
  pub fn add(&mut self, account: NewAccount) -> Result<StudentId> {
    self.reject_duplicate(&account.id)?;
    self.entries.insert(account.id.clone(), account.entry);
    Ok(account.id)
  }

  fn reject_duplicate(&self, id: &StudentId) -> Result<()> {
    if self.contains(id) {
      return Err(Error::validation("Student ID is already registered."));
    }
    Ok(())
  }

  /// Add an account with an already-hashed password. Used for seeding.
  pub fn insert(&mut self, id: StudentId, entry: CredentialEntry) { self.entries.insert(id, entry); }

  /// Check a login and resolve the student's building.
  pub fn verify(&self, id: &StudentId, password: &str) -> Result<String> {
    self.entries.get(id).ok_or(Error::AuthFailure)?.verify(id, password)
  }
}

fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
  if password.trim().is_empty() {
    return Err(Error::validation("Password is required."));
  }
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::validation("Password must be at least 6 characters."));
  }
  if password != confirm {
    return Err(Error::validation("Passwords do not match."));
  }
  Ok(())
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// The single administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2.
  pub password_hash: String,
}

impl AdminCredentials {
  /// Build credentials from a plaintext password, hashing it.
  pub fn from_plaintext(username: impl Into<String>, password: &str) -> Result<Self> {
    Ok(Self { username: username.into(), password_hash: hash_password(password)? })
  }

  pub fn verify(&self, username: &str, password: &str) -> bool {
    username == self.username && verify_password(password, &self.password_hash)
  }
}
