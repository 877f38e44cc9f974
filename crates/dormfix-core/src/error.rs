//! Error types for `dormfix-core`.

use thiserror::Error;

use crate::{
  issue::{IssueId, Status},
  session::Role,
};

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed input to a creation, signup or login operation. The message
  /// is meant to be shown to the user as-is.
  #[error("{0}")]
  Validation(String),

  /// Credential mismatch. Deliberately silent about which half was wrong.
  #[error("invalid credentials")]
  AuthFailure,

  #[error("issue not found: {0}")]
  NotFound(IssueId),

  #[error("issue {id} cannot move from {from} to {}", target(.to))]
  InvalidTransition {
    id:   IssueId,
    from: Status,
    /// `None` when the caller asked for "the next status" of a terminal one.
    to:   Option<Status>,
  },

  #[error("this operation requires an active {0} session")]
  RoleRequired(Role),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error("mirror error: {0}")]
  Mirror(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

fn target(to: &Option<Status>) -> String {
  match to {
    Some(status) => status.to_string(),
    None => "any further status".to_string(),
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
