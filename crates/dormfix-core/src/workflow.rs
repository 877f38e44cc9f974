//! Issue status workflow.
//!
//! `submitted → inprogress → resolved`, one step at a time, forward only.
//! `resolved` is terminal. Nothing moves on its own; every step is an explicit
//! admin action.

use crate::{
  Error, Result,
  issue::{IssueId, Status},
};

impl Status {
  /// The single status an issue may move to from here, if any.
  pub fn next(self) -> Option<Status> {
    match self {
      Self::Submitted => Some(Self::InProgress),
      Self::InProgress => Some(Self::Resolved),
      Self::Resolved => None,
    }
  }

  pub fn is_terminal(self) -> bool { self.next().is_none() }

  pub fn can_transition_to(self, to: Status) -> bool { self.next() == Some(to) }

  /// Label for the admin action that performs [`Status::next`].
  pub fn advance_label(self) -> Option<&'static str> {
    match self {
      Self::Submitted => Some("Mark In Progress"),
      Self::InProgress => Some("Mark Resolved"),
      Self::Resolved => None,
    }
  }
}

/// Validate a requested move of issue `id` from `from` to `to`.
pub fn check_transition(id: IssueId, from: Status, to: Status) -> Result<()> {
  if from.can_transition_to(to) {
    Ok(())
  } else {
    Err(Error::InvalidTransition { id, from, to: Some(to) })
  }
}

/// The status issue `id` moves to when advanced from `from`.
pub fn next_for(id: IssueId, from: Status) -> Result<Status> {
  from.next().ok_or(Error::InvalidTransition { id, from, to: None })
}
