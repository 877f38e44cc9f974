//! [`IssueStore`]: the in-memory, newest-first issue collection.
//!
//! The store owns id assignment. Ids come from a monotonic counter that only
//! ever moves forward, so an id is never handed out twice even if the
//! collection were to shrink.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  issue::{Issue, IssueId, NewIssue, Status, StudentId},
  workflow,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "StoreSnapshot")]
pub struct IssueStore {
  /// Newest first.
  issues:   Vec<Issue>,
  /// Sequence number of the most recently assigned id.
  last_seq: u32,
}

#[derive(Deserialize)]
struct StoreSnapshot {
  issues:   Vec<Issue>,
  #[serde(default)]
  last_seq: u32,
}

impl From<StoreSnapshot> for IssueStore {
  fn from(snapshot: StoreSnapshot) -> Self { Self::restore(snapshot.issues, snapshot.last_seq) }
}

impl IssueStore {
  pub fn new() -> Self { Self::default() }

  /// Rebuild a store from previously saved issues (newest first). The
  /// counter resumes after the larger of `last_seq` and the highest id
  /// present.
  pub fn restore(issues: Vec<Issue>, last_seq: u32) -> Self {
    let highest = issues.iter().map(|i| i.id.seq()).max().unwrap_or(0);
    Self { issues, last_seq: last_seq.max(highest) }
  }

  pub fn len(&self) -> usize { self.issues.len() }

  pub fn is_empty(&self) -> bool { self.issues.is_empty() }

  pub fn last_seq(&self) -> u32 { self.last_seq }

  /// All issues, newest first.
  pub fn iter(&self) -> impl Iterator<Item = &Issue> { self.issues.iter() }

  pub fn get(&self, id: IssueId) -> Option<&Issue> { self.issues.iter().find(|i| i.id == id) }

  /// File a new issue at the head of the collection.
  ///
  /// `owner` and `building` are frozen on the record; `at` becomes both
  /// `created_at` and `updated_at`. The status starts at
  /// [`Status::Submitted`].
  pub fn append(
    &mut self,
    owner: StudentId,
    building: impl Into<String>,
    input: NewIssue,
    at: DateTime<Utc>,
  ) -> Result<&Issue> {
    let input = input.normalized()?;
    let seq = self
      .last_seq
      .checked_add(1)
      .ok_or_else(|| Error::validation("issue id space exhausted"))?;

    let issue = Issue {
      id:          IssueId::from_seq(seq),
      student_id:  owner,
      building:    building.into(),
      category:    input.category,
      description: input.description,
      severity:    input.severity,
      status:      Status::Submitted,
      photo_url:   input.photo_url,
      created_at:  at,
      updated_at:  at,
    };

    self.last_seq = seq;
    self.issues.insert(0, issue);
    Ok(&self.issues[0])
  }

  /// Move issue `id` to `to`, which must be the next status in the workflow.
  ///
  /// `updated_at` becomes `at`, or one microsecond past its previous value if
  /// `at` is not later, so it strictly increases on every change.
  pub fn set_status(&mut self, id: IssueId, to: Status, at: DateTime<Utc>) -> Result<&Issue> {
    let issue = self.get_mut(id)?;
    workflow::check_transition(id, issue.status, to)?;
    Self::apply(issue, to, at);
    Ok(issue)
  }

  /// Move issue `id` one step forward in the workflow.
  pub fn advance(&mut self, id: IssueId, at: DateTime<Utc>) -> Result<&Issue> {
    let issue = self.get_mut(id)?;
    let to = workflow::next_for(id, issue.status)?;
    Self::apply(issue, to, at);
    Ok(issue)
  }

  fn get_mut(&mut self, id: IssueId) -> Result<&mut Issue> {
    self.issues.iter_mut().find(|i| i.id == id).ok_or(Error::NotFound(id))
  }

  fn apply(issue: &mut Issue, to: Status, at: DateTime<Utc>) {
    issue.status = to;
    issue.updated_at = at.max(issue.updated_at + TimeDelta::microseconds(1));
  }
}
