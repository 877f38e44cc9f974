//! Read-only projections over an [`IssueStore`].
//!
//! Nothing here is cached: every view and every count is recomputed from the
//! store on each call.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  issue::{Issue, Severity, Status, StudentId},
  store::IssueStore,
};

// ─── Student views ───────────────────────────────────────────────────────────

/// Every issue filed in `building`, in store order (newest first).
pub fn list_for_student(store: &IssueStore, building: &str) -> Vec<Issue> {
  store.iter().filter(|i| i.building == building).cloned().collect()
}

/// A student's own reports, split by whether they are resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerView {
  pub active:   Vec<Issue>,
  pub resolved: Vec<Issue>,
}

pub fn list_for_owner(store: &IssueStore, owner: &StudentId) -> OwnerView {
  let (resolved, active) = store
    .iter()
    .filter(|i| &i.student_id == owner)
    .cloned()
    .partition(Issue::is_resolved);
  OwnerView { active, resolved }
}

/// Per-status counts for one building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSummary {
  pub submitted:   usize,
  pub in_progress: usize,
  pub resolved:    usize,
  pub total:       usize,
}

pub fn building_summary(store: &IssueStore, building: &str) -> BuildingSummary {
  store.iter().filter(|i| i.building == building).fold(
    BuildingSummary::default(),
    |mut acc, issue| {
      match issue.status {
        Status::Submitted => acc.submitted += 1,
        Status::InProgress => acc.in_progress += 1,
        Status::Resolved => acc.resolved += 1,
      }
      acc.total += 1;
      acc
    },
  )
}

// ─── Admin view ──────────────────────────────────────────────────────────────

/// Ordering applied to the admin's active queue.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortMode {
  /// High before medium before low; newest first within a severity.
  #[default]
  Severity,
  /// Newest first.
  Date,
}

impl SortMode {
  pub fn compare(self, a: &Issue, b: &Issue) -> Ordering {
    match self {
      Self::Severity => a
        .severity
        .rank()
        .cmp(&b.severity.rank())
        .then_with(|| b.created_at.cmp(&a.created_at)),
      Self::Date => b.created_at.cmp(&a.created_at),
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Severity => "High → Low",
      Self::Date => "Latest → Oldest",
    }
  }
}

/// Parameters for [`list_for_admin`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminQuery {
  /// Restrict the active queue to one building.
  pub building: Option<String>,
  #[serde(default)]
  pub sort:     SortMode,
}

/// Headline numbers shown above the admin queue. Computed over every
/// unresolved issue, before the building filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
  pub high_count:     usize,
  pub active_count:   usize,
  pub resolved_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminView {
  /// Unresolved issues, filtered and sorted per the query.
  pub active:   Vec<Issue>,
  /// Resolved issues in store order; never filtered or re-sorted.
  pub resolved: Vec<Issue>,
  pub stats:    AdminStats,
}

pub fn list_for_admin(store: &IssueStore, query: &AdminQuery) -> AdminView {
  let (resolved, active): (Vec<&Issue>, Vec<&Issue>) = store.iter().partition(|i| i.is_resolved());

  let stats = AdminStats {
    high_count:     active.iter().filter(|i| i.severity == Severity::High).count(),
    active_count:   active.len(),
    resolved_count: resolved.len(),
  };

  let mut active: Vec<Issue> = active
    .into_iter()
    .filter(|i| query.building.as_deref().is_none_or(|b| i.building == b))
    .cloned()
    .collect();
  // `sort_by` is stable: full ties keep store order.
  active.sort_by(|a, b| query.sort.compare(a, b));

  AdminView { active, resolved: resolved.into_iter().cloned().collect(), stats }
}
