//! Plain-text rendering of issues and views.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use dormfix_core::{
  issue::Issue,
  query::{AdminView, BuildingSummary, OwnerView},
};

/// Coarse relative age: minutes under an hour, hours under a day, else days.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let mins = (now - then).num_minutes().max(0);
  if mins < 60 {
    return format!("{mins}m ago");
  }
  let hours = mins / 60;
  if hours < 24 {
    return format!("{hours}h ago");
  }
  format!("{}d ago", hours / 24)
}

/// One line per issue: id, severity, status, category, building, age.
pub fn issue_line(issue: &Issue, now: DateTime<Utc>) -> String {
  format!(
    "{:<8} {:<6} {:<11} {:<16} {:<21} {}",
    issue.id,
    issue.severity.label(),
    issue.status.label(),
    issue.category.label(),
    issue.building,
    time_ago(issue.created_at, now),
  )
}

pub fn issue_detail(issue: &Issue, now: DateTime<Utc>) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", issue.id);
  let _ = writeln!(
    out,
    "  {} · {} · {}",
    issue.severity.label(),
    issue.status.label(),
    issue.category.label()
  );
  let _ = writeln!(out, "  {} · {}", issue.building, time_ago(issue.created_at, now));
  let _ = writeln!(out, "  {}", issue.description);
  if let Some(url) = &issue.photo_url {
    let _ = writeln!(out, "  photo: {url}");
  }
  let _ = writeln!(out, "  student: {}", issue.student_id);
  if let Some(label) = issue.status.advance_label() {
    let _ = writeln!(out, "  next: {label}");
  }
  out
}

pub fn issue_list(title: &str, issues: &[Issue], now: DateTime<Utc>) -> String {
  let mut out = format!("{title} ({})\n", issues.len());
  if issues.is_empty() {
    out.push_str("  (none)\n");
  }
  for issue in issues {
    let _ = writeln!(out, "  {}", issue_line(issue, now));
  }
  out
}

pub fn owner_view(view: &OwnerView, now: DateTime<Utc>) -> String {
  if view.active.is_empty() && view.resolved.is_empty() {
    return "No issues submitted yet\n".to_string();
  }
  let mut out = issue_list("Active", &view.active, now);
  out.push_str(&issue_list("Resolved", &view.resolved, now));
  out
}

pub fn summary(building: &str, s: &BuildingSummary) -> String {
  format!(
    "{building}: {} submitted, {} in progress, {} resolved ({} total)\n",
    s.submitted, s.in_progress, s.resolved, s.total
  )
}

pub fn admin_view(view: &AdminView, sort_label: &str, now: DateTime<Utc>) -> String {
  let mut out = format!(
    "High priority: {}  Active: {}  Resolved: {}\nSorted {sort_label}\n",
    view.stats.high_count, view.stats.active_count, view.stats.resolved_count
  );
  out.push_str(&issue_list("Active", &view.active, now));
  out.push_str(&issue_list("Resolved", &view.resolved, now));
  out
}
