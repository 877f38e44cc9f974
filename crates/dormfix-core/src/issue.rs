//! Issue types: the reported facility problems and their closed
//! vocabularies.
//!
//! An issue's owner, building and creation time are frozen when it is filed.
//! Only `status` and `updated_at` ever change afterwards, and only through
//! [`crate::store::IssueStore::set_status`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// A 10-digit numeric student identifier.
///
/// Construction always goes through [`StudentId::parse`], so a value of this
/// type is known to be well-formed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
  pub const LEN: usize = 10;

  pub fn parse(raw: &str) -> Result<Self> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(Error::validation("Student ID is required."));
    }
    if trimmed.len() != Self::LEN || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
      return Err(Error::validation("Student ID must be exactly 10 digits."));
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Numeric value of the final two digits.
  pub fn last_two(&self) -> u32 {
    self.0[Self::LEN - 2..].bytes().fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
  }
}

impl fmt::Display for StudentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for StudentId {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { Self::parse(&raw) }
}

impl From<StudentId> for String {
  fn from(id: StudentId) -> Self { id.0 }
}

/// Issue identifier, rendered as `MFU-NNN` with at least three digits.
///
/// The sequence number is handed out by the store from a monotonic counter
/// and is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IssueId(u32);

impl IssueId {
  pub const PREFIX: &'static str = "MFU-";

  pub fn from_seq(seq: u32) -> Self { Self(seq) }

  pub fn seq(self) -> u32 { self.0 }
}

impl fmt::Display for IssueId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{:03}", Self::PREFIX, self.0)
  }
}

impl FromStr for IssueId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let invalid = || Error::validation(format!("not an issue id: {s:?}"));
    let digits = s.trim().strip_prefix(Self::PREFIX).ok_or_else(invalid)?;
    if digits.len() < 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }
    let seq: u32 = digits.parse().map_err(|_| invalid())?;
    let id = Self(seq);
    // Rejects non-canonical spellings such as `MFU-0007`.
    if id.to_string() != s.trim() {
      return Err(invalid());
    }
    Ok(id)
  }
}

impl TryFrom<String> for IssueId {
  type Error = Error;

  fn try_from(raw: String) -> Result<Self> { raw.parse() }
}

impl From<IssueId> for String {
  fn from(id: IssueId) -> Self { id.to_string() }
}

// ─── Vocabularies ────────────────────────────────────────────────────────────

/// What kind of facility problem is being reported.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
  Plumbing,
  Electrical,
  Cleaning,
  Furniture,
  Internet,
  Ac,
  Other,
}

impl Category {
  pub fn label(self) -> &'static str {
    match self {
      Self::Plumbing => "Plumbing",
      Self::Electrical => "Electrical",
      Self::Cleaning => "Cleaning",
      Self::Furniture => "Furniture",
      Self::Internet => "Internet / WiFi",
      Self::Ac => "Air Conditioning",
      Self::Other => "Other",
    }
  }
}

/// Urgency as judged by the reporter.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
  Low,
  #[default]
  Medium,
  High,
}

impl Severity {
  /// Sort rank for the admin queue; lower comes first.
  pub fn rank(self) -> u8 {
    match self {
      Self::High => 0,
      Self::Medium => 1,
      Self::Low => 2,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Low => "Low",
      Self::Medium => "Medium",
      Self::High => "High",
    }
  }
}

/// Where an issue is in its workflow. See [`crate::workflow`] for the
/// allowed moves.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
  #[default]
  Submitted,
  InProgress,
  Resolved,
}

impl Status {
  pub fn label(self) -> &'static str {
    match self {
      Self::Submitted => "Submitted",
      Self::InProgress => "In Progress",
      Self::Resolved => "Resolved",
    }
  }
}

// ─── Issue ───────────────────────────────────────────────────────────────────

/// A single reported facility problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
  pub id:          IssueId,
  pub student_id:  StudentId,
  /// The reporter's building at submission time; not updated if their
  /// assignment changes later.
  pub building:    String,
  pub category:    Category,
  pub description: String,
  pub severity:    Severity,
  pub status:      Status,
  /// Display-only reference to an externally stored image.
  pub photo_url:   Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Issue {
  pub fn is_resolved(&self) -> bool { self.status == Status::Resolved }
}

// ─── NewIssue ────────────────────────────────────────────────────────────────

/// Reporter-supplied fields for a new issue. Identity, ownership, building
/// and timestamps are filled in by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssue {
  pub category:    Category,
  pub description: String,
  #[serde(default)]
  pub severity:    Severity,
  #[serde(default)]
  pub photo_url:   Option<String>,
}

impl NewIssue {
  pub fn new(category: Category, description: impl Into<String>, severity: Severity) -> Self {
    Self { category, description: description.into(), severity, photo_url: None }
  }

  pub fn with_photo(mut self, url: impl Into<String>) -> Self {
    self.photo_url = Some(url.into());
    self
  }

  /// Trim free-text fields and reject a blank description.
  pub(crate) fn normalized(self) -> Result<Self> {
    let description = self.description.trim().to_owned();
    if description.is_empty() {
      return Err(Error::validation("Please describe the issue."));
    }
    let photo_url = self
      .photo_url
      .map(|url| url.trim().to_owned())
      .filter(|url| !url.is_empty());
    Ok(Self { description, photo_url, ..self })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn student_id_requires_ten_digits() {
    assert!(StudentId::parse("6730123456").is_ok());
    assert!(StudentId::parse(" 6730123456 ").is_ok());
    assert!(matches!(StudentId::parse(""), Err(Error::Validation(m)) if m.contains("required")));
    assert!(matches!(StudentId::parse("673012345"), Err(Error::Validation(_))));
    assert!(matches!(StudentId::parse("67301234567"), Err(Error::Validation(_))));
    assert!(matches!(StudentId::parse("67301234ab"), Err(Error::Validation(_))));
  }

  #[test]
  fn student_id_last_two() {
    assert_eq!(StudentId::parse("6730123456").unwrap().last_two(), 56);
    assert_eq!(StudentId::parse("6510987604").unwrap().last_two(), 4);
  }

  #[test]
  fn student_id_rejects_bad_json() {
    let err = serde_json::from_str::<StudentId>("\"12ab\"");
    assert!(err.is_err());
  }

  #[test]
  fn issue_id_formats_zero_padded() {
    assert_eq!(IssueId::from_seq(7).to_string(), "MFU-007");
    assert_eq!(IssueId::from_seq(1234).to_string(), "MFU-1234");
  }

  #[test]
  fn issue_id_parse() {
    assert_eq!("MFU-042".parse::<IssueId>().unwrap(), IssueId::from_seq(42));
    assert!("MFU-42".parse::<IssueId>().is_err());
    assert!("MFU-0042".parse::<IssueId>().is_err());
    assert!("ABC-042".parse::<IssueId>().is_err());
    assert!("MFU-04x".parse::<IssueId>().is_err());
  }

  #[test]
  fn enums_use_lowercase_wire_names() {
    assert_eq!(serde_json::to_string(&Status::InProgress).unwrap(), "\"inprogress\"");
    assert_eq!(serde_json::to_string(&Category::Ac).unwrap(), "\"ac\"");
    assert_eq!("inprogress".parse::<Status>().unwrap(), Status::InProgress);
    assert_eq!("high".parse::<Severity>().unwrap(), Severity::High);
    assert_eq!(Category::Internet.to_string(), "internet");
  }

  #[test]
  fn severity_rank_orders_high_first() {
    assert!(Severity::High.rank() < Severity::Medium.rank());
    assert!(Severity::Medium.rank() < Severity::Low.rank());
  }

  #[test]
  fn new_issue_normalization() {
    let n = NewIssue::new(Category::Other, "  leaking tap  ", Severity::Low)
      .with_photo("   ")
      .normalized()
      .unwrap();
    assert_eq!(n.description, "leaking tap");
    assert_eq!(n.photo_url, None);

    let blank = NewIssue::new(Category::Other, " \n ", Severity::Low).normalized();
    assert!(matches!(blank, Err(Error::Validation(_))));
  }
}
