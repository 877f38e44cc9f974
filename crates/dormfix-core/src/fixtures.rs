//! Demo data: two student accounts and a handful of reports spread across
//! buildings and statuses.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  Error, Result,
  credential::{AdminCredentials, CredentialEntry, CredentialStore, hash_password},
  desk::Desk,
  issue::{Category, Issue, IssueId, Severity, Status, StudentId},
  store::IssueStore,
};

/// Demo student ids; both use [`DEMO_STUDENT_PASSWORD`].
pub const DEMO_STUDENTS: [&str; 2] = ["6730123456", "6510987654"];
pub const DEMO_STUDENT_PASSWORD: &str = "student123";

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

struct DemoIssue {
  seq:         u32,
  student_id:  &'static str,
  building:    &'static str,
  category:    Category,
  description: &'static str,
  severity:    Severity,
  status:      Status,
  photo_url:   Option<&'static str>,
  /// `(month, day, hour, minute)` in 2025, UTC.
  created:     (u32, u32, u32, u32),
  updated:     (u32, u32, u32, u32),
}

const DEMO_ISSUES: [DemoIssue; 8] = [
  DemoIssue {
    seq:         1,
    student_id:  "6830123456",
    building:    "F1",
    category:    Category::Plumbing,
    description: "The shower in room 301 is leaking water constantly. The floor is always wet \
                  and slippery, causing a safety hazard.",
    severity:    Severity::High,
    status:      Status::InProgress,
    photo_url:   Some("https://images.unsplash.com/photo-1585771724684-38269d6639fd?w=400&q=80"),
    created:     (2, 10, 8, 30),
    updated:     (2, 11, 14, 0),
  },
  DemoIssue {
    seq:         2,
    student_id:  "6730123456",
    building:    "Lamduan 3",
    category:    Category::Electrical,
    description: "Power outlet near study desk is not working. Cannot charge laptop or phone \
                  at the desk.",
    severity:    Severity::Medium,
    status:      Status::Submitted,
    photo_url:   Some("https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=400&q=80"),
    created:     (2, 12, 10, 0),
    updated:     (2, 12, 10, 0),
  },
  DemoIssue {
    seq:         3,
    student_id:  "6510987654",
    building:    "F1",
    category:    Category::Cleaning,
    description: "Common bathroom on floor 2 has not been cleaned for 3 days. There is a bad \
                  smell and trash overflowing.",
    severity:    Severity::High,
    status:      Status::Submitted,
    photo_url:   Some("https://images.unsplash.com/photo-1484154218962-a197022b5858?w=400&q=80"),
    created:     (2, 13, 9, 15),
    updated:     (2, 13, 9, 15),
  },
  DemoIssue {
    seq:         4,
    student_id:  "6830123456",
    building:    "F1",
    category:    Category::Ac,
    description: "Air conditioning unit in room 210 makes loud grinding noise at night. Very \
                  difficult to sleep.",
    severity:    Severity::Medium,
    status:      Status::Resolved,
    photo_url:   None,
    created:     (2, 8, 21, 0),
    updated:     (2, 14, 16, 0),
  },
  DemoIssue {
    seq:         5,
    student_id:  "6730123456",
    building:    "Lamduan 3",
    category:    Category::Internet,
    description: "WiFi signal is very weak in the room. Cannot attend online classes properly.",
    severity:    Severity::Medium,
    status:      Status::InProgress,
    photo_url:   None,
    created:     (2, 11, 16, 30),
    updated:     (2, 13, 11, 0),
  },
  DemoIssue {
    seq:         6,
    student_id:  "6510987654",
    building:    "International House 1",
    category:    Category::Furniture,
    description: "Study chair is broken; one leg is shorter than the others, making it \
                  unstable and uncomfortable.",
    severity:    Severity::Low,
    status:      Status::Submitted,
    photo_url:   Some("https://images.unsplash.com/photo-1580480055273-228ff5388ef8?w=400&q=80"),
    created:     (2, 14, 13, 0),
    updated:     (2, 14, 13, 0),
  },
  DemoIssue {
    seq:         7,
    student_id:  "6830123456",
    building:    "F2",
    category:    Category::Plumbing,
    description: "Hot water is not working in the entire floor. Students cannot take warm \
                  showers.",
    severity:    Severity::High,
    status:      Status::Submitted,
    photo_url:   None,
    created:     (2, 15, 7, 0),
    updated:     (2, 15, 7, 0),
  },
  DemoIssue {
    seq:         8,
    student_id:  "6730123456",
    building:    "Lamduan 5",
    category:    Category::Electrical,
    description: "Hallway light on floor 3 is flickering constantly. It's annoying and may \
                  indicate electrical issue.",
    severity:    Severity::Low,
    status:      Status::Resolved,
    photo_url:   None,
    created:     (2, 7, 18, 0),
    updated:     (2, 10, 10, 0),
  },
];

fn in_2025((month, day, hour, minute): (u32, u32, u32, u32)) -> Result<DateTime<Utc>> {
  NaiveDate::from_ymd_opt(2025, month, day)
    .and_then(|d| d.and_hms_opt(hour, minute, 0))
    .map(|dt| dt.and_utc())
    .ok_or_else(|| {
      Error::validation(format!(
        "invalid demo timestamp 2025-{month:02}-{day:02} {hour:02}:{minute:02}"
      ))
    })
}

/// The demo reports, in store order.
pub fn demo_issues() -> Result<Vec<Issue>> {
  DEMO_ISSUES
    .iter()
    .map(|demo| {
      Ok(Issue {
        id:          IssueId::from_seq(demo.seq),
        student_id:  StudentId::parse(demo.student_id)?,
        building:    demo.building.to_owned(),
        category:    demo.category,
        description: demo.description.to_owned(),
        severity:    demo.severity,
        status:      demo.status,
        photo_url:   demo.photo_url.map(str::to_owned),
        created_at:  in_2025(demo.created)?,
        updated_at:  in_2025(demo.updated)?,
      })
    })
    .collect()
}

/// Demo student accounts. Neither has a registered dorm, so both get the
/// computed assignment.
pub fn demo_students() -> Result<CredentialStore> {
  let mut students = CredentialStore::new();
  for raw in DEMO_STUDENTS {
    students.insert(StudentId::parse(raw)?, CredentialEntry {
      password_hash:   hash_password(DEMO_STUDENT_PASSWORD)?,
      registered_dorm: None,
    });
  }
  Ok(students)
}

pub fn default_admin() -> Result<AdminCredentials> {
  AdminCredentials::from_plaintext(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
}

impl Desk {
  /// A desk pre-loaded with the demo students and reports.
  pub fn demo(admin: AdminCredentials) -> Result<Self> {
    Ok(Self::from_parts(IssueStore::restore(demo_issues()?, 0), demo_students()?, admin))
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use super::*;
  use crate::{dorm::is_known_building, issue::NewIssue, query::AdminQuery};

  #[test]
  fn demo_issues_are_consistent() {
    let issues = demo_issues().unwrap();
    assert_eq!(issues.len(), 8);
    let ids: HashSet<_> = issues.iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), 8);
    for issue in &issues {
      assert!(issue.updated_at >= issue.created_at, "{}", issue.id);
      assert!(is_known_building(&issue.building));
      assert_eq!(issue.created_at.format("%Y").to_string(), "2025");
    }
  }

  #[test]
  fn demo_timestamps_reject_impossible_dates() {
    assert_eq!(in_2025((2, 13, 9, 15)).unwrap().to_rfc3339(), "2025-02-13T09:15:00+00:00");
    assert!(matches!(in_2025((2, 30, 8, 0)), Err(Error::Validation(_))));
    assert!(matches!(in_2025((13, 1, 0, 0)), Err(Error::Validation(_))));
    assert!(matches!(in_2025((3, 1, 24, 0)), Err(Error::Validation(_))));
  }

  #[test]
  fn demo_desk_continues_numbering() {
    let mut desk = Desk::demo(default_admin().unwrap()).unwrap();
    let user = desk.verify_student(DEMO_STUDENTS[0], DEMO_STUDENT_PASSWORD).unwrap();
    assert_eq!(user.building, "Lamduan 6");
    let issue = desk
      .create_issue(&user, NewIssue::new(Category::Other, "new", Severity::Low))
      .unwrap();
    assert_eq!(issue.id.to_string(), "MFU-009");
  }

  #[test]
  fn demo_admin_stats() {
    let desk = Desk::demo(default_admin().unwrap()).unwrap();
    let view = desk.list_for_admin(&AdminQuery::default());
    assert_eq!(view.stats.active_count, 6);
    assert_eq!(view.stats.resolved_count, 2);
    assert_eq!(view.stats.high_count, 3);
    // High first, newest first among highs: MFU-007, MFU-003, MFU-001.
    let head: Vec<String> = view.active.iter().take(3).map(|i| i.id.to_string()).collect();
    assert_eq!(head, ["MFU-007", "MFU-003", "MFU-001"]);
  }
}
