//! Dormitory buildings and the default assignment of students to them.

use crate::{Result, issue::StudentId};

/// Every residence building, in assignment order.
pub const DORM_BUILDINGS: [&str; 15] = [
  "F1",
  "F2",
  "F3",
  "F4",
  "F5",
  "F6",
  "Lamduan 1",
  "Lamduan 2",
  "Lamduan 3",
  "Lamduan 4",
  "Lamduan 5",
  "Lamduan 6",
  "Lamduan 7",
  "International House 1",
  "International House 2",
];

/// Default building for a student: the last two digits of the id, modulo the
/// number of buildings. Pure and deterministic.
///
/// A dorm the student registered at signup takes priority over this; see
/// [`crate::credential::CredentialStore::verify`].
pub fn assign_dorm(student_id: &StudentId) -> &'static str {
  let index = student_id.last_two() as usize % DORM_BUILDINGS.len();
  DORM_BUILDINGS[index]
}

/// [`assign_dorm`] for unvalidated input.
pub fn assign_dorm_raw(student_id: &str) -> Result<&'static str> {
  Ok(assign_dorm(&StudentId::parse(student_id)?))
}

pub fn is_known_building(name: &str) -> bool { DORM_BUILDINGS.contains(&name) }
