//! Who is at the keyboard.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{Error, Result, issue::StudentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  None,
  Student,
  Admin,
}

/// A logged-in student and the building their view is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentUser {
  pub student_id: StudentId,
  pub building:   String,
}

/// The active session. A student identity exists only in the
/// [`Session::Student`] variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Session {
  #[default]
  None,
  Student(StudentUser),
  Admin,
}

impl Session {
  pub fn role(&self) -> Role {
    match self {
      Self::None => Role::None,
      Self::Student(_) => Role::Student,
      Self::Admin => Role::Admin,
    }
  }

  pub fn user(&self) -> Option<&StudentUser> {
    match self {
      Self::Student(user) => Some(user),
      Self::None | Self::Admin => None,
    }
  }

  pub fn require_student(&self) -> Result<&StudentUser> {
    self.user().ok_or(Error::RoleRequired(Role::Student))
  }

  pub fn require_admin(&self) -> Result<()> {
    match self {
      Self::Admin => Ok(()),
      Self::None | Self::Student(_) => Err(Error::RoleRequired(Role::Admin)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn student() -> Session {
    Session::Student(StudentUser {
      student_id: StudentId::parse("6730123456").unwrap(),
      building:   "F1".into(),
    })
  }

  #[test]
  fn roles() {
    assert_eq!(Session::None.role(), Role::None);
    assert_eq!(student().role(), Role::Student);
    assert_eq!(Session::Admin.role(), Role::Admin);
    assert!(Session::Admin.user().is_none());
  }

  #[test]
  fn role_guards() {
    assert!(student().require_student().is_ok());
    assert!(matches!(student().require_admin(), Err(Error::RoleRequired(Role::Admin))));
    assert!(matches!(Session::None.require_student(), Err(Error::RoleRequired(Role::Student))));
    assert!(Session::Admin.require_admin().is_ok());
  }

  #[test]
  fn json_shape() {
    let json = serde_json::to_value(student()).unwrap();
    assert_eq!(json["role"], "student");
    assert_eq!(json["student_id"], "6730123456");
    assert_eq!(json["building"], "F1");

    let back: Session = serde_json::from_value(json).unwrap();
    assert_eq!(back, student());
    assert_eq!(serde_json::to_value(Session::Admin).unwrap()["role"], "admin");
  }
}
