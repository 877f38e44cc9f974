//! [`Desk`], the issue desk context object.
//!
//! A `Desk` owns the issue store and both credential tables and is passed
//! explicitly to whatever drives it; there is no global state. It knows
//! nothing about sessions: callers resolve who is asking first
//! ([`Desk::verify_student`], [`Desk::verify_admin`]) and pass the result in.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  credential::{AdminCredentials, CredentialStore, NewAccount, SignupRequest},
  issue::{Issue, IssueId, NewIssue, StudentId},
  query::{self, AdminQuery, AdminView, BuildingSummary, OwnerView},
  session::StudentUser,
  store::IssueStore,
};

#[derive(Debug, Clone)]
pub struct Desk {
  issues:   IssueStore,
  students: CredentialStore,
  admin:    AdminCredentials,
}

impl Desk {
  /// An empty desk with no students and no issues.
  pub fn new(admin: AdminCredentials) -> Self {
    Self::from_parts(IssueStore::new(), CredentialStore::new(), admin)
  }

  pub fn from_parts(issues: IssueStore, students: CredentialStore, admin: AdminCredentials) -> Self {
    Self { issues, students, admin }
  }

  pub fn issues(&self) -> &IssueStore { &self.issues }

  pub fn students(&self) -> &CredentialStore { &self.students }

  pub fn admin(&self) -> &AdminCredentials { &self.admin }

  // ── Accounts ──────────────────────────────────────────────────────────────

  pub fn signup(&mut self, request: &SignupRequest) -> Result<StudentId> {
    let id = self.students.register(request)?;
    tracing::info!(student = %id, "student registered");
    Ok(id)
  }

  /// Store an account whose form was checked and password hashed ahead of
  /// time with [`SignupRequest::prepare`].
  pub fn add_account(&mut self, account: NewAccount) -> Result<StudentId> {
    let id = self.students.add(account)?;
    tracing::info!(student = %id, "student registered");
    Ok(id)
  }

  /// Check a student login and resolve the building their views are scoped
  /// to. Format problems are [`Error::Validation`]; any credential mismatch
  /// is [`Error::AuthFailure`].
  pub fn verify_student(&self, student_id: &str, password: &str) -> Result<StudentUser> {
    let id = StudentId::parse(student_id)?;
    if password.trim().is_empty() {
      return Err(Error::validation("Password is required."));
    }
    match self.students.verify(&id, password) {
      Ok(building) => Ok(StudentUser { student_id: id, building }),
      Err(e) => {
        tracing::warn!("rejected student login");
        Err(e)
      }
    }
  }

  pub fn verify_admin(&self, username: &str, password: &str) -> Result<()> {
    if self.admin.verify(username, password) {
      Ok(())
    } else {
      tracing::warn!("rejected admin login");
      Err(Error::AuthFailure)
    }
  }

  // ── Issues ────────────────────────────────────────────────────────────────

  /// File a report on behalf of `reporter`, stamped with the current time.
  pub fn create_issue(&mut self, reporter: &StudentUser, input: NewIssue) -> Result<Issue> {
    self.create_issue_at(reporter, input, Utc::now())
  }

  pub fn create_issue_at(
    &mut self,
    reporter: &StudentUser,
    input: NewIssue,
    at: DateTime<Utc>,
  ) -> Result<Issue> {
    let issue = self
      .issues
      .append(reporter.student_id.clone(), reporter.building.clone(), input, at)?
      .clone();
    tracing::info!(
      issue = %issue.id,
      building = %issue.building,
      severity = %issue.severity,
      "issue filed"
    );
    Ok(issue)
  }

  pub fn get_issue(&self, id: IssueId) -> Result<&Issue> {
    self.issues.get(id).ok_or(Error::NotFound(id))
  }

  /// Move an issue to the next status in the workflow.
  pub fn advance_status(&mut self, id: IssueId) -> Result<Issue> {
    self.advance_status_at(id, Utc::now())
  }

  pub fn advance_status_at(&mut self, id: IssueId, at: DateTime<Utc>) -> Result<Issue> {
    let issue = self.issues.advance(id, at)?.clone();
    tracing::info!(issue = %issue.id, status = %issue.status, "issue status advanced");
    Ok(issue)
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub fn list_for_student(&self, building: &str) -> Vec<Issue> {
    query::list_for_student(&self.issues, building)
  }

  pub fn list_for_owner(&self, owner: &StudentId) -> OwnerView {
    query::list_for_owner(&self.issues, owner)
  }

  pub fn building_summary(&self, building: &str) -> BuildingSummary {
    query::building_summary(&self.issues, building)
  }

  pub fn list_for_admin(&self, query: &AdminQuery) -> AdminView {
    query::list_for_admin(&self.issues, query)
  }
}
