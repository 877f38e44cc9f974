//! [`Client`], a single-user session over a [`Desk`].
//!
//! One client process holds at most one session at a time. Role checks live
//! here: student views and reporting need a student session, the queue and
//! status changes need the admin session.

use crate::{
  Result,
  credential::{AdminCredentials, SignupRequest},
  desk::Desk,
  fixtures,
  issue::{Issue, IssueId, NewIssue, StudentId},
  mirror::{self, ISSUES_KEY, KeyValue, STUDENTS_KEY},
  query::{AdminQuery, AdminView, BuildingSummary, OwnerView},
  session::{Session, StudentUser},
  store::IssueStore,
};

#[derive(Debug, Clone)]
pub struct Client {
  desk:    Desk,
  session: Session,
}

impl Client {
  /// A logged-out client over `desk`.
  pub fn new(desk: Desk) -> Self { Self { desk, session: Session::None } }

  pub fn desk(&self) -> &Desk { &self.desk }

  pub fn session(&self) -> &Session { &self.session }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Register a new student. Does not log in.
  pub fn signup(&mut self, request: &SignupRequest) -> Result<StudentId> {
    self.desk.signup(request)
  }

  /// Replace the current session with a student session. On failure the
  /// current session is left untouched.
  pub fn login_student(&mut self, student_id: &str, password: &str) -> Result<&StudentUser> {
    let user = self.desk.verify_student(student_id, password)?;
    tracing::info!(student = %user.student_id, building = %user.building, "student logged in");
    self.session = Session::Student(user);
    self.session.require_student()
  }

  pub fn login_admin(&mut self, username: &str, password: &str) -> Result<()> {
    self.desk.verify_admin(username, password)?;
    tracing::info!("admin logged in");
    self.session = Session::Admin;
    Ok(())
  }

  pub fn logout(&mut self) {
    if self.session != Session::None {
      tracing::info!(role = %self.session.role(), "logged out");
    }
    self.session = Session::None;
  }

  // ── Student operations ────────────────────────────────────────────────────

  pub fn report(&mut self, input: NewIssue) -> Result<Issue> {
    let user = self.session.require_student()?.clone();
    self.desk.create_issue(&user, input)
  }

  /// Everything filed in the student's building.
  pub fn building_issues(&self) -> Result<Vec<Issue>> {
    let user = self.session.require_student()?;
    Ok(self.desk.list_for_student(&user.building))
  }

  pub fn my_issues(&self) -> Result<OwnerView> {
    let user = self.session.require_student()?;
    Ok(self.desk.list_for_owner(&user.student_id))
  }

  pub fn building_summary(&self) -> Result<BuildingSummary> {
    let user = self.session.require_student()?;
    Ok(self.desk.building_summary(&user.building))
  }

  // ── Admin operations ──────────────────────────────────────────────────────

  pub fn admin_view(&self, query: &AdminQuery) -> Result<AdminView> {
    self.session.require_admin()?;
    Ok(self.desk.list_for_admin(query))
  }

  pub fn advance(&mut self, id: IssueId) -> Result<Issue> {
    self.session.require_admin()?;
    self.desk.advance_status(id)
  }

  // ── Mirroring ─────────────────────────────────────────────────────────────

  /// Rebuild a client from a key-value mirror.
  ///
  /// Missing tables start empty, or with the demo data when `seed_demo` is
  /// set. The admin account is not mirrored; it always comes from `admin`.
  pub fn restore<K: KeyValue + ?Sized>(
    kv: &K,
    admin: AdminCredentials,
    seed_demo: bool,
  ) -> Result<Self> {
    let students = match mirror::load(kv, STUDENTS_KEY)? {
      Some(students) => students,
      None if seed_demo => fixtures::demo_students()?,
      None => Default::default(),
    };
    let issues = match mirror::load(kv, ISSUES_KEY)? {
      Some(issues) => issues,
      None if seed_demo => IssueStore::restore(fixtures::demo_issues()?, 0),
      None => IssueStore::new(),
    };
    let session = mirror::load_session(kv)?;
    tracing::debug!(
      issues = issues.len(),
      role = %session.role(),
      "restored client state"
    );
    Ok(Self { desk: Desk::from_parts(issues, students, admin), session })
  }

  /// Write session, students and issues back to the mirror.
  ///
  /// These are three separate writes. Backends with transactions should
  /// wrap restore, the change and this call in one so that concurrent
  /// clients cannot interleave and a failed write leaves nothing behind.
  pub fn persist<K: KeyValue + ?Sized>(&self, kv: &K) -> Result<()> {
    mirror::save(kv, STUDENTS_KEY, self.desk.students())?;
    mirror::save(kv, ISSUES_KEY, self.desk.issues())?;
    mirror::save_session(kv, &self.session)
  }
}
