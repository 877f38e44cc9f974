//! HTTP Basic-auth extractors.
//!
//! Every request carries its own credentials and resolves to a
//! [`Session`] for the duration of that request. A username that parses as a
//! student id is checked against the student table; anything else is checked
//! against the admin account.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use dormfix_core::{
  credential::{AdminCredentials, CredentialEntry},
  desk::Desk,
  issue::StudentId,
  session::{Session, StudentUser},
};

use crate::{AppState, error::ApiError};

/// Decode `Authorization: Basic …` into `(username, password)`.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok((username.to_owned(), password.to_owned()))
}

/// What a login is checked against, copied out of the desk so the argon2
/// comparison runs without holding the desk lock.
#[derive(Debug, Clone)]
pub enum LoginClaim {
  /// The username parsed as a student id; `None` when no such account exists.
  Student(StudentId, Option<CredentialEntry>),
  Admin(AdminCredentials),
}

/// Look up what `username` must be checked against. Cheap; no hashing.
pub fn login_claim(desk: &Desk, username: &str) -> LoginClaim {
  match StudentId::parse(username) {
    Ok(id) => {
      let entry = desk.students().get(&id).cloned();
      LoginClaim::Student(id, entry)
    }
    Err(_) => LoginClaim::Admin(desk.admin().clone()),
  }
}

/// Run the password check for `claim`. Malformed or wrong credentials are
/// both reported as [`ApiError::Unauthorized`].
pub fn check_claim(claim: LoginClaim, username: &str, password: &str) -> Result<Session, ApiError> {
  let session = match claim {
    LoginClaim::Student(id, Some(entry)) => entry
      .verify(&id, password)
      .ok()
      .map(|building| Session::Student(StudentUser { student_id: id, building })),
    LoginClaim::Student(_, None) => None,
    LoginClaim::Admin(admin) => admin.verify(username, password).then_some(Session::Admin),
  };
  session.ok_or_else(|| {
    tracing::warn!("rejected login");
    ApiError::Unauthorized
  })
}

/// Resolve credentials to a session against `desk`.
pub fn resolve_session(desk: &Desk, username: &str, password: &str) -> Result<Session, ApiError> {
  check_claim(login_claim(desk, username), username, password)
}

async fn session_from_parts(parts: &Parts, state: &AppState) -> Result<Session, ApiError> {
  let (username, password) = basic_credentials(&parts.headers)?;
  let claim = login_claim(&state.read(), &username);
  tokio::task::spawn_blocking(move || check_claim(claim, &username, &password)).await?
}

/// Any authenticated caller.
pub struct Authenticated(pub Session);

/// An authenticated student.
pub struct StudentAuth(pub StudentUser);

/// The authenticated administrator.
pub struct AdminAuth;

impl FromRequestParts<AppState> for Authenticated {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
    session_from_parts(parts, state).await.map(Authenticated)
  }
}

impl FromRequestParts<AppState> for StudentAuth {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
    let session = session_from_parts(parts, state).await?;
    let user = session.require_student()?.clone();
    Ok(StudentAuth(user))
  }
}

impl FromRequestParts<AppState> for AdminAuth {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
    session_from_parts(parts, state).await?.require_admin()?;
    Ok(AdminAuth)
  }
}
