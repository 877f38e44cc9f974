//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/signup` | Body: [`SignupRequest`]; returns 201 |
//! | `GET`  | `/me` | The caller's resolved session |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use dormfix_core::{credential::SignupRequest, session::Session};
use serde::Serialize;

use crate::{AppState, auth::Authenticated, error::ApiError, extract::JsonBody};

#[derive(Debug, Serialize)]
pub struct SignupResponse {
  pub student_id: String,
  pub building:   Option<String>,
}

/// `POST /signup`
///
/// The form is checked and the password hashed on the blocking pool before
/// the desk is locked; only the duplicate check and insert run under it.
pub async fn signup(
  State(state): State<AppState>,
  JsonBody(body): JsonBody<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
  let account = tokio::task::spawn_blocking(move || body.prepare()).await??;
  let building = account.entry.registered_dorm.clone();
  let id = state.write().add_account(account)?;
  Ok((StatusCode::CREATED, Json(SignupResponse { student_id: id.to_string(), building })))
}

/// `GET /me`
pub async fn me(Authenticated(session): Authenticated) -> Json<Session> { Json(session) }
