//! Student-facing handlers for `/issues` endpoints. All require a student's
//! Basic credentials and are scoped to that student.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/issues` | Every issue in the caller's building, newest first |
//! | `GET`  | `/issues/mine` | The caller's own reports, split active/resolved |
//! | `GET`  | `/issues/summary` | Per-status counts for the caller's building |
//! | `POST` | `/issues` | Body: [`NewIssue`]; returns 201 + stored issue |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use dormfix_core::{
  issue::{Issue, NewIssue},
  query::{BuildingSummary, OwnerView},
};

use crate::{AppState, auth::StudentAuth, error::ApiError, extract::JsonBody};

/// `GET /issues`
pub async fn list(State(state): State<AppState>, StudentAuth(user): StudentAuth) -> Json<Vec<Issue>> {
  Json(state.read().list_for_student(&user.building))
}

/// `GET /issues/mine`
pub async fn mine(State(state): State<AppState>, StudentAuth(user): StudentAuth) -> Json<OwnerView> {
  Json(state.read().list_for_owner(&user.student_id))
}

/// `GET /issues/summary`
pub async fn summary(
  State(state): State<AppState>,
  StudentAuth(user): StudentAuth,
) -> Json<BuildingSummary> {
  Json(state.read().building_summary(&user.building))
}

/// `POST /issues`
pub async fn create(
  State(state): State<AppState>,
  StudentAuth(user): StudentAuth,
  JsonBody(body): JsonBody<NewIssue>,
) -> Result<impl IntoResponse, ApiError> {
  let issue = state.write().create_issue(&user, body)?;
  Ok((StatusCode::CREATED, Json(issue)))
}
