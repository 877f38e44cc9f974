//! Handlers for `/dorms` endpoints. No authentication required.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dorms` | All buildings, in assignment order |
//! | `GET`  | `/dorms/assign/{student_id}` | Default building for an id; 400 if malformed |

use axum::{Json, extract::Path};
use dormfix_core::dorm::{DORM_BUILDINGS, assign_dorm_raw};
use serde::Serialize;

use crate::error::ApiError;

/// `GET /dorms`
pub async fn list() -> Json<Vec<&'static str>> { Json(DORM_BUILDINGS.to_vec()) }

#[derive(Debug, Serialize)]
pub struct Assignment {
  pub student_id: String,
  pub building:   &'static str,
}

/// `GET /dorms/assign/{student_id}`
pub async fn assign(Path(student_id): Path<String>) -> Result<Json<Assignment>, ApiError> {
  let building = assign_dorm_raw(&student_id)?;
  Ok(Json(Assignment { student_id, building }))
}
