//! Admin handlers under `/admin`. All require the admin's Basic credentials.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/issues` | Optional `?building=<name>&sort=severity\|date` |
//! | `GET`  | `/admin/issues/{id}` | 404 if not found |
//! | `POST` | `/admin/issues/{id}/advance` | 409 if already resolved |

use axum::{
  Json,
  extract::{Path, State},
};
use dormfix_core::{
  issue::{Issue, IssueId},
  query::{AdminQuery, AdminView, SortMode},
};
use serde::Deserialize;

use crate::{AppState, auth::AdminAuth, error::ApiError, extract::QueryParams};

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Restrict the active queue to one building. Empty means no filter.
  pub building: Option<String>,
  #[serde(default)]
  pub sort:     SortMode,
}

impl From<ListParams> for AdminQuery {
  fn from(p: ListParams) -> Self {
    AdminQuery {
      building: p.building.filter(|b| !b.trim().is_empty()),
      sort:     p.sort,
    }
  }
}

/// `GET /admin/issues[?building=...][&sort=...]`
pub async fn list(
  State(state): State<AppState>,
  _admin: AdminAuth,
  QueryParams(params): QueryParams<ListParams>,
) -> Json<AdminView> {
  Json(state.read().list_for_admin(&AdminQuery::from(params)))
}

/// `GET /admin/issues/{id}`
pub async fn get_one(
  State(state): State<AppState>,
  _admin: AdminAuth,
  Path(id): Path<String>,
) -> Result<Json<Issue>, ApiError> {
  let id: IssueId = id.parse()?;
  let issue = state.read().get_issue(id)?.clone();
  Ok(Json(issue))
}

/// `POST /admin/issues/{id}/advance`: move the issue to its next status.
pub async fn advance(
  State(state): State<AppState>,
  _admin: AdminAuth,
  Path(id): Path<String>,
) -> Result<Json<Issue>, ApiError> {
  let id: IssueId = id.parse()?;
  let issue = state.write().advance_status(id)?;
  Ok(Json(issue))
}
