//! JSON REST API for the dormfix issue desk.
//!
//! Exposes an axum [`Router`] over a shared [`Desk`]. Callers authenticate
//! every request with HTTP Basic credentials: a student id and password, or
//! the admin username and password.
//!
//! The desk sits behind a single [`RwLock`]: filing an issue assigns its id
//! and inserts it under one write lock, and advancing a status is one locked
//! read-modify-write, so concurrent callers can neither collide on ids nor
//! lose updates.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod dorms;
pub mod error;
pub mod extract;
pub mod issues;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::{
  Router,
  routing::{get, post},
};
use dormfix_core::desk::Desk;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DORMFIX_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub admin_username:      String,
  /// PHC string produced by argon2. When absent the default demo password
  /// is hashed at startup.
  pub admin_password_hash: Option<String>,
  /// Load the demo students and reports on startup.
  pub seed_demo:           bool,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  desk: Arc<RwLock<Desk>>,
}

impl AppState {
  pub fn new(desk: Desk) -> Self { Self { desk: Arc::new(RwLock::new(desk)) } }

  // A panic while holding the lock cannot leave the desk half-updated: every
  // mutation is a single push or field assignment after validation.
  pub fn read(&self) -> RwLockReadGuard<'_, Desk> {
    self.desk.read().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, Desk> {
    self.desk.write().unwrap_or_else(PoisonError::into_inner)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router(state: AppState) -> Router {
  Router::new()
    // Buildings
    .route("/dorms", get(dorms::list))
    .route("/dorms/assign/{student_id}", get(dorms::assign))
    // Accounts
    .route("/signup", post(accounts::signup))
    .route("/me", get(accounts::me))
    // Student views
    .route("/issues", get(issues::list).post(issues::create))
    .route("/issues/mine", get(issues::mine))
    .route("/issues/summary", get(issues::summary))
    // Admin queue
    .route("/admin/issues", get(admin::list))
    .route("/admin/issues/{id}", get(admin::get_one))
    .route("/admin/issues/{id}/advance", post(admin::advance))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
  use dormfix_core::fixtures::{
    DEFAULT_ADMIN_PASSWORD, DEMO_STUDENT_PASSWORD, DEMO_STUDENTS, default_admin,
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  fn state() -> AppState { AppState::new(Desk::demo(default_admin().unwrap()).unwrap()) }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  fn student() -> Option<(&'static str, &'static str)> {
    Some((DEMO_STUDENTS[0], DEMO_STUDENT_PASSWORD))
  }

  fn admin() -> Option<(&'static str, &'static str)> { Some(("admin", DEFAULT_ADMIN_PASSWORD)) }

  async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    creds: Option<(&str, &str)>,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((u, p)) = creds {
      builder = builder.header(header::AUTHORIZATION, auth_header(u, p));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Dorms ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dorm_list_and_assignment() {
    let s = state();
    let res = send(&s, "GET", "/dorms", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await.as_array().unwrap().len(), 15);

    let res = send(&s, "GET", "/dorms/assign/6730123456", None, None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["building"], "Lamduan 6");

    let res = send(&s, "GET", "/dorms/assign/12ab", None, None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  // ── Auth ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn missing_credentials_is_401_with_challenge() {
    let s = state();
    let res = send(&s, "GET", "/issues", None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_is_401() {
    let s = state();
    let res = send(&s, "GET", "/issues", Some((DEMO_STUDENTS[0], "nope")), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(res).await["error"], "invalid credentials");
  }

  #[tokio::test]
  async fn roles_are_enforced() {
    let s = state();
    let res = send(&s, "GET", "/admin/issues", student(), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let res = send(&s, "GET", "/issues", admin(), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
  }

  #[tokio::test]
  async fn me_reports_session() {
    let s = state();
    let body = json_body(send(&s, "GET", "/me", student(), None).await).await;
    assert_eq!(body["role"], "student");
    assert_eq!(body["building"], "Lamduan 6");
    let body = json_body(send(&s, "GET", "/me", admin(), None).await).await;
    assert_eq!(body["role"], "admin");
  }

  // ── Signup ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn signup_then_use_registered_dorm() {
    let s = state();
    let form = json!({
      "student_id": "6600000042",
      "dorm": "F5",
      "password": "secret1",
      "confirm_password": "secret1",
    });
    let res = send(&s, "POST", "/signup", None, Some(form.clone())).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(json_body(res).await["building"], "F5");

    let res = send(&s, "POST", "/signup", None, Some(form)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = json_body(send(&s, "GET", "/me", Some(("6600000042", "secret1")), None).await).await;
    assert_eq!(body["building"], "F5");
  }

  #[tokio::test]
  async fn signup_validation_message_is_returned() {
    let s = state();
    let form = json!({
      "student_id": "6600000042",
      "dorm": "F5",
      "password": "secret1",
      "confirm_password": "secret2",
    });
    let res = send(&s, "POST", "/signup", None, Some(form)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(res).await["error"], "Passwords do not match.");
  }

  // ── Student issues ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn student_files_and_sees_building_issues() {
    let s = state();
    let res = send(
      &s,
      "POST",
      "/issues",
      student(),
      Some(json!({ "category": "plumbing", "description": "  dripping tap ", "severity": "high" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let issue = json_body(res).await;
    assert_eq!(issue["id"], "MFU-009");
    assert_eq!(issue["status"], "submitted");
    assert_eq!(issue["building"], "Lamduan 6");
    assert_eq!(issue["description"], "dripping tap");

    let list = json_body(send(&s, "GET", "/issues", student(), None).await).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "MFU-009");

    let summary = json_body(send(&s, "GET", "/issues/summary", student(), None).await).await;
    assert_eq!(summary["submitted"], 1);
    assert_eq!(summary["total"], 1);

    let mine = json_body(send(&s, "GET", "/issues/mine", student(), None).await).await;
    assert_eq!(mine["active"][0]["id"], "MFU-009");
    assert_eq!(mine["resolved"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn malformed_body_is_400_with_json_error() {
    let s = state();
    let res = send(
      &s,
      "POST",
      "/issues",
      student(),
      Some(json!({ "category": "roof", "description": "hole" })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["error"].as_str().is_some_and(|m| !m.is_empty()));

    let res = send(&s, "POST", "/signup", None, Some(json!({ "student_id": 42 }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["error"].is_string());
  }

  #[tokio::test]
  async fn bad_query_is_400_with_json_error() {
    let s = state();
    let res = send(&s, "GET", "/admin/issues?sort=random", admin(), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(res).await["error"].is_string());
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_reports_get_distinct_ids() {
    let s = state();
    let tasks: Vec<_> = (0..6)
      .map(|k| {
        let s = s.clone();
        tokio::spawn(async move {
          let body = json!({ "category": "other", "description": format!("report {k}") });
          let res = send(&s, "POST", "/issues", student(), Some(body)).await;
          assert_eq!(res.status(), StatusCode::CREATED);
          json_body(res).await["id"].as_str().unwrap().to_string()
        })
      })
      .collect();

    let mut ids = Vec::new();
    for task in tasks {
      ids.push(task.await.unwrap());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
    assert_eq!(s.read().issues().len(), 8 + 6);
  }

  #[tokio::test]
  async fn blank_description_is_400() {
    let s = state();
    let res = send(
      &s,
      "POST",
      "/issues",
      student(),
      Some(json!({ "category": "other", "description": "   " })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  // ── Admin queue ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_list_sorted_and_filtered() {
    let s = state();
    let view = json_body(send(&s, "GET", "/admin/issues", admin(), None).await).await;
    assert_eq!(view["stats"]["high_count"], 3);
    assert_eq!(view["stats"]["active_count"], 6);
    assert_eq!(view["stats"]["resolved_count"], 2);
    assert_eq!(view["active"][0]["id"], "MFU-007");

    let view =
      json_body(send(&s, "GET", "/admin/issues?building=F1&sort=date", admin(), None).await).await;
    let active = view["active"].as_array().unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|i| i["building"] == "F1"));
    assert_eq!(active[0]["id"], "MFU-003");

    let view =
      json_body(send(&s, "GET", "/admin/issues?building=Lamduan%207", admin(), None).await).await;
    assert!(view["active"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn admin_advances_until_resolved() {
    let s = state();
    let res = send(&s, "POST", "/admin/issues/MFU-002/advance", admin(), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(res).await["status"], "inprogress");

    let res = send(&s, "POST", "/admin/issues/MFU-002/advance", admin(), None).await;
    assert_eq!(json_body(res).await["status"], "resolved");

    let res = send(&s, "POST", "/admin/issues/MFU-002/advance", admin(), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = send(&s, "GET", "/admin/issues/MFU-002", admin(), None).await;
    assert_eq!(json_body(res).await["status"], "resolved");
  }

  #[tokio::test]
  async fn unknown_or_malformed_issue_ids() {
    let s = state();
    let res = send(&s, "POST", "/admin/issues/MFU-999/advance", admin(), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = send(&s, "GET", "/admin/issues/banana", admin(), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }
}
