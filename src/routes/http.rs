// GET handlers: version, snapshot, issues, status

use std::sync::atomic::Ordering;

use axum::{extract::State, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/snapshot: last merged snapshot (empty until the first update).
pub(super) async fn snapshot_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.feeds.view.borrow().clone();
    axum::Json(view.snapshot.clone())
}

/// GET /api/issues: every detected issue, informational ones included.
pub(super) async fn issues_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.feeds.view.borrow().clone();
    axum::Json(view.issues.clone())
}

/// GET /api/issues/real
pub(super) async fn real_issues_handler(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.feeds.view.borrow().clone();
    axum::Json(view.real_issues())
}

/// GET /api/status: latest connection status plus update bookkeeping.
pub(super) async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.feeds.status.borrow().clone();
    let view = state.feeds.view.borrow().clone();
    axum::Json(serde_json::json!({
        "status": status,
        "updatedAt": view.updated_at,
        "issueCount": view.issues.len(),
        "realIssueCount": view.real_issue_count,
        "wsClients": state.ws_issue_connections.load(Ordering::Relaxed),
    }))
}
