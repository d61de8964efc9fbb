// HTTP + WebSocket read API over the published cluster view

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tower_http::cors::{Any, CorsLayer};

use crate::publisher::Feeds;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) feeds: Feeds,
    pub(crate) ws_issue_connections: Arc<AtomicUsize>,
}

pub fn app(feeds: Feeds, ws_issue_connections: Arc<AtomicUsize>) -> Router {
    let state = AppState {
        feeds,
        ws_issue_connections,
    };
    Router::new()
        .route("/", get(|| async { "clusterwatch: live cluster issue monitor" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/snapshot", get(http::snapshot_handler)) // GET /api/snapshot
        .route("/api/issues", get(http::issues_handler)) // GET /api/issues
        .route("/api/issues/real", get(http::real_issues_handler)) // GET /api/issues/real
        .route("/api/status", get(http::status_handler)) // GET /api/status
        .route("/ws/issues", get(ws::ws_issues)) // WS /ws/issues
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
