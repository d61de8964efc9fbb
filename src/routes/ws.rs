// WebSocket handler: pushes a ClusterView on connect and after every store update

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::publisher::ClusterView;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Decrements the /ws/issues connection count on drop (connect = +1, drop = -1).
struct WsIssuesGuard(Arc<AtomicUsize>);

impl Drop for WsIssuesGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

pub(super) async fn ws_issues(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let feeds = state.feeds.clone();
    let conn_count = state.ws_issue_connections.clone();
    ws.on_upgrade(move |socket| async move {
        let (current, mut rx) = feeds.follow();
        if let Err(e) = stream_issues(socket, &mut rx, conn_count, current).await {
            tracing::info!(error = %e, "Issues stream error");
        }
    })
}

async fn send_text(socket: &mut WebSocket, json: String) -> bool {
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    !(r.is_err() || r.unwrap_or(Ok(())).is_err())
}

async fn stream_issues(
    mut socket: WebSocket,
    rx: &mut broadcast::Receiver<Arc<ClusterView>>,
    conn_count: Arc<AtomicUsize>,
    current: Arc<ClusterView>,
) -> anyhow::Result<()> {
    conn_count.fetch_add(1, Ordering::Relaxed);
    let _guard = WsIssuesGuard(conn_count);
    tracing::info!("Client connected to issues stream");

    if !send_text(&mut socket, serde_json::to_string(current.as_ref())?).await {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(view) => {
                        if !send_text(&mut socket, serde_json::to_string(view.as_ref())?).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "WebSocket /ws/issues client lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
