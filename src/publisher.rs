// Bridges the single-owner store to the read API via watch/broadcast channels.
// The store stays on the client task; the HTTP side only ever sees cloned views.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::time::{Duration, Instant};

use crate::models::{ClusterSnapshot, Issue};
use crate::status::{LogStatus, Status, StatusSink};
use crate::store::{StateStore, Subscription};

/// Rate limit for the "no receivers" message (nobody on /ws/issues).
const NO_RECEIVERS_LOG_INTERVAL: Duration = Duration::from_secs(60);

/// Snapshot + issues as of one store update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterView {
    pub snapshot: ClusterSnapshot,
    pub issues: Vec<Issue>,
    pub real_issue_count: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClusterView {
    pub fn new(snapshot: &ClusterSnapshot, issues: &[Issue], updated_at: DateTime<Utc>) -> Self {
        Self {
            snapshot: snapshot.clone(),
            issues: issues.to_vec(),
            real_issue_count: issues.iter().filter(|i| i.is_real()).count(),
            updated_at: Some(updated_at),
        }
    }

    pub fn real_issues(&self) -> Vec<Issue> {
        self.issues.iter().filter(|i| i.is_real()).cloned().collect()
    }
}

/// Receiving ends handed to the read API.
#[derive(Clone)]
pub struct Feeds {
    pub view: watch::Receiver<Arc<ClusterView>>,
    pub updates: broadcast::Sender<Arc<ClusterView>>,
    pub status: watch::Receiver<Option<Status>>,
}

impl Feeds {
    /// Current view plus a receiver for every later one. Subscribes before reading,
    /// so an update landing in between shows up on the receiver instead of being lost.
    pub fn follow(&self) -> (Arc<ClusterView>, broadcast::Receiver<Arc<ClusterView>>) {
        let rx = self.updates.subscribe();
        let current = self.view.borrow().clone();
        (current, rx)
    }
}

pub struct Publisher {
    view_tx: watch::Sender<Arc<ClusterView>>,
    updates_tx: broadcast::Sender<Arc<ClusterView>>,
    status_tx: watch::Sender<Option<Status>>,
}

impl Publisher {
    pub fn new(broadcast_capacity: usize) -> Self {
        let (view_tx, _) = watch::channel(Arc::new(ClusterView::default()));
        let (updates_tx, _) = broadcast::channel(broadcast_capacity);
        let (status_tx, _) = watch::channel(None);
        Self {
            view_tx,
            updates_tx,
            status_tx,
        }
    }

    /// Subscribe to `store` so every update is mirrored into the feeds.
    pub fn attach(&self, store: &mut StateStore) -> Subscription {
        let view_tx = self.view_tx.clone();
        let updates_tx = self.updates_tx.clone();
        let mut last_no_receivers_log: Option<Instant> = None;
        store.subscribe(move |snapshot, issues| {
            let view = Arc::new(ClusterView::new(snapshot, issues, Utc::now()));
            view_tx.send_replace(view.clone());
            if updates_tx.send(view).is_err() {
                let should_log =
                    last_no_receivers_log.is_none_or(|t| t.elapsed() >= NO_RECEIVERS_LOG_INTERVAL);
                if should_log {
                    tracing::debug!(
                        operation = "broadcast_view",
                        "No active WebSocket clients; broadcast channel has no receivers"
                    );
                    last_no_receivers_log = Some(Instant::now());
                }
            }
        })
    }

    /// Status sink that logs and keeps the latest status for `/api/status`.
    pub fn status_sink(&self) -> PublishingStatus {
        PublishingStatus {
            tx: self.status_tx.clone(),
        }
    }

    pub fn feeds(&self) -> Feeds {
        Feeds {
            view: self.view_tx.subscribe(),
            updates: self.updates_tx.clone(),
            status: self.status_tx.subscribe(),
        }
    }
}

pub struct PublishingStatus {
    tx: watch::Sender<Option<Status>>,
}

impl StatusSink for PublishingStatus {
    fn report(&mut self, status: Status) {
        LogStatus.report(status.clone());
        self.tx.send_replace(Some(status));
    }
}
