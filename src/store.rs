// Single source of truth: latest snapshot + derived issues, synchronous fan-out

use chrono::{DateTime, Utc};

use crate::detector::detect_issues;
use crate::models::{ClusterSnapshot, Issue, SnapshotUpdate, VmError};

type Callback = Box<dyn FnMut(&ClusterSnapshot, &[Issue]) + Send>;

/// Handle returned by [`StateStore::subscribe`]; pass it back to stop notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use = "dropping the handle leaves the subscription registered"]
pub struct Subscription(u64);

impl Subscription {
    /// Remove this subscription from `store`. Returns false if it was already gone.
    pub fn dispose(self, store: &mut StateStore) -> bool {
        store.unsubscribe(self)
    }
}

/// A real VM error (not `info`/`information`) together with the VM it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct VmErrorRef<'a> {
    pub vm_name: &'a str,
    pub namespace: &'a str,
    pub error: &'a VmError,
}

/// Holds the merged cluster view and the issues derived from it.
///
/// Mutated only through [`StateStore::update`]; every update recomputes the
/// full issue list and notifies subscribers in subscription order before returning.
pub struct StateStore {
    snapshot: ClusterSnapshot,
    issues: Vec<Issue>,
    subscribers: Vec<(u64, Callback)>,
    next_id: u64,
    last_updated: Option<DateTime<Utc>>,
}

impl StateStore {
    pub fn create() -> Self {
        Self {
            snapshot: ClusterSnapshot::default(),
            issues: Vec::new(),
            subscribers: Vec::new(),
            next_id: 0,
            last_updated: None,
        }
    }

    /// Drop all subscribers and forget the current view.
    pub fn teardown(&mut self) {
        tracing::debug!(
            subscribers = self.subscribers.len(),
            "State store torn down"
        );
        self.subscribers.clear();
        self.snapshot = ClusterSnapshot::default();
        self.issues.clear();
        self.last_updated = None;
    }

    pub fn update(&mut self, update: SnapshotUpdate) {
        self.update_at(update, Utc::now());
    }

    /// [`update`](Self::update) with an explicit detection time.
    pub fn update_at(&mut self, update: SnapshotUpdate, now: DateTime<Utc>) {
        self.snapshot.merge(update);
        self.issues = detect_issues(&self.snapshot, now);
        self.last_updated = Some(now);
        tracing::debug!(
            operation = "update",
            nodes = self.snapshot.nodes.len(),
            vms = self.snapshot.vms.len(),
            issues = self.issues.len(),
            "Snapshot merged"
        );
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.snapshot, &self.issues);
        }
    }

    /// Register `callback` for future updates. It is not called with the current state.
    pub fn subscribe<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(&ClusterSnapshot, &[Issue]) + Send + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        Subscription(id)
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription.0);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn snapshot(&self) -> &ClusterSnapshot {
        &self.snapshot
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Issues whose severity is not `info`/`information`.
    pub fn real_issues(&self) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.is_real()).collect()
    }

    /// Number of entries in `errors` that are not `info`/`information`.
    pub fn count_real_issues(errors: &[VmError]) -> usize {
        errors.iter().filter(|e| !e.is_informational()).count()
    }

    /// Every real VM error across the snapshot, tagged with its VM.
    pub fn real_vm_errors(&self) -> Vec<VmErrorRef<'_>> {
        self.snapshot
            .vms
            .iter()
            .flat_map(|vm| {
                vm.errors
                    .iter()
                    .filter(|e| !e.is_informational())
                    .map(move |error| VmErrorRef {
                        vm_name: &vm.name,
                        namespace: &vm.namespace,
                        error,
                    })
            })
            .collect()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::create()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("nodes", &self.snapshot.nodes.len())
            .field("vms", &self.snapshot.vms.len())
            .field("issues", &self.issues.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
