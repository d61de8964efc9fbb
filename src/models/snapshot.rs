// Cluster snapshot and its partial-update form

use serde::{Deserialize, Serialize};

use super::{HealthChecks, Node, UpgradeInfo, Vm};

/// Latest known cluster view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSnapshot {
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub nodes: Vec<Node>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub vms: Vec<Vm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_checks: Option<HealthChecks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_info: Option<UpgradeInfo>,
}

/// Partial snapshot as pushed by the data source. Every key is optional;
/// absent (or `null`) keys leave the stored value alone. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vms: Option<Vec<Vm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_checks: Option<HealthChecks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_info: Option<UpgradeInfo>,
}

impl SnapshotUpdate {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_none()
            && self.vms.is_none()
            && self.health_checks.is_none()
            && self.upgrade_info.is_none()
    }

    /// Shallow combination: keys present in `later` win.
    pub fn then(self, later: SnapshotUpdate) -> SnapshotUpdate {
        SnapshotUpdate {
            nodes: later.nodes.or(self.nodes),
            vms: later.vms.or(self.vms),
            health_checks: later.health_checks.or(self.health_checks),
            upgrade_info: later.upgrade_info.or(self.upgrade_info),
        }
    }
}

impl ClusterSnapshot {
    /// Shallow merge: a key present in the update fully replaces the stored value.
    pub fn merge(&mut self, update: SnapshotUpdate) {
        if let Some(nodes) = update.nodes {
            self.nodes = nodes;
        }
        if let Some(vms) = update.vms {
            self.vms = vms;
        }
        if let Some(health_checks) = update.health_checks {
            self.health_checks = Some(health_checks);
        }
        if let Some(upgrade_info) = update.upgrade_info {
            self.upgrade_info = Some(upgrade_info);
        }
    }

    pub fn health_check_results(&self) -> &[super::HealthCheckResult] {
        self.health_checks
            .as_ref()
            .map(HealthChecks::results)
            .unwrap_or(&[])
    }
}

impl From<SnapshotUpdate> for ClusterSnapshot {
    fn from(update: SnapshotUpdate) -> Self {
        let mut snapshot = ClusterSnapshot::default();
        snapshot.merge(update);
        snapshot
    }
}
