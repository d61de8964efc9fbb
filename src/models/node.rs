// Node models (platform + storage metadata)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Condition status as reported by the cluster. Only an exact `True` means "ok".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
    Other(String),
}

impl ConditionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
            ConditionStatus::Other(s) => s,
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, ConditionStatus::True)
    }
}

impl From<&str> for ConditionStatus {
    fn from(s: &str) -> Self {
        match s {
            "True" => ConditionStatus::True,
            "False" => ConditionStatus::False,
            "Unknown" => ConditionStatus::Unknown,
            other => ConditionStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for ConditionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConditionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ConditionStatus::from(s.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: ConditionStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Storage disk as reported by the storage subsystem.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiskInfo {
    pub name: String,
    pub path: String,
    pub is_schedulable: bool,
    pub storage_available: String,
    pub storage_maximum: String,
    pub storage_scheduled: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub scheduled_replicas: BTreeMap<String, i64>,
}

/// Storage-subsystem view of a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageNodeInfo {
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub conditions: Vec<Condition>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub disks: Vec<DiskInfo>,
}

/// Platform (kubernetes) view of a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformNodeInfo {
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub roles: Vec<String>,
    #[serde(rename = "internalIP")]
    pub internal_ip: String,
    pub hostname: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub conditions: Vec<Condition>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub capacity: BTreeMap<String, String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub allocatable: BTreeMap<String, String>,
}

/// One misconfigured PodDisruptionBudget found by the collector's PDB check.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdbIssue {
    pub pdb_name: String,
    /// `stale_pdb`, `node_mismatch`, `stale_engine_references`, ...
    pub issue_type: String,
    pub description: String,
    pub expected_node: String,
    pub actual_node: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub stale_engines: Vec<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub affected_volumes: Vec<String>,
    pub resolution: String,
    pub safety_check: bool,
}

/// Per-node PDB check result. `severity` applies to every listed issue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PdbHealthStatus {
    pub node_name: String,
    pub has_issues: bool,
    pub issue_count: u32,
    #[serde(deserialize_with = "super::null_as_default")]
    pub issues: Vec<PdbIssue>,
    pub severity: String,
    pub can_safely_delete: bool,
    pub last_checked: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub conditions: Vec<Condition>,
    #[serde(default, rename = "longhornInfo", skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageNodeInfo>,
    #[serde(default, rename = "kubernetesInfo", skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformNodeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdb_health_status: Option<PdbHealthStatus>,
    #[serde(default)]
    pub running_pods: u32,
}

impl Node {
    /// Node identity; the producer may only fill it inside the storage metadata.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match &self.storage {
            Some(s) if !s.name.is_empty() => &s.name,
            _ => "unknown",
        }
    }

    /// Primary conditions: flat list first, storage metadata as fallback.
    pub fn primary_conditions(&self) -> &[Condition] {
        if !self.conditions.is_empty() {
            return &self.conditions;
        }
        self.storage
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or(&[])
    }

    pub fn platform_conditions(&self) -> &[Condition] {
        self.platform
            .as_ref()
            .map(|p| p.conditions.as_slice())
            .unwrap_or(&[])
    }

    /// Ready only when a `Ready` condition reports exactly `True`.
    /// A missing `Ready` condition counts as not ready.
    pub fn is_ready(&self) -> bool {
        let ready = |conds: &[Condition]| {
            conds
                .iter()
                .find(|c| c.kind == "Ready")
                .is_some_and(|c| c.status.is_true())
        };
        ready(self.primary_conditions()) || ready(self.platform_conditions())
    }

    /// PDB issues, only when the check flagged the node.
    pub fn pdb_issues(&self) -> &[PdbIssue] {
        match &self.pdb_health_status {
            Some(status) if status.has_issues => &status.issues,
            _ => &[],
        }
    }

    pub fn disks(&self) -> &[DiskInfo] {
        self.storage
            .as_ref()
            .map(|s| s.disks.as_slice())
            .unwrap_or(&[])
    }
}
