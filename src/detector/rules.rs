// Rule keys: health-check names and issue kinds

use std::fmt;

use crate::models::Severity;

/// Health checks the collector knows about. Anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckName {
    Nodes,
    Cluster,
    ErrorPods,
    Volumes,
    Bundles,
    Machines,
    FreeSpace,
    Other(String),
}

impl CheckName {
    pub fn as_str(&self) -> &str {
        match self {
            CheckName::Nodes => "nodes",
            CheckName::Cluster => "cluster",
            CheckName::ErrorPods => "error_pods",
            CheckName::Volumes => "volumes",
            CheckName::Bundles => "bundles",
            CheckName::Machines => "machines",
            CheckName::FreeSpace => "free_space",
            CheckName::Other(s) => s,
        }
    }

    /// Severity of a failed check. Unrecognised checks are `medium`, never dropped.
    pub fn failure_severity(&self) -> Severity {
        match self {
            CheckName::Nodes | CheckName::Cluster => Severity::Critical,
            CheckName::ErrorPods | CheckName::Volumes => Severity::High,
            CheckName::Bundles | CheckName::Machines | CheckName::FreeSpace => Severity::Medium,
            CheckName::Other(_) => Severity::Medium,
        }
    }

    /// `error_pods` -> `Error Pods`.
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&str> for CheckName {
    fn from(s: &str) -> Self {
        match s {
            "nodes" => CheckName::Nodes,
            "cluster" => CheckName::Cluster,
            "error_pods" => CheckName::ErrorPods,
            "volumes" => CheckName::Volumes,
            "bundles" => CheckName::Bundles,
            "machines" => CheckName::Machines,
            "free_space" => CheckName::FreeSpace,
            other => CheckName::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CheckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an issue is about; selects the procedure tables and the `resourceType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Raw VM error; carries the collector's error type (`pvc`, `volume`, ...).
    VmError(String),
    VmPending,
    ReplicaFaulted,
    OrphanedReplicas,
    VmStuckTerminating,
    AttachmentTicketsUnsatisfied,
    AttachmentConditionFailed,
    NodeNotReady,
    /// Misconfigured PodDisruptionBudget reported by the node's PDB check.
    Pdb,
    DiskNotSchedulable,
    HealthCheck(CheckName),
}

impl IssueKind {
    pub fn resource_type(&self) -> &str {
        match self {
            IssueKind::VmError(kind) => kind,
            IssueKind::VmPending => "vm-pending",
            IssueKind::ReplicaFaulted => "replica-faulted",
            IssueKind::OrphanedReplicas => "orphaned-replicas",
            IssueKind::VmStuckTerminating => "vm-stuck-terminating",
            IssueKind::AttachmentTicketsUnsatisfied => "attachment-tickets-unsatisfied",
            IssueKind::AttachmentConditionFailed => "attachment-condition-failed",
            IssueKind::NodeNotReady => "node-not-ready",
            IssueKind::Pdb => "pdb",
            IssueKind::DiskNotSchedulable => "disk-not-schedulable",
            IssueKind::HealthCheck(_) => "health-check",
        }
    }
}
