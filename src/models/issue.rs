// Derived issue records with verification/remediation procedures

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCategory {
    #[serde(rename = "VM Resource")]
    VmResource,
    #[serde(rename = "Scheduling")]
    Scheduling,
    #[serde(rename = "Storage")]
    Storage,
    #[serde(rename = "VM Lifecycle")]
    VmLifecycle,
    #[serde(rename = "Node Health")]
    NodeHealth,
    #[serde(rename = "Storage Health")]
    StorageHealth,
    #[serde(rename = "Cluster Health")]
    ClusterHealth,
    #[serde(rename = "Volume Attachment")]
    VolumeAttachment,
    #[serde(rename = "Pod Disruption Budget")]
    PodDisruptionBudget,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::VmResource => "VM Resource",
            IssueCategory::Scheduling => "Scheduling",
            IssueCategory::Storage => "Storage",
            IssueCategory::VmLifecycle => "VM Lifecycle",
            IssueCategory::NodeHealth => "Node Health",
            IssueCategory::StorageHealth => "Storage Health",
            IssueCategory::ClusterHealth => "Cluster Health",
            IssueCategory::VolumeAttachment => "Volume Attachment",
            IssueCategory::PodDisruptionBudget => "Pod Disruption Budget",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a verification or remediation procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureStep {
    pub id: String,
    pub title: String,
    pub command: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Stable across detection runs on unchanged input.
    pub id: String,
    pub title: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub description: String,
    pub affected_resource: String,
    pub resource_type: String,
    pub resource_name: String,
    pub detection_time: DateTime<Utc>,
    pub verification_steps: Vec<ProcedureStep>,
    pub remediation_steps: Vec<ProcedureStep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

impl Issue {
    pub fn is_real(&self) -> bool {
        !self.severity.is_informational()
    }
}
