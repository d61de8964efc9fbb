// Virtual machine models and their storage/runtime descriptors

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{Condition, Severity};

/// Error attached to a VM by the upstream collector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmError {
    #[serde(default, deserialize_with = "non_empty_severity")]
    pub severity: Option<Severity>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub resource: String,
}

/// An empty severity string is the same as no severity at all.
fn non_empty_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()).map(|s| Severity::from(s.as_str())))
}

impl VmError {
    pub fn is_informational(&self) -> bool {
        self.severity
            .as_ref()
            .is_some_and(Severity::is_informational)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaInfo {
    pub name: String,
    pub node_id: String,
    pub active: bool,
    pub engine_name: String,
    pub current_state: String,
    pub started: bool,
    pub data_engine: String,
    pub disk_id: String,
    pub instance_manager: String,
    #[serde(rename = "storageIP")]
    pub storage_ip: String,
    pub port: String,
    pub ip: String,
}

impl ReplicaInfo {
    pub fn is_faulted(&self) -> bool {
        self.current_state == "error" || !self.started
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineInfo {
    pub name: String,
    pub active: bool,
    pub current_state: String,
    pub started: bool,
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodInfo {
    pub name: String,
    pub vmi: String,
    pub node_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmiInfo {
    pub name: String,
    pub node_name: String,
    pub phase: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub active_pods: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Vm {
    pub name: String,
    pub namespace: String,
    pub printable_status: String,
    pub vm_status_reason: String,
    pub claim_names: String,
    pub volume_name: String,
    pub pod_name: String,
    pub storage_class: String,
    pub image_id: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub errors: Vec<VmError>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub replica_info: Vec<ReplicaInfo>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub engine_info: Vec<EngineInfo>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub pod_info: Vec<PodInfo>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub vmi_info: Vec<VmiInfo>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub finalizers: Vec<String>,
    #[serde(rename = "removedPVCs", deserialize_with = "super::null_as_default")]
    pub removed_pvcs: Vec<String>,
    /// Volume attachment ticket status, keyed by ticket id.
    #[serde(
        rename = "attachmentTicketsStatusRaw",
        deserialize_with = "super::null_as_default"
    )]
    pub attachment_ticket_statuses: BTreeMap<String, AttachmentTicketStatus>,
    /// Volume attachment ticket spec (requester type, target node), keyed by ticket id.
    #[serde(
        rename = "attachmentTicketsSpecRaw",
        deserialize_with = "super::null_as_default"
    )]
    pub attachment_ticket_specs: BTreeMap<String, AttachmentTicketSpec>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentTicketStatus {
    pub id: String,
    pub satisfied: bool,
    #[serde(deserialize_with = "super::null_as_default")]
    pub conditions: Vec<Condition>,
    pub generation: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttachmentTicketSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "nodeID")]
    pub node_id: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub parameters: BTreeMap<String, String>,
    pub generation: i64,
}

/// Status and spec halves of one attachment ticket, joined by ticket id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachmentTicket<'a> {
    pub id: &'a str,
    pub status: Option<&'a AttachmentTicketStatus>,
    pub spec: Option<&'a AttachmentTicketSpec>,
}

impl AttachmentTicket<'_> {
    /// A ticket known only from its spec has not been satisfied yet.
    pub fn is_satisfied(&self) -> bool {
        self.status.is_some_and(|s| s.satisfied)
    }

    pub fn conditions(&self) -> &[Condition] {
        self.status.map(|s| s.conditions.as_slice()).unwrap_or(&[])
    }
}

impl Vm {
    /// `namespace/name`, the way operators address a VM.
    pub fn qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    pub fn has_claims(&self) -> bool {
        !self.claim_names.is_empty()
    }

    /// Volume the VM's replicas belong to, falling back to the VM name.
    pub fn volume_or_name(&self) -> &str {
        if self.volume_name.is_empty() {
            &self.name
        } else {
            &self.volume_name
        }
    }

    /// Every attachment ticket seen in either status or spec, ordered by id.
    pub fn attachment_tickets(&self) -> Vec<AttachmentTicket<'_>> {
        let ids: BTreeSet<&str> = self
            .attachment_ticket_statuses
            .keys()
            .chain(self.attachment_ticket_specs.keys())
            .map(String::as_str)
            .collect();
        ids.into_iter()
            .map(|id| AttachmentTicket {
                id,
                status: self.attachment_ticket_statuses.get(id),
                spec: self.attachment_ticket_specs.get(id),
            })
            .collect()
    }

    pub fn faulted_replicas(&self) -> impl Iterator<Item = &ReplicaInfo> {
        self.replica_info.iter().filter(|r| r.is_faulted())
    }
}
