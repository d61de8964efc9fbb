// Wire models (cluster snapshot) and derived issue records

mod health;
mod issue;
mod node;
mod severity;
mod snapshot;
mod vm;

use serde::{Deserialize, Deserializer};

pub use health::{HealthCheckResult, HealthCheckSummary, HealthChecks, UpgradeInfo};
pub use issue::{Issue, IssueCategory, ProcedureStep};
pub use node::{
    Condition, ConditionStatus, DiskInfo, Node, PdbHealthStatus, PdbIssue, PlatformNodeInfo,
    StorageNodeInfo,
};
pub use severity::Severity;
pub use snapshot::{ClusterSnapshot, SnapshotUpdate};
pub use vm::{
    AttachmentTicket, AttachmentTicketSpec, AttachmentTicketStatus, EngineInfo, PodInfo, ReplicaInfo,
    Vm, VmError, VmiInfo,
};

/// The collector marshals empty lists and maps as `null`; treat that like an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
