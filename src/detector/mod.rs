// Rule-based issue detection over a cluster snapshot

mod procedures;
mod rules;

pub use procedures::{remediation_steps, verification_steps};
pub use rules::{CheckName, IssueKind};

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::models::{
    ClusterSnapshot, Condition, HealthCheckResult, Issue, IssueCategory, Node, Severity,
    UpgradeInfo, Vm,
};

/// Failing attachment conditions younger than this are still settling.
const ATTACHMENT_CONDITION_GRACE_MINUTES: i64 = 2;

/// Fields of an issue before timestamps and procedures are attached.
struct Draft {
    id: String,
    kind: IssueKind,
    title: String,
    severity: Severity,
    category: IssueCategory,
    description: String,
    affected_resource: String,
    resource_name: String,
    vm: Option<(String, String)>,
    node_name: Option<String>,
    bindings: Vec<(&'static str, String)>,
}

impl Draft {
    fn finish(self, detected_at: DateTime<Utc>) -> Issue {
        let mut bindings: Vec<(&str, &str)> = vec![("resource", self.resource_name.as_str())];
        bindings.extend(self.bindings.iter().map(|(k, v)| (*k, v.as_str())));
        let verification_steps = verification_steps(&self.kind, &bindings);
        let remediation_steps = remediation_steps(&self.kind, &bindings);
        let (vm_name, vm_namespace) = match self.vm {
            Some((name, namespace)) => (Some(name), Some(namespace)),
            None => (None, None),
        };
        Issue {
            id: self.id,
            title: self.title,
            severity: self.severity,
            category: self.category,
            description: self.description,
            affected_resource: self.affected_resource,
            resource_type: self.kind.resource_type().to_string(),
            resource_name: self.resource_name,
            detection_time: detected_at,
            verification_steps,
            remediation_steps,
            vm_name,
            vm_namespace,
            node_name: self.node_name,
        }
    }
}

/// Derive the full issue list for `snapshot`.
///
/// `detected_at` stamps every issue except health-check failures, which keep
/// the timestamp the check itself reported. Same input, same output.
pub fn detect_issues(snapshot: &ClusterSnapshot, detected_at: DateTime<Utc>) -> Vec<Issue> {
    let mut issues = Vec::new();

    for vm in &snapshot.vms {
        issues.extend(
            vm_issues(vm, snapshot.upgrade_info.as_ref(), detected_at)
                .into_iter()
                .map(|d| d.finish(detected_at)),
        );
    }
    for node in &snapshot.nodes {
        issues.extend(node_issues(node).into_iter().map(|d| d.finish(detected_at)));
    }
    for check in snapshot.health_check_results() {
        if let Some(draft) = health_check_issue(check) {
            issues.push(draft.finish(check.timestamp.unwrap_or(detected_at)));
        }
    }

    issues
}

fn vm_issues(vm: &Vm, upgrade: Option<&UpgradeInfo>, now: DateTime<Utc>) -> Vec<Draft> {
    let mut out = Vec::new();
    let qualified = vm.qualified_name();
    let vm_ref = || Some((vm.name.clone(), vm.namespace.clone()));
    let base_bindings = || {
        vec![
            ("namespace", vm.namespace.clone()),
            ("vm", vm.name.clone()),
        ]
    };

    for error in vm.errors.iter().filter(|e| !e.is_informational()) {
        let severity = match &error.severity {
            Some(s) if s.is_actionable() => s.clone(),
            _ => Severity::Warning,
        };
        out.push(Draft {
            id: format!("vm-error-{}-{}-{}", vm.namespace, vm.name, error.kind),
            kind: IssueKind::VmError(error.kind.clone()),
            title: format!("{} Issue", error.kind.to_uppercase()),
            severity,
            category: IssueCategory::VmResource,
            description: error.message.clone(),
            affected_resource: format!("VM: {qualified}"),
            resource_name: error.resource.clone(),
            vm: vm_ref(),
            node_name: None,
            bindings: base_bindings(),
        });
    }

    if vm.printable_status == "Pending" && vm.has_claims() {
        out.push(Draft {
            id: format!("vm-pending-{}-{}", vm.namespace, vm.name),
            kind: IssueKind::VmPending,
            title: "VM Stuck in Pending State".to_string(),
            severity: Severity::High,
            category: IssueCategory::Scheduling,
            description: format!(
                "VM {qualified} is stuck in Pending state, likely due to scheduling or storage issues."
            ),
            affected_resource: format!("VM: {qualified}"),
            resource_name: vm.name.clone(),
            vm: vm_ref(),
            node_name: None,
            bindings: base_bindings(),
        });
    }

    let total = vm.replica_info.len();
    let faulted = vm.faulted_replicas().count();
    if faulted > 0 {
        let severity = if faulted == total {
            Severity::Critical
        } else {
            Severity::High
        };
        let volume = vm.volume_or_name();
        out.push(Draft {
            id: format!("replica-issues-{}-{}", vm.namespace, vm.name),
            kind: IssueKind::ReplicaFaulted,
            title: "Storage Replica Issues".to_string(),
            severity,
            category: IssueCategory::Storage,
            description: format!(
                "{faulted} out of {total} replicas are faulted for volume {volume}."
            ),
            affected_resource: format!("Volume: {volume} (VM: {qualified})"),
            resource_name: volume.to_string(),
            vm: vm_ref(),
            node_name: None,
            bindings: base_bindings(),
        });
    }

    if let Some(draft) = orphaned_replicas(vm) {
        out.push(draft);
    }
    if let Some(draft) = stuck_terminating(vm, upgrade) {
        out.push(draft);
    }
    out.extend(attachment_ticket_issues(vm, now));

    out
}

/// Replicas that reference an engine which no longer exists keep the VM from starting.
fn orphaned_replicas(vm: &Vm) -> Option<Draft> {
    if vm.engine_info.is_empty() {
        return None;
    }
    let existing: BTreeSet<&str> = vm.engine_info.iter().map(|e| e.name.as_str()).collect();
    let orphaned: Vec<_> = vm
        .replica_info
        .iter()
        .filter(|r| !r.engine_name.is_empty() && !existing.contains(r.engine_name.as_str()))
        .collect();
    if orphaned.is_empty() {
        return None;
    }

    let mut missing: Vec<&str> = Vec::new();
    for replica in &orphaned {
        if !missing.contains(&replica.engine_name.as_str()) {
            missing.push(&replica.engine_name);
        }
    }
    let volume = vm.volume_or_name();
    let qualified = vm.qualified_name();
    let pod = if vm.pod_name.is_empty() {
        format!("virt-launcher-{}", vm.name)
    } else {
        vm.pod_name.clone()
    };

    Some(Draft {
        id: format!("orphaned-replicas-{}-{}", vm.namespace, vm.name),
        kind: IssueKind::OrphanedReplicas,
        title: "Orphaned Replicas - Engine Mismatch".to_string(),
        severity: Severity::Critical,
        category: IssueCategory::Storage,
        description: format!(
            "{} replicas point to deleted engine(s): {}. This prevents VM startup.",
            orphaned.len(),
            missing.join(", ")
        ),
        affected_resource: format!("Volume: {volume} (VM: {qualified})"),
        resource_name: volume.to_string(),
        vm: Some((vm.name.clone(), vm.namespace.clone())),
        node_name: None,
        bindings: vec![
            ("namespace", vm.namespace.clone()),
            ("vm", vm.name.clone()),
            ("pod", pod),
            ("engine", missing.first().copied().unwrap_or_default().to_string()),
        ],
    })
}

/// Terminating VM with no runtime left, held only by finalizers.
fn stuck_terminating(vm: &Vm, upgrade: Option<&UpgradeInfo>) -> Option<Draft> {
    if vm.printable_status != "Terminating"
        || !vm.vmi_info.is_empty()
        || !vm.pod_info.is_empty()
        || vm.finalizers.is_empty()
    {
        return None;
    }
    let upgrading = upgrade.is_some_and(UpgradeInfo::is_in_progress);
    let severity = if upgrading {
        Severity::High
    } else {
        Severity::Medium
    };
    let cause = if vm.removed_pvcs.is_empty() {
        "Finalizers are preventing deletion."
    } else {
        "PVCs were already removed but finalizers remain."
    };
    let upgrade_note = if upgrading {
        " This may block the cluster upgrade process."
    } else {
        ""
    };
    let qualified = vm.qualified_name();
    let claims = if vm.claim_names.is_empty() {
        "disk".to_string()
    } else {
        vm.claim_names.clone()
    };

    Some(Draft {
        id: format!("vm-stuck-terminating-{}-{}", vm.namespace, vm.name),
        kind: IssueKind::VmStuckTerminating,
        title: "VM Stuck in Terminating State".to_string(),
        severity,
        category: IssueCategory::VmLifecycle,
        description: format!(
            "VM {qualified} is stuck terminating with no VMI or pods. {cause} Blocking finalizers: {}{upgrade_note}",
            vm.finalizers.join(", ")
        ),
        affected_resource: format!("VM: {qualified}"),
        resource_name: vm.name.clone(),
        vm: Some((vm.name.clone(), vm.namespace.clone())),
        node_name: None,
        bindings: vec![
            ("namespace", vm.namespace.clone()),
            ("vm", vm.name.clone()),
            ("claims", claims),
        ],
    })
}

fn attachment_ticket_issues(vm: &Vm, now: DateTime<Utc>) -> Vec<Draft> {
    let tickets = vm.attachment_tickets();
    if tickets.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let volume = vm.volume_or_name();
    let vm_ref = || Some((vm.name.clone(), vm.namespace.clone()));
    let bindings = || {
        vec![
            ("namespace", vm.namespace.clone()),
            ("vm", vm.name.clone()),
        ]
    };

    let unsatisfied = tickets.iter().filter(|t| !t.is_satisfied()).count();
    if unsatisfied > 0 {
        out.push(Draft {
            id: format!("unsatisfied-attachment-tickets-{}-{}", vm.namespace, vm.name),
            kind: IssueKind::AttachmentTicketsUnsatisfied,
            title: "Volume Attachment Not Satisfied".to_string(),
            severity: Severity::Critical,
            category: IssueCategory::VolumeAttachment,
            description: format!(
                "Volume {volume} has {unsatisfied} unsatisfied attachment tickets. Volume may not be accessible to the VM."
            ),
            affected_resource: format!("Volume: {volume}"),
            resource_name: volume.to_string(),
            vm: vm_ref(),
            node_name: None,
            bindings: bindings(),
        });
    }

    let cutoff = now - TimeDelta::minutes(ATTACHMENT_CONDITION_GRACE_MINUTES);
    for ticket in &tickets {
        let failing = ticket
            .conditions()
            .iter()
            .filter(|c| !c.status.is_true() && failing_since_before(c, cutoff));
        for condition in failing {
            out.push(Draft {
                id: format!(
                    "attachment-condition-failed-{}-{}-{}-{}",
                    vm.namespace, vm.name, ticket.id, condition.kind
                ),
                kind: IssueKind::AttachmentConditionFailed,
                title: format!("Attachment Condition Failed: {}", condition.kind),
                severity: Severity::Medium,
                category: IssueCategory::VolumeAttachment,
                description: format!(
                    "Volume attachment condition \"{}\" is failing for {volume}. Status: {}",
                    condition.kind,
                    condition.status.as_str()
                ),
                affected_resource: format!("Volume: {volume}"),
                resource_name: volume.to_string(),
                vm: vm_ref(),
                node_name: None,
                bindings: bindings(),
            });
        }
    }

    out
}

/// Unparseable or missing transition times never count as stale.
fn failing_since_before(condition: &Condition, cutoff: DateTime<Utc>) -> bool {
    condition
        .last_transition_time
        .as_deref()
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .is_some_and(|t| t.with_timezone(&Utc) < cutoff)
}

fn node_issues(node: &Node) -> Vec<Draft> {
    let mut out = Vec::new();
    let name = node.display_name().to_string();

    if !node.is_ready() {
        out.push(Draft {
            id: format!("node-not-ready-{name}"),
            kind: IssueKind::NodeNotReady,
            title: "Node Not Ready".to_string(),
            severity: Severity::Critical,
            category: IssueCategory::NodeHealth,
            description: format!(
                "Node {name} is not in Ready state. This affects VM scheduling and storage operations."
            ),
            affected_resource: format!("Node: {name}"),
            resource_name: name.clone(),
            vm: None,
            node_name: Some(name.clone()),
            bindings: vec![("node", name.clone())],
        });
    }

    if let Some(health) = &node.pdb_health_status {
        let severity = match Severity::from(health.severity.as_str()) {
            s if s.is_actionable() => s,
            _ => Severity::Warning,
        };
        for pdb in node.pdb_issues() {
            let prefix = pdb.pdb_name.splitn(4, '-').take(3).collect::<Vec<_>>().join("-");
            out.push(Draft {
                id: format!("pdb-{}-{name}-{}", pdb.issue_type, pdb.pdb_name),
                kind: IssueKind::Pdb,
                title: format!("PDB {}", pdb.issue_type.replace('_', " ")),
                severity: severity.clone(),
                category: IssueCategory::PodDisruptionBudget,
                description: pdb.description.clone(),
                affected_resource: format!("PDB: {}", pdb.pdb_name),
                resource_name: pdb.pdb_name.clone(),
                vm: None,
                node_name: Some(name.clone()),
                bindings: vec![("node", name.clone()), ("pdb_prefix", prefix)],
            });
        }
    }

    for disk in node.disks().iter().filter(|d| !d.is_schedulable) {
        let disk_name = disk_display_name(&disk.path);
        out.push(Draft {
            id: format!("disk-not-schedulable-{name}-{disk_name}"),
            kind: IssueKind::DiskNotSchedulable,
            title: "Disk Not Schedulable".to_string(),
            severity: Severity::Warning,
            category: IssueCategory::StorageHealth,
            description: format!(
                "Disk {disk_name} on node {name} is not schedulable. This reduces storage capacity and may affect VM scheduling."
            ),
            affected_resource: format!("Node: {name}, Disk: {disk_name}"),
            resource_name: disk_name.clone(),
            vm: None,
            node_name: Some(name.clone()),
            bindings: vec![("node", name.clone())],
        });
    }

    out
}

/// Short disk label: `defaultdisk`, or the last path segment (long ids elided in the middle).
pub fn disk_display_name(path: &str) -> String {
    if path.is_empty() {
        return "Unknown".to_string();
    }
    if path.contains("/defaultdisk") {
        return "defaultdisk".to_string();
    }
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() {
        return "Unknown".to_string();
    }
    if path.contains("/extra-disks/") && last.chars().count() > 16 {
        let chars: Vec<char> = last.chars().collect();
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 8..].iter().collect();
        return format!("{head}...{tail}");
    }
    last.to_string()
}

fn health_check_issue(check: &HealthCheckResult) -> Option<Draft> {
    if !check.is_failed() {
        return None;
    }
    let name = CheckName::from(check.check_name.as_str());
    Some(Draft {
        id: format!("health-{}", check.check_name),
        title: format!("Health Check Failed: {}", name.display_name()),
        severity: name.failure_severity(),
        category: IssueCategory::ClusterHealth,
        description: check.summary().to_string(),
        affected_resource: format!("Health Check: {}", check.check_name),
        resource_name: check.check_name.clone(),
        vm: None,
        node_name: None,
        bindings: Vec::new(),
        kind: IssueKind::HealthCheck(name),
    })
}
