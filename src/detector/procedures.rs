// Verification and remediation procedure tables

use super::rules::{CheckName, IssueKind};
use crate::models::ProcedureStep;

/// Step with `{placeholder}` slots filled in at detection time.
pub(crate) struct StepTemplate {
    id: &'static str,
    title: &'static str,
    command: &'static str,
    description: &'static str,
    expected_output: Option<&'static str>,
    warning: Option<&'static str>,
}

const fn step(
    id: &'static str,
    title: &'static str,
    command: &'static str,
    description: &'static str,
) -> StepTemplate {
    StepTemplate {
        id,
        title,
        command,
        description,
        expected_output: None,
        warning: None,
    }
}

impl StepTemplate {
    const fn with_output(mut self, expected_output: &'static str) -> Self {
        self.expected_output = Some(expected_output);
        self
    }

    const fn with_warning(mut self, warning: &'static str) -> Self {
        self.warning = Some(warning);
        self
    }

    fn render(&self, bindings: &[(&str, &str)]) -> ProcedureStep {
        let fill = |text: &str| {
            bindings.iter().fold(text.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{key}}}"), value)
            })
        };
        ProcedureStep {
            id: self.id.to_string(),
            title: self.title.to_string(),
            command: fill(self.command),
            description: fill(self.description),
            expected_output: self.expected_output.map(fill),
            warning: self.warning.map(fill),
        }
    }
}

const VM_PENDING_VERIFY: &[StepTemplate] = &[step(
    "check-vm-status",
    "Check VM Status",
    "kubectl get vm {resource} -n {namespace} -o yaml",
    "Check the VM status and any error conditions",
)
.with_output("VM should show current status and conditions")];

const VM_PENDING_REMEDIATE: &[StepTemplate] = &[step(
    "free-resources",
    "Free Up Resources",
    "kubectl delete vm <unused-vm-name> -n {namespace}",
    "Delete unused VMs to free up resources",
)
.with_warning("Ensure VM is not needed before deletion")];

const REPLICA_FAULTED_VERIFY: &[StepTemplate] = &[step(
    "check-volume-status",
    "Check Longhorn Volume Status",
    "kubectl get volumes.longhorn.io {resource} -n longhorn-system -o yaml",
    "Check the Longhorn volume state and replica count",
)
.with_output("Volume should show current state and replica information")];

const ORPHANED_REPLICAS_VERIFY: &[StepTemplate] = &[
    step(
        "check-volume-state",
        "Check Volume Status",
        "kubectl get volumes.longhorn.io {resource} -n longhorn-system -o jsonpath='{.status.state} {.status.robustness}'",
        "Verify volume is detached and showing robustness=unknown",
    )
    .with_output("detached unknown"),
    step(
        "list-existing-engines",
        "List Existing Engines",
        "kubectl get engines.longhorn.io -n longhorn-system -l longhornvolume={resource} -o jsonpath='{range .items[*]}{.metadata.name}{\" \"}{.status.currentReplicaAddressMap}{\"\\n\"}{end}'",
        "Find the actual engine that exists for this volume",
    )
    .with_output("Shows engine name (like {resource}-e-0) with empty or populated replica map"),
    step(
        "check-replica-engine-refs",
        "Check Replica Engine References",
        "kubectl get replicas.longhorn.io -n longhorn-system -l longhornvolume={resource} -o jsonpath='{range .items[*]}{.metadata.name}{\" -> \"}{.spec.engineName}{\" (\"}{.status.currentState}{\")\\n\"}{end}'",
        "See which engine names replicas are pointing to",
    )
    .with_output("Shows replicas pointing to missing engine ({engine})"),
    step(
        "check-vm-pod-error",
        "Check VM Pod Error Message",
        "kubectl describe pod -n {namespace} {pod} | grep -A 5 \"FailedAttachVolume\"",
        "See the actual attachment failure error",
    )
    .with_output("Shows \"no healthy or scheduled replica for starting\""),
];

const ORPHANED_REPLICAS_REMEDIATE: &[StepTemplate] = &[
    step(
        "identify-correct-engine",
        "Identify the Correct Engine Name",
        "# The correct engine name is shown in verification step 2 output",
        "From verification step 2, copy the actual engine name that exists (e.g., {resource}-e-0)",
    )
    .with_warning("Make note of this engine name - you will use it in the next steps"),
    step(
        "patch-orphaned-replicas",
        "Point Orphaned Replicas at the Existing Engine",
        "kubectl patch replica <REPLICA_NAME> -n longhorn-system --type merge -p '{\"spec\":{\"engineName\":\"<CORRECT_ENGINE_NAME>\"}}'",
        "Repeat for every replica that still references {engine}",
    )
    .with_warning("Replace <REPLICA_NAME> with each replica from verification step 3"),
    step(
        "verify-engine-recognizes-replicas",
        "Verify Engine Now Has Replicas",
        "kubectl get engine <CORRECT_ENGINE_NAME> -n longhorn-system -o jsonpath='{.status.currentReplicaAddressMap}' | jq .",
        "Check that the engine now shows replicas in its address map",
    )
    .with_output("Should show replica entries with IP addresses (not empty map {})"),
    step(
        "verify-vm-startup",
        "Verify VM Can Now Start",
        "kubectl get vm {vm} -n {namespace} -o jsonpath='{.status.printableStatus}'",
        "Check if VM successfully transitions from Scheduling to Running",
    )
    .with_output("Should show \"Running\" or progress from \"Scheduling\" to \"Starting\""),
];

const VM_STUCK_TERMINATING_VERIFY: &[StepTemplate] = &[
    step(
        "check-vm-yaml",
        "Get VM YAML to check volumes",
        "kubectl get vm {resource} -n {namespace} -o yaml | grep -A 5 \"volumes:\"",
        "Check which PVCs this VM references",
    ),
    step(
        "verify-vmi-pods",
        "Verify VMI and Pods are deleted",
        "kubectl get vmi,pod -n {namespace} | grep {resource}",
        "Confirm no active VMI or pods exist",
    ),
    step(
        "check-pvcs",
        "Verify PVCs from VM spec are deleted",
        "kubectl get pvc -n {namespace} | grep {claims}",
        "Check if PVCs referenced by the VM still exist",
    ),
];

const VM_STUCK_TERMINATING_REMEDIATE: &[StepTemplate] = &[step(
    "remove-finalizer",
    "Remove Finalizer (only if all resources gone)",
    "kubectl patch vm {resource} -n {namespace} --type json -p '[{\"op\": \"remove\", \"path\": \"/metadata/finalizers\"}]'",
    "Safe to remove only after confirming VMI, pods, and PVCs are deleted",
)
.with_warning("Removing finalizers while resources still exist can orphan volumes")];

const NODE_NOT_READY_VERIFY: &[StepTemplate] = &[step(
    "check-node-status",
    "Check Node Status",
    "kubectl get node {resource} -o wide",
    "Check basic node status and availability",
)
.with_output("Node should show Ready status")];

const NODE_NOT_READY_REMEDIATE: &[StepTemplate] = &[step(
    "restart-node-services",
    "Restart Node Services",
    "# SSH to {resource} and run: sudo systemctl restart rke2-server",
    "Restart RKE2 server service on the affected node",
)
.with_warning("This will temporarily disrupt workloads on the node")];

const DISK_NOT_SCHEDULABLE_VERIFY: &[StepTemplate] = &[step(
    "check-disk-conditions",
    "Check Disk Conditions",
    "kubectl get nodes.longhorn.io {node} -n longhorn-system -o jsonpath='{.status.diskStatus}' | jq .",
    "Inspect the scheduling condition reported for each disk",
)
.with_output("Schedulable condition with its reason for disk {resource}")];

const PVC_VERIFY: &[StepTemplate] = &[step(
    "check-pvc-status",
    "Check PVC Status",
    "kubectl get pvc {resource} -n {namespace} -o wide",
    "Confirm the claim exists and is bound",
)
.with_output("PVC should be Bound")];

const VOLUME_VERIFY: &[StepTemplate] = &[step(
    "check-volume-status",
    "Check Longhorn Volume Status",
    "kubectl get volumes.longhorn.io {resource} -n longhorn-system -o yaml",
    "Check the Longhorn volume state and robustness",
)
.with_output("Volume should be attached and healthy")];

const NODES_CHECK_VERIFY: &[StepTemplate] = &[
    step(
        "check-node-status",
        "Check Node Status",
        "kubectl get nodes -o wide",
        "Verify node readiness and scheduling status",
    )
    .with_output("All nodes should be Ready"),
    step(
        "check-upgrade-context",
        "Check for Active Upgrades",
        "kubectl get upgrades -n harvester-system",
        "Determine if cordoning is due to maintenance",
    )
    .with_output("Shows if upgrade is in progress"),
];

const NODES_CHECK_REMEDIATE: &[StepTemplate] = &[
    step(
        "check-upgrade-status",
        "Check Upgrade Progress",
        "kubectl get upgrades -n harvester-system -o wide",
        "Monitor upgrade progress before taking action",
    ),
    step(
        "wait-or-investigate",
        "Wait for Upgrade or Investigate",
        "kubectl get nodes -o wide",
        "If upgrade in progress: wait. If stuck >1hr: investigate",
    ),
    step(
        "uncordon-if-safe",
        "Uncordon Only If No Upgrade",
        "kubectl uncordon <node-name>",
        "Only if node is cordoned outside of upgrade operations",
    )
    .with_warning("Do not uncordon during active upgrades"),
];

const ERROR_PODS_CHECK_VERIFY: &[StepTemplate] = &[step(
    "check-pod-status",
    "Check Pod Status",
    "kubectl get pods --all-namespaces | grep -v Running | grep -v Completed",
    "Find pods that are not running or completed",
)
.with_output("No error pods should be listed")];

const ERROR_PODS_CHECK_REMEDIATE: &[StepTemplate] = &[step(
    "restart-pods",
    "Restart Failed Pods",
    "kubectl delete pod <pod-name> -n <namespace>",
    "Restart failed pods to recover",
)];

const ATTACHMENT_TICKETS_VERIFY: &[StepTemplate] = &[
    step(
        "check-attachment-tickets",
        "Check Attachment Ticket Status",
        "kubectl get volumeattachments.longhorn.io {resource} -n longhorn-system -o jsonpath='{.status.attachmentTicketStatuses}' | jq '.'",
        "Check which attachment tickets are unsatisfied",
    )
    .with_output("Shows ticket status with satisfied: true/false"),
    step(
        "check-csi-attachments",
        "Check CSI Volume Attachments",
        "kubectl get volumeattachment --all-namespaces | grep {resource}",
        "Verify CSI layer attachment status",
    )
    .with_output("Shows VolumeAttachment objects and their attached status"),
];

const ATTACHMENT_TICKETS_REMEDIATE: &[StepTemplate] = &[
    step(
        "check-longhorn-manager-logs",
        "Check Longhorn Manager Logs",
        "kubectl logs -n longhorn-system -l app=longhorn-manager --tail=100 | grep -i \"{resource}\\|attachment\"",
        "Look for attachment-related errors in Longhorn manager",
    ),
    step(
        "check-csi-attacher-logs",
        "Check CSI Attacher Logs",
        "kubectl logs -n longhorn-system -l app=longhorn-csi-plugin --tail=50 | grep -i \"{resource}\\|attach\"",
        "Check CSI plugin logs for attachment errors",
    ),
    step(
        "force-volume-detach-attach",
        "Force Volume Reattachment",
        "kubectl annotate volumeattachments.longhorn.io {resource} -n longhorn-system volume.longhorn.io/detach-manually=\"true\"",
        "Force detach and reattach the volume",
    )
    .with_warning("This may cause brief I/O interruption"),
];

const ATTACHMENT_CONDITION_VERIFY: &[StepTemplate] = &[
    step(
        "check-specific-condition",
        "Check Attachment Condition Details",
        "kubectl get volumeattachments.longhorn.io {resource} -n longhorn-system -o jsonpath='{.status.attachmentTicketStatuses}' | jq '.[] | select(.conditions[]?.status != \"True\")'",
        "Get detailed condition information",
    )
    .with_output("Shows failed conditions with reasons"),
    step(
        "check-kubelet-logs",
        "Check Recent Events",
        "kubectl get events --all-namespaces --sort-by='.lastTimestamp' | grep {resource}",
        "Check for related events",
    ),
];

const ATTACHMENT_CONDITION_REMEDIATE: &[StepTemplate] = &[step(
    "restart-csi-driver",
    "Restart CSI Driver on Node",
    "kubectl delete pods -n longhorn-system -l app=longhorn-csi-plugin --field-selector spec.nodeName=$(kubectl get vm {vm} -n {namespace} -o jsonpath='{.status.nodeName}')",
    "Restart the CSI driver pods on the VM's node",
)];

const PDB_VERIFY: &[StepTemplate] = &[
    step(
        "check-pdb-node-reference",
        "Check PDB Node Reference",
        "kubectl get pdb {resource} -n longhorn-system -o yaml | yq '.spec.selector.matchLabels.\"longhorn.io/node\"'",
        "Verify which node the PDB is protecting",
    )
    .with_output("Node name the PDB selects"),
    step(
        "check-instance-manager-location",
        "Check Instance Manager Location",
        "kubectl get instancemanager {resource} -n longhorn-system -o yaml | yq '.spec.nodeID'",
        "Verify which node the instance manager is running on",
    ),
    step(
        "check-claimed-engines",
        "Check Claimed Engines",
        "kubectl get instancemanager {resource} -n longhorn-system -o jsonpath='{.status.instanceEngines}' | jq 'keys[]'",
        "List engines the instance manager claims to manage",
    ),
    step(
        "verify-engine-existence",
        "Verify Engine Existence",
        "kubectl get engines.longhorn.io -n longhorn-system",
        "Check whether the claimed engines still exist",
    ),
    step(
        "check-volume-health",
        "Check Volume Health",
        "kubectl get volumes -n longhorn-system -o yaml | yq '.items[] | select(.status.state == \"attached\")| .status.robustness'",
        "Confirm attached volumes are healthy before touching the PDB",
    )
    .with_output("All outputs should be \"healthy\""),
];

const PDB_REMEDIATE: &[StepTemplate] = &[
    step(
        "backup-pdb-config",
        "Backup PDB Configuration",
        "kubectl get pdb {resource} -n longhorn-system -o yaml > pdb-{resource}-backup.yaml",
        "Save the current PDB before deleting it",
    )
    .with_warning("Keep this backup in case rollback is needed"),
    step(
        "delete-problematic-pdb",
        "Delete Problematic PDB",
        "kubectl delete pdb {resource} -n longhorn-system",
        "Longhorn recreates the PDB with the correct node reference",
    )
    .with_warning("Only run this if volume health verification passed"),
    step(
        "verify-pdb-recreation",
        "Verify PDB Recreation",
        "kubectl get pdb -n longhorn-system | grep {pdb_prefix}",
        "Check that Longhorn recreated the PDB",
    )
    .with_output("Should show new PDB with same name pattern within 30 seconds"),
    step(
        "confirm-node-draining",
        "Confirm Node Can Drain",
        "kubectl drain {node} --dry-run=client --ignore-daemonsets",
        "Check that the node can now be drained",
    )
    .with_warning("Only run if this issue was blocking an upgrade"),
];

fn verification_table(kind: &IssueKind) -> &'static [StepTemplate] {
    match kind {
        IssueKind::VmPending => VM_PENDING_VERIFY,
        IssueKind::ReplicaFaulted => REPLICA_FAULTED_VERIFY,
        IssueKind::OrphanedReplicas => ORPHANED_REPLICAS_VERIFY,
        IssueKind::VmStuckTerminating => VM_STUCK_TERMINATING_VERIFY,
        IssueKind::AttachmentTicketsUnsatisfied => ATTACHMENT_TICKETS_VERIFY,
        IssueKind::AttachmentConditionFailed => ATTACHMENT_CONDITION_VERIFY,
        IssueKind::NodeNotReady => NODE_NOT_READY_VERIFY,
        IssueKind::Pdb => PDB_VERIFY,
        IssueKind::DiskNotSchedulable => DISK_NOT_SCHEDULABLE_VERIFY,
        IssueKind::VmError(kind) => match kind.as_str() {
            "pvc" => PVC_VERIFY,
            "volume" => VOLUME_VERIFY,
            _ => &[],
        },
        IssueKind::HealthCheck(CheckName::Nodes) => NODES_CHECK_VERIFY,
        IssueKind::HealthCheck(CheckName::ErrorPods) => ERROR_PODS_CHECK_VERIFY,
        IssueKind::HealthCheck(_) => &[],
    }
}

fn remediation_table(kind: &IssueKind) -> &'static [StepTemplate] {
    match kind {
        IssueKind::VmPending => VM_PENDING_REMEDIATE,
        IssueKind::OrphanedReplicas => ORPHANED_REPLICAS_REMEDIATE,
        IssueKind::VmStuckTerminating => VM_STUCK_TERMINATING_REMEDIATE,
        IssueKind::AttachmentTicketsUnsatisfied => ATTACHMENT_TICKETS_REMEDIATE,
        IssueKind::AttachmentConditionFailed => ATTACHMENT_CONDITION_REMEDIATE,
        IssueKind::NodeNotReady => NODE_NOT_READY_REMEDIATE,
        IssueKind::Pdb => PDB_REMEDIATE,
        IssueKind::HealthCheck(CheckName::Nodes) => NODES_CHECK_REMEDIATE,
        IssueKind::HealthCheck(CheckName::ErrorPods) => ERROR_PODS_CHECK_REMEDIATE,
        IssueKind::ReplicaFaulted
        | IssueKind::DiskNotSchedulable
        | IssueKind::VmError(_)
        | IssueKind::HealthCheck(_) => &[],
    }
}

/// Verification steps for `kind`; empty when the table has no entry.
pub fn verification_steps(kind: &IssueKind, bindings: &[(&str, &str)]) -> Vec<ProcedureStep> {
    verification_table(kind)
        .iter()
        .map(|t| t.render(bindings))
        .collect()
}

/// Remediation steps for `kind`; empty when the table has no entry.
pub fn remediation_steps(kind: &IssueKind, bindings: &[(&str, &str)]) -> Vec<ProcedureStep> {
    remediation_table(kind)
        .iter()
        .map(|t| t.render(bindings))
        .collect()
}
