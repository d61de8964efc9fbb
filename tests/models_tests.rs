// Wire model parsing tests: camelCase keys, nested storage metadata, lenient fields

use clusterwatch::models::*;

#[test]
fn test_node_parses_nested_storage_and_platform_info() {
    let json = r#"{
        "longhornInfo": {
            "name": "node-a",
            "conditions": [{"type": "Ready", "status": "True", "message": ""}],
            "disks": [{
                "name": "default-disk-1",
                "path": "/var/lib/harvester/defaultdisk",
                "isSchedulable": true,
                "storageAvailable": "100Gi",
                "scheduledReplicas": {"pvc-1-r-1": 1073741824}
            }]
        },
        "kubernetesInfo": {
            "name": "node-a",
            "roles": ["control-plane"],
            "internalIP": "10.0.0.5",
            "conditions": [{"type": "Ready", "status": "False", "message": "kubelet stopped"}]
        },
        "runningPods": 12
    }"#;
    let node: Node = serde_json::from_str(json).unwrap();
    assert_eq!(node.name, "");
    assert_eq!(node.display_name(), "node-a");
    assert_eq!(node.running_pods, 12);
    assert_eq!(node.primary_conditions().len(), 1);
    assert!(node.is_ready());
    let platform = node.platform.as_ref().unwrap();
    assert_eq!(platform.internal_ip, "10.0.0.5");
    assert_eq!(node.disks()[0].scheduled_replicas.get("pvc-1-r-1"), Some(&1073741824));
}

#[test]
fn test_node_without_ready_condition_is_not_ready() {
    let node: Node = serde_json::from_str(r#"{"name": "n1", "conditions": []}"#).unwrap();
    assert!(!node.is_ready());
    let node: Node = serde_json::from_str(
        r#"{"name": "n1", "conditions": [{"type": "Ready", "status": "Unknown", "message": ""}]}"#,
    )
    .unwrap();
    assert!(!node.is_ready());
}

#[test]
fn test_condition_status_keeps_unrecognized_values() {
    let c: Condition =
        serde_json::from_str(r#"{"type": "Ready", "status": "Maybe", "message": ""}"#).unwrap();
    assert_eq!(c.status, ConditionStatus::Other("Maybe".into()));
    assert!(!c.status.is_true());
    assert_eq!(serde_json::to_value(&c.status).unwrap(), "Maybe");
}

#[test]
fn test_vm_parses_camel_case_fields() {
    let json = r#"{
        "name": "web-1",
        "namespace": "prod",
        "printableStatus": "Pending",
        "claimNames": "web-1-disk",
        "volumeName": "pvc-abc",
        "errors": [{"severity": "high", "type": "pvc", "message": "unbound", "resource": "web-1-disk"}],
        "replicaInfo": [{"name": "r1", "currentState": "error", "started": true, "engineName": "e1"}],
        "engineInfo": [{"name": "e1", "active": true}],
        "removedPVCs": ["old-claim"],
        "somethingNew": 42
    }"#;
    let vm: Vm = serde_json::from_str(json).unwrap();
    assert_eq!(vm.qualified_name(), "prod/web-1");
    assert!(vm.has_claims());
    assert_eq!(vm.volume_or_name(), "pvc-abc");
    assert_eq!(vm.errors[0].severity, Some(Severity::High));
    assert_eq!(vm.errors[0].kind, "pvc");
    assert_eq!(vm.faulted_replicas().count(), 1);
    assert_eq!(vm.removed_pvcs, vec!["old-claim".to_string()]);
}

#[test]
fn test_vm_error_empty_severity_is_none() {
    let e: VmError =
        serde_json::from_str(r#"{"severity": "", "type": "volume", "message": "m", "resource": "r"}"#)
            .unwrap();
    assert_eq!(e.severity, None);
    assert!(!e.is_informational());

    let e: VmError = serde_json::from_str(r#"{"type": "volume", "message": "m"}"#).unwrap();
    assert_eq!(e.severity, None);
}

#[test]
fn test_severity_parsing_matches_exact_names() {
    assert_eq!(Severity::from("information"), Severity::Information);
    assert!(Severity::from("info").is_informational());
    assert_eq!(Severity::from("Info"), Severity::Other("Info".into()));
    assert!(!Severity::from("INFO").is_informational());
    assert_eq!(Severity::from("urgent"), Severity::Other("urgent".into()));
    assert!(!Severity::from("urgent").is_actionable());
}

#[test]
fn test_replica_not_started_counts_as_faulted() {
    let r: ReplicaInfo =
        serde_json::from_str(r#"{"name": "r", "currentState": "running", "started": false}"#)
            .unwrap();
    assert!(r.is_faulted());
    let r: ReplicaInfo =
        serde_json::from_str(r#"{"name": "r", "currentState": "running", "started": true}"#)
            .unwrap();
    assert!(!r.is_faulted());
}

#[test]
fn test_health_checks_accept_list_or_summary() {
    let list: HealthChecks = serde_json::from_str(
        r#"[{"checkName": "nodes", "status": "failed", "message": "1 node down"}]"#,
    )
    .unwrap();
    assert_eq!(list.results().len(), 1);
    assert!(list.results()[0].is_failed());

    let summary: HealthChecks = serde_json::from_str(
        r#"{"totalChecks": 2, "passedChecks": 1, "failedChecks": 1, "results": [
            {"checkName": "volumes", "status": "passed", "message": "ok"},
            {"checkName": "error_pods", "status": "failed", "error": "3 pods in error", "message": "see details"}
        ]}"#,
    )
    .unwrap();
    assert!(matches!(summary, HealthChecks::Summary(_)));
    assert_eq!(summary.results().len(), 2);
    assert_eq!(summary.results()[1].summary(), "3 pods in error");
}

#[test]
fn test_health_check_timestamp_is_lenient() {
    let ok: HealthCheckResult = serde_json::from_str(
        r#"{"checkName": "nodes", "status": "failed", "timestamp": "2024-05-01T10:00:00Z"}"#,
    )
    .unwrap();
    assert_eq!(
        ok.timestamp.map(|t| t.to_rfc3339()),
        Some("2024-05-01T10:00:00+00:00".to_string())
    );

    let bad: HealthCheckResult = serde_json::from_str(
        r#"{"checkName": "nodes", "status": "failed", "timestamp": "yesterday"}"#,
    )
    .unwrap();
    assert_eq!(bad.timestamp, None);
}

#[test]
fn test_snapshot_update_null_and_absent_keys_are_none() {
    let update: SnapshotUpdate =
        serde_json::from_str(r#"{"nodes": null, "vms": [], "unknownKey": true}"#).unwrap();
    assert_eq!(update.nodes, None);
    assert_eq!(update.vms, Some(vec![]));
    assert!(update.health_checks.is_none());
    assert!(!update.is_empty());
    assert!(SnapshotUpdate::default().is_empty());
}

#[test]
fn test_snapshot_update_then_prefers_later_keys() {
    let first = SnapshotUpdate {
        vms: Some(vec![Vm {
            name: "a".into(),
            ..Default::default()
        }]),
        upgrade_info: Some(UpgradeInfo {
            state: "Succeeded".into(),
            ..Default::default()
        }),
        ..Default::default()
    };
    let later = SnapshotUpdate {
        vms: Some(vec![]),
        ..Default::default()
    };
    let combined = first.then(later);
    assert_eq!(combined.vms, Some(vec![]));
    assert_eq!(combined.upgrade_info.unwrap().state, "Succeeded");
}

#[test]
fn test_issue_serializes_with_display_category() {
    let issue = Issue {
        id: "node-not-ready-n1".into(),
        title: "Node Not Ready".into(),
        severity: Severity::Critical,
        category: IssueCategory::NodeHealth,
        description: String::new(),
        affected_resource: "Node: n1".into(),
        resource_type: "node".into(),
        resource_name: "n1".into(),
        detection_time: chrono::DateTime::UNIX_EPOCH,
        verification_steps: vec![],
        remediation_steps: vec![],
        vm_name: None,
        vm_namespace: None,
        node_name: Some("n1".into()),
    };
    let json = serde_json::to_value(&issue).unwrap();
    assert_eq!(json["category"], "Node Health");
    assert_eq!(json["severity"], "critical");
    assert_eq!(json["resourceType"], "node");
    assert_eq!(json["nodeName"], "n1");
    assert!(issue.is_real());
}

#[test]
fn test_null_lists_and_maps_decode_as_empty() {
    let vm: Vm = serde_json::from_str(
        r#"{
        "name": "db",
        "errors": null,
        "replicaInfo": null,
        "engineInfo": null,
        "podInfo": null,
        "vmiInfo": [{"name": "db", "activePods": null}],
        "finalizers": null,
        "removedPVCs": null,
        "attachmentTicketsStatusRaw": {"t1": {"id": "t1", "satisfied": false, "conditions": null}},
        "attachmentTicketsSpecRaw": {"t1": {"id": "t1", "type": "csi-attacher", "nodeID": "n1", "parameters": null}}
    }"#,
    )
    .unwrap();
    assert!(vm.errors.is_empty());
    assert!(vm.replica_info.is_empty());
    assert!(vm.engine_info.is_empty());
    assert!(vm.pod_info.is_empty());
    assert!(vm.vmi_info[0].active_pods.is_empty());
    assert!(vm.finalizers.is_empty());
    assert!(vm.removed_pvcs.is_empty());
    let tickets = vm.attachment_tickets();
    assert_eq!(tickets.len(), 1);
    assert!(tickets[0].conditions().is_empty());
    assert_eq!(tickets[0].spec.map(|s| s.node_id.as_str()), Some("n1"));

    let vm: Vm = serde_json::from_str(
        r#"{"name": "db", "attachmentTicketsStatusRaw": null, "attachmentTicketsSpecRaw": null}"#,
    )
    .unwrap();
    assert!(vm.attachment_tickets().is_empty());

    let node: Node = serde_json::from_str(
        r#"{
        "name": "n1",
        "conditions": null,
        "longhornInfo": {"name": "n1", "conditions": null, "disks": [{"path": "/d", "scheduledReplicas": null}]},
        "kubernetesInfo": {"name": "n1", "roles": null, "conditions": null, "capacity": null, "allocatable": null},
        "pdbHealthStatus": {"hasIssues": true, "issues": [{"pdbName": "p", "staleEngines": null, "affectedVolumes": null}]}
    }"#,
    )
    .unwrap();
    assert!(node.conditions.is_empty());
    assert!(node.disks()[0].scheduled_replicas.is_empty());
    assert!(node.platform_conditions().is_empty());
    assert_eq!(node.pdb_issues().len(), 1);
    assert!(!node.is_ready());

    let node: Node =
        serde_json::from_str(r#"{"name": "n1", "longhornInfo": {"name": "n1", "disks": null}}"#)
            .unwrap();
    assert!(node.disks().is_empty());

    let summary: HealthChecks =
        serde_json::from_str(r#"{"totalChecks": 0, "results": null}"#).unwrap();
    assert!(summary.results().is_empty());
    let check: HealthCheckResult =
        serde_json::from_str(r#"{"checkName": "nodes", "status": "passed", "details": null}"#)
            .unwrap();
    assert!(check.details.is_empty());
    let upgrade: UpgradeInfo =
        serde_json::from_str(r#"{"state": "Succeeded", "nodeStatuses": null}"#).unwrap();
    assert!(upgrade.node_statuses.is_empty());

    let snapshot: ClusterSnapshot = serde_json::from_str(r#"{"nodes": null, "vms": null}"#).unwrap();
    assert!(snapshot.nodes.is_empty() && snapshot.vms.is_empty());
}
