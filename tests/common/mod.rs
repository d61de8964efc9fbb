// Shared test helpers: snapshot builders

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use clusterwatch::models::*;

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn condition(kind: &str, status: &str) -> Condition {
    Condition {
        kind: kind.into(),
        status: ConditionStatus::from(status),
        ..Default::default()
    }
}

pub fn ready_node(name: &str) -> Node {
    Node {
        name: name.into(),
        conditions: vec![condition("Ready", "True")],
        ..Default::default()
    }
}

pub fn node_with_ready(name: &str, status: &str) -> Node {
    Node {
        name: name.into(),
        conditions: vec![condition("Ready", status)],
        ..Default::default()
    }
}

pub fn vm(name: &str, namespace: &str) -> Vm {
    Vm {
        name: name.into(),
        namespace: namespace.into(),
        printable_status: "Running".into(),
        ..Default::default()
    }
}

pub fn vm_error(severity: &str, kind: &str, message: &str) -> VmError {
    VmError {
        severity: if severity.is_empty() {
            None
        } else {
            Some(Severity::from(severity))
        },
        kind: kind.into(),
        message: message.into(),
        resource: format!("{kind}-resource"),
    }
}

pub fn replica(name: &str, state: &str, started: bool) -> ReplicaInfo {
    ReplicaInfo {
        name: name.into(),
        current_state: state.into(),
        started,
        ..Default::default()
    }
}

pub fn check(name: &str, status: &str, message: &str) -> HealthCheckResult {
    HealthCheckResult {
        check_name: name.into(),
        status: status.into(),
        message: Some(message.into()),
        ..Default::default()
    }
}

pub fn snapshot_of(nodes: Vec<Node>, vms: Vec<Vm>) -> ClusterSnapshot {
    ClusterSnapshot {
        nodes,
        vms,
        ..Default::default()
    }
}

pub fn nodes_update(nodes: Vec<Node>) -> SnapshotUpdate {
    SnapshotUpdate {
        nodes: Some(nodes),
        ..Default::default()
    }
}

pub fn vms_update(vms: Vec<Vm>) -> SnapshotUpdate {
    SnapshotUpdate {
        vms: Some(vms),
        ..Default::default()
    }
}
