// State store: shallow merge, issue recomputation, subscriber fan-out

mod common;

use std::sync::{Arc, Mutex};

use clusterwatch::models::*;
use clusterwatch::store::StateStore;
use common::*;

#[test]
fn test_new_store_is_empty() {
    let store = StateStore::create();
    assert_eq!(store.snapshot(), &ClusterSnapshot::default());
    assert!(store.issues().is_empty());
    assert!(store.last_updated().is_none());
}

#[test]
fn test_two_updates_merge_and_yield_two_critical_issues() {
    let mut store = StateStore::create();
    let first: SnapshotUpdate =
        serde_json::from_str(r#"{"nodes": [{"name": "n1", "conditions": []}]}"#).unwrap();
    let second: SnapshotUpdate = serde_json::from_str(
        r#"{"vms": [{"name": "vm1", "namespace": "ns", "errors": [
            {"severity": "critical", "type": "disk", "message": "m", "resource": "r"}
        ]}]}"#,
    )
    .unwrap();

    store.update_at(first, fixed_time());
    store.update_at(second, fixed_time());

    assert_eq!(store.snapshot().nodes.len(), 1);
    assert_eq!(store.snapshot().vms.len(), 1);
    let issues = store.issues();
    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|i| i.severity == Severity::Critical));
    assert!(
        issues
            .iter()
            .any(|i| i.category == IssueCategory::NodeHealth && i.node_name.as_deref() == Some("n1"))
    );
    assert!(
        issues
            .iter()
            .any(|i| i.category == IssueCategory::VmResource && i.vm_name.as_deref() == Some("vm1"))
    );
}

#[test]
fn test_disjoint_updates_equal_single_combined_update() {
    let d1 = nodes_update(vec![ready_node("n1")]);
    let d2 = SnapshotUpdate {
        vms: Some(vec![vm("vm1", "ns")]),
        health_checks: Some(HealthChecks::List(vec![check("nodes", "passed", "ok")])),
        ..Default::default()
    };

    let mut stepwise = StateStore::create();
    stepwise.update_at(d1.clone(), fixed_time());
    stepwise.update_at(d2.clone(), fixed_time());

    let mut combined = StateStore::create();
    combined.update_at(d1.then(d2), fixed_time());

    assert_eq!(stepwise.snapshot(), combined.snapshot());
    assert_eq!(stepwise.issues(), combined.issues());
}

#[test]
fn test_present_key_replaces_and_absent_key_is_untouched() {
    let mut store = StateStore::create();
    store.update_at(nodes_update(vec![ready_node("n1"), ready_node("n2")]), fixed_time());
    store.update_at(vms_update(vec![vm("vm1", "ns")]), fixed_time());
    store.update_at(nodes_update(vec![ready_node("n3")]), fixed_time());

    let names: Vec<&str> = store.snapshot().nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["n3"]);
    assert_eq!(store.snapshot().vms.len(), 1);
}

#[test]
fn test_issues_are_recomputed_against_merged_snapshot() {
    let mut store = StateStore::create();
    store.update_at(nodes_update(vec![node_with_ready("n1", "False")]), fixed_time());
    assert_eq!(store.issues().len(), 1);
    store.update_at(nodes_update(vec![ready_node("n1")]), fixed_time());
    assert!(store.issues().is_empty());
    assert_eq!(store.last_updated(), Some(fixed_time()));
}

#[test]
fn test_subscribers_notified_in_order_with_merged_state() {
    let mut store = StateStore::create();
    let log = Arc::new(Mutex::new(Vec::new()));

    let first = log.clone();
    let _a = store.subscribe(move |snapshot, issues| {
        first
            .lock()
            .unwrap()
            .push(("first", snapshot.nodes.len(), issues.len()));
    });
    let second = log.clone();
    let _b = store.subscribe(move |snapshot, issues| {
        second
            .lock()
            .unwrap()
            .push(("second", snapshot.nodes.len(), issues.len()));
    });

    assert!(log.lock().unwrap().is_empty(), "subscribe must not replay state");

    store.update_at(nodes_update(vec![node_with_ready("n1", "False")]), fixed_time());
    assert_eq!(
        *log.lock().unwrap(),
        vec![("first", 1, 1), ("second", 1, 1)]
    );
}

#[test]
fn test_disposed_subscription_stops_notifications() {
    let mut store = StateStore::create();
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();
    let sub = store.subscribe(move |_, _| *counter.lock().unwrap() += 1);

    store.update_at(nodes_update(vec![]), fixed_time());
    assert!(sub.dispose(&mut store));
    store.update_at(nodes_update(vec![]), fixed_time());

    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(store.subscriber_count(), 0);
    assert!(!store.unsubscribe(sub), "second removal is a no-op");
}

#[test]
fn test_teardown_drops_subscribers_and_state() {
    let mut store = StateStore::create();
    let _sub = store.subscribe(|_, _| {});
    store.update_at(nodes_update(vec![node_with_ready("n1", "False")]), fixed_time());
    store.teardown();
    assert_eq!(store.subscriber_count(), 0);
    assert!(store.snapshot().nodes.is_empty());
    assert!(store.issues().is_empty());
    assert!(store.last_updated().is_none());
}

#[test]
fn test_count_real_issues_filters_informational() {
    let errors = vec![
        vm_error("info", "storage", "a"),
        vm_error("information", "storage", "b"),
        vm_error("INFO", "storage", "c"),
        vm_error("warning", "volume", "d"),
        vm_error("", "pvc", "e"),
        vm_error("critical", "disk", "f"),
    ];
    let expected = errors.iter().filter(|e| !e.is_informational()).count();
    assert_eq!(StateStore::count_real_issues(&errors), 4);
    assert_eq!(StateStore::count_real_issues(&errors), expected);
    assert_eq!(StateStore::count_real_issues(&[]), 0);
}

#[test]
fn test_real_issues_and_real_vm_errors() {
    let mut store = StateStore::create();
    let mut v = vm("vm1", "ns");
    v.errors = vec![
        vm_error("info", "storage", "longhorn"),
        vm_error("high", "pvc", "unbound"),
    ];
    store.update_at(vms_update(vec![v]), fixed_time());

    assert_eq!(store.real_issues().len(), 1);
    let errors = store.real_vm_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].vm_name, "vm1");
    assert_eq!(errors[0].namespace, "ns");
    assert_eq!(errors[0].error.kind, "pvc");
}
