//! Dispatch order and failure behavior of the lifecycle orchestrator.

mod support;

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde_json::json;
use support::{CallLog, Workspace, actions, calls, identity, recording_registry};
use tackle_core::action::{ActionMap, Operation};
use tackle_core::orchestration::{OrchestrateError, Orchestrator, PackageState};

fn state<'a>(
    identity: &'a tackle_core::types::PackageIdentity,
    path: &'a Path,
    actions: &'a ActionMap,
) -> PackageState<'a> {
    PackageState {
        identity,
        path,
        actions,
    }
}

fn orchestrator(kinds: &[&str], failing: &[&str]) -> (Orchestrator, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let registry = recording_registry(kinds, failing, &log);
    (Orchestrator::new(registry), log)
}

#[test]
fn install_dispatches_in_declaration_order() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy", "Folders", "Register"], &[]);
    let pkg = identity("acme/blog", "1.0.0");
    let map = actions(&[
        ("Register", json!({"settings": {}})),
        ("Copy", json!({"a": "b"})),
        ("Folders", json!(["var"])),
    ]);

    let report = orchestrator
        .install(&ws.env, state(&pkg, ws.root(), &map))
        .unwrap();

    assert_eq!(
        calls(&log),
        vec![
            ("Register".to_string(), "install"),
            ("Copy".to_string(), "install"),
            ("Folders".to_string(), "install"),
        ]
    );
    assert_eq!(report.count(Operation::Install), 3);
}

#[test]
fn uninstall_dispatches_in_declaration_order() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy", "Folders"], &[]);
    let pkg = identity("acme/blog", "1.0.0");
    let map = actions(&[("Folders", json!(["var"])), ("Copy", json!({"a": "b"}))]);

    orchestrator
        .uninstall(&ws.env, state(&pkg, ws.root(), &map))
        .unwrap();

    assert_eq!(
        calls(&log),
        vec![
            ("Folders".to_string(), "uninstall"),
            ("Copy".to_string(), "uninstall"),
        ]
    );
}

#[test]
fn update_with_identical_maps_only_updates() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy", "Link"], &[]);
    let v1 = identity("acme/blog", "1.0.0");
    let v2 = identity("acme/blog", "1.1.0");
    let map = actions(&[("Copy", json!({"a": "b"})), ("Link", json!({"c": "d"}))]);

    let report = orchestrator
        .update(
            &ws.env,
            state(&v1, ws.root(), &map),
            state(&v2, ws.root(), &map),
        )
        .unwrap();

    assert_eq!(report.count(Operation::Update), 2);
    assert_eq!(report.count(Operation::Install), 0);
    assert_eq!(report.count(Operation::Uninstall), 0);
    let recorded = log.lock().unwrap().clone();
    assert!(
        recorded
            .iter()
            .all(|c| c.configs[0] == c.configs[1] && c.package == "acme/blog@1.1.0")
    );
}

#[test]
fn update_runs_uninstall_then_install_then_update() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy", "Link", "Register"], &[]);
    let old_path = ws.root().join("old");
    let new_path = ws.root().join("new");
    let v1 = identity("acme/blog", "1.0.0");
    let v2 = identity("acme/blog", "2.0.0");
    let initial = actions(&[("Copy", json!({"a": "x"})), ("Link", json!({"l": "m"}))]);
    let target = actions(&[
        ("Register", json!({"routes": {}})),
        ("Copy", json!({"a": "y"})),
    ]);

    let report = orchestrator
        .update(
            &ws.env,
            state(&v1, &old_path, &initial),
            state(&v2, &new_path, &target),
        )
        .unwrap();

    assert_eq!(
        calls(&log),
        vec![
            ("Link".to_string(), "uninstall"),
            ("Register".to_string(), "install"),
            ("Copy".to_string(), "update"),
        ]
    );
    assert_eq!(report.dispatched.len(), 3);

    let recorded = log.lock().unwrap().clone();
    assert_eq!(recorded[0].path, old_path);
    assert_eq!(recorded[0].package, "acme/blog@1.0.0");
    assert_eq!(recorded[1].path, new_path);
    assert_eq!(recorded[2].path, new_path);
    assert_eq!(recorded[2].configs, vec![json!({"a": "x"}), json!({"a": "y"})]);
}

#[test]
fn update_between_empty_maps_dispatches_nothing() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy"], &[]);
    let v1 = identity("acme/blog", "1.0.0");
    let empty = ActionMap::new();

    let report = orchestrator
        .update(
            &ws.env,
            state(&v1, ws.root(), &empty),
            state(&v1, ws.root(), &empty),
        )
        .unwrap();

    assert!(report.is_empty());
    assert!(calls(&log).is_empty());
}

#[test]
fn unresolved_kind_stops_dispatch_after_earlier_actions() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy", "Folders"], &[]);
    let pkg = identity("acme/blog", "1.0.0");
    let map = actions(&[
        ("Copy", json!({})),
        ("Teleport", json!({})),
        ("Folders", json!([])),
    ]);

    let err = orchestrator
        .install(&ws.env, state(&pkg, ws.root(), &map))
        .unwrap_err();

    assert!(matches!(err, OrchestrateError::Unresolved(_)));
    assert_eq!(err.kind().as_str(), "Teleport");
    assert_eq!(calls(&log), vec![("Copy".to_string(), "install")]);
}

#[test]
fn failing_action_is_not_rolled_back() {
    let ws = Workspace::new();
    let (orchestrator, log) = orchestrator(&["Copy", "Link", "Folders"], &["Link"]);
    let pkg = identity("acme/blog", "1.0.0");
    let map = actions(&[
        ("Copy", json!({})),
        ("Link", json!({})),
        ("Folders", json!([])),
    ]);

    let err = orchestrator
        .install(&ws.env, state(&pkg, ws.root(), &map))
        .unwrap_err();

    match &err {
        OrchestrateError::Execution(exec) => {
            assert_eq!(exec.kind.as_str(), "Link");
            assert_eq!(exec.operation, Operation::Install);
            assert_eq!(exec.package, "acme/blog");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let chain = format!("{:#}", anyhow::Error::new(err));
    assert!(chain.contains("Action 'Link' failed to install for acme/blog"));
    assert!(chain.contains("Link exploded"));
    assert_eq!(
        calls(&log),
        vec![
            ("Copy".to_string(), "install"),
            ("Link".to_string(), "install"),
        ]
    );
}
