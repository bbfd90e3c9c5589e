#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tackle_core::action::{Action, ActionContext, ActionEnvironment, ActionMap, ActionRegistry};
use tackle_core::diagnostics::CollectedDiagnostics;
use tackle_core::host::HostContext;
use tackle_core::installer::{ConfigInstaller, OwnershipStore};
use tackle_core::types::{ActionConfig, ActionKind, PackageIdentity, PackageReference};
use tempfile::TempDir;

/// One observed call on a recording action.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: String,
    pub operation: &'static str,
    pub package: String,
    pub path: PathBuf,
    pub configs: Vec<Value>,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Debug)]
struct RecordingAction {
    kind: String,
    path: PathBuf,
    fail: bool,
    log: CallLog,
}

impl RecordingAction {
    fn record(
        &self,
        operation: &'static str,
        package: &PackageIdentity,
        configs: Vec<Value>,
    ) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(Call {
            kind: self.kind.clone(),
            operation,
            package: package.to_string(),
            path: self.path.clone(),
            configs,
        });
        if self.fail {
            anyhow::bail!("{} exploded", self.kind);
        }
        Ok(())
    }
}

impl Action for RecordingAction {
    fn install(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        self.record("install", package, vec![config.clone()])
    }

    fn update(
        &self,
        package: &PackageIdentity,
        old_config: &ActionConfig,
        new_config: &ActionConfig,
    ) -> anyhow::Result<()> {
        self.record("update", package, vec![old_config.clone(), new_config.clone()])
    }

    fn uninstall(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        self.record("uninstall", package, vec![config.clone()])
    }
}

/// Registry of recording actions; kinds listed in `failing` error after recording.
pub fn recording_registry(kinds: &[&str], failing: &[&str], log: &CallLog) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for kind in kinds {
        let kind = kind.to_string();
        let fail = failing.contains(&kind.as_str());
        let log = Arc::clone(log);
        registry.register(kind.clone(), move |ctx: ActionContext| {
            Box::new(RecordingAction {
                kind: kind.clone(),
                path: ctx.package_path().to_path_buf(),
                fail,
                log: Arc::clone(&log),
            }) as Box<dyn Action>
        });
    }
    registry
}

pub fn calls(log: &CallLog) -> Vec<(String, &'static str)> {
    log.lock()
        .unwrap()
        .iter()
        .map(|c| (c.kind.clone(), c.operation))
        .collect()
}

pub fn actions(entries: &[(&str, Value)]) -> ActionMap {
    entries
        .iter()
        .map(|(kind, config)| (ActionKind::new(*kind), config.clone()))
        .collect()
}

pub fn identity(name: &str, version: &str) -> PackageIdentity {
    PackageIdentity::new(name, PackageReference::parse(version))
}

pub struct Workspace {
    pub temp: TempDir,
    pub diagnostics: Arc<CollectedDiagnostics>,
    pub env: ActionEnvironment,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().to_path_buf();
        let diagnostics = Arc::new(CollectedDiagnostics::new());
        let env = ActionEnvironment::new(
            Arc::new(HostContext::new(root.clone(), root.join("vendor"))),
            diagnostics.clone(),
            Arc::new(ConfigInstaller::new(
                root.join("config/registry.json"),
                root.join("public"),
                OwnershipStore::new(root.join(".tackle/ownership.json")),
            )),
        );
        Self {
            temp,
            diagnostics,
            env,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }
}

/// Write a package source directory containing `tackle.json`.
pub fn write_package(dir: &Path, name: &str, version: &str, extra: Value) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create package dir");
    let mut descriptor = serde_json::json!({
        "name": name,
        "version": version,
        "type": "tackle-app",
    });
    if !extra.is_null() {
        descriptor["extra"] = extra;
    }
    std::fs::write(
        dir.join("tackle.json"),
        serde_json::to_vec_pretty(&descriptor).unwrap(),
    )
    .expect("Failed to write descriptor");
    dir.to_path_buf()
}
