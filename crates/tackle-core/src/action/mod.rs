//! Action contract, execution context and the built-in action set.
//!
//! An action manages one category of side effect declared by a package.
//! Actions are constructed fresh for every dispatched operation and carry no
//! state between calls.

pub mod builtin;
pub mod map;
pub mod registry;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::Diagnostics;
use crate::host::HostContext;
use crate::installer::ConfigInstaller;
use crate::types::{ActionConfig, ActionKind, PackageIdentity};

pub use map::ActionMap;
pub use registry::{ActionFactory, ActionRegistry, UnresolvedActionKind};

/// Install/update/uninstall contract every action implements.
///
/// Each method is invoked at most once per lifecycle event; the orchestrator
/// never retries.
pub trait Action: fmt::Debug {
    fn install(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()>;

    fn update(
        &self,
        package: &PackageIdentity,
        old_config: &ActionConfig,
        new_config: &ActionConfig,
    ) -> anyhow::Result<()>;

    fn uninstall(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()>;
}

/// Everything an action instance is constructed with.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub host: Arc<HostContext>,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub package_path: PathBuf,
    pub installer: Arc<ConfigInstaller>,
}

impl ActionContext {
    pub fn package_path(&self) -> &Path {
        &self.package_path
    }

    pub fn target_root(&self) -> &Path {
        self.installer.target_root()
    }
}

/// Fully populated shared context required by the orchestrator.
///
/// Holding one of these is the precondition for dispatching actions: the
/// sub-installer handle is not optional here.
#[derive(Debug, Clone)]
pub struct ActionEnvironment {
    host: Arc<HostContext>,
    diagnostics: Arc<dyn Diagnostics>,
    installer: Arc<ConfigInstaller>,
}

impl ActionEnvironment {
    pub fn new(
        host: Arc<HostContext>,
        diagnostics: Arc<dyn Diagnostics>,
        installer: Arc<ConfigInstaller>,
    ) -> Self {
        Self {
            host,
            diagnostics,
            installer,
        }
    }

    pub fn installer(&self) -> &ConfigInstaller {
        &self.installer
    }

    pub fn diagnostics(&self) -> &dyn Diagnostics {
        self.diagnostics.as_ref()
    }

    pub fn context_for(&self, package_path: &Path) -> ActionContext {
        ActionContext {
            host: Arc::clone(&self.host),
            diagnostics: Arc::clone(&self.diagnostics),
            package_path: package_path.to_path_buf(),
            installer: Arc::clone(&self.installer),
        }
    }
}

/// Which contract method a dispatch invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Install,
    Update,
    Uninstall,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Update => "update",
            Operation::Uninstall => "uninstall",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An action's own install/update/uninstall call failed.
#[derive(Debug, Error)]
#[error("Action '{kind}' failed to {operation} for {package}")]
pub struct ActionExecutionError {
    pub kind: ActionKind,
    pub operation: Operation,
    pub package: String,
    #[source]
    pub source: anyhow::Error,
}
