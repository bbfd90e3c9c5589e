//! Host-facing package installer that adds action processing to the primary
//! install step.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::HostContext;
use super::library::LibraryInstaller;
use super::repository::InstalledRepository;
use super::types::SupportedTypes;
use crate::action::{ActionEnvironment, ActionRegistry};
use crate::diagnostics::Diagnostics;
use crate::installer::ConfigInstaller;
use crate::orchestration::{DispatchReport, OrchestrateError, Orchestrator, PackageState};
use crate::package::Package;
use crate::parser::{ParseError, parse};

/// The host engine's installer capability.
pub trait PackageInstaller {
    fn supports(&self, package_type: &str) -> bool;

    fn install_path(&self, package: &Package) -> anyhow::Result<PathBuf>;

    fn install(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
    ) -> Result<LifecycleOutcome, LifecycleError>;

    fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> Result<LifecycleOutcome, LifecycleError>;

    fn uninstall(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
    ) -> Result<LifecycleOutcome, LifecycleError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LifecycleOutcome {
    /// Actions were dispatched (possibly none).
    Applied(DispatchReport),
    /// The primary step ran but action processing was skipped.
    Skipped,
}

impl LifecycleOutcome {
    pub fn report(&self) -> Option<&DispatchReport> {
        match self {
            LifecycleOutcome::Applied(report) => Some(report),
            LifecycleOutcome::Skipped => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Package type '{package_type}' of {package} is not supported")]
    UnsupportedType {
        package: String,
        package_type: String,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Orchestrate(#[from] OrchestrateError),

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

/// Library installer plus action orchestration.
///
/// The config sub-installer is optional: without it, the primary step still
/// runs and action processing is reported as skipped.
#[derive(Debug)]
pub struct ActionInstaller {
    library: LibraryInstaller,
    orchestrator: Orchestrator,
    installer: Option<Arc<ConfigInstaller>>,
    host: Arc<HostContext>,
    diagnostics: Arc<dyn Diagnostics>,
    types: SupportedTypes,
}

impl ActionInstaller {
    pub fn new(
        host: Arc<HostContext>,
        diagnostics: Arc<dyn Diagnostics>,
        installer: Option<Arc<ConfigInstaller>>,
    ) -> Self {
        Self {
            library: LibraryInstaller::new(Arc::clone(&host)),
            orchestrator: Orchestrator::default(),
            installer,
            host,
            diagnostics,
            types: SupportedTypes::builtin(),
        }
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.orchestrator = Orchestrator::new(registry);
        self
    }

    pub fn with_types(mut self, types: SupportedTypes) -> Self {
        self.types = types;
        self
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn types(&self) -> &SupportedTypes {
        &self.types
    }

    pub fn has_config_installer(&self) -> bool {
        self.installer.is_some()
    }

    fn ensure_supported(&self, package: &Package) -> Result<(), LifecycleError> {
        if self.supports(package.package_type()) {
            return Ok(());
        }
        Err(LifecycleError::UnsupportedType {
            package: package.name().to_string(),
            package_type: package.package_type().to_string(),
        })
    }

    /// The action environment, or a diagnostic when the sub-installer is missing.
    fn environment(&self, package: &Package) -> Option<ActionEnvironment> {
        match &self.installer {
            Some(installer) => Some(ActionEnvironment::new(
                Arc::clone(&self.host),
                Arc::clone(&self.diagnostics),
                Arc::clone(installer),
            )),
            None => {
                self.diagnostics.error(&format!(
                    "Package installer not ready or missing configuration: actions for {} were skipped.",
                    package.name()
                ));
                None
            }
        }
    }
}

impl PackageInstaller for ActionInstaller {
    fn supports(&self, package_type: &str) -> bool {
        self.types.supports(package_type)
    }

    fn install_path(&self, package: &Package) -> anyhow::Result<PathBuf> {
        self.library.install_path(package)
    }

    fn install(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.ensure_supported(package)?;
        let install_path = self.library.install(repo, package)?;

        let Some(env) = self.environment(package) else {
            return Ok(LifecycleOutcome::Skipped);
        };
        let actions = parse(&package.descriptor)?;
        let identity = package.identity();
        let report = self.orchestrator.install(
            &env,
            PackageState {
                identity: &identity,
                path: &install_path,
                actions: &actions,
            },
        )?;
        Ok(LifecycleOutcome::Applied(report))
    }

    fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.ensure_supported(target)?;
        let initial_path = self.library.install_path(initial)?;
        let target_path = self.library.update(repo, initial, target)?;

        let Some(env) = self.environment(target) else {
            return Ok(LifecycleOutcome::Skipped);
        };
        let initial_actions = parse(&initial.descriptor)?;
        let target_actions = parse(&target.descriptor)?;
        let initial_identity = initial.identity();
        let target_identity = target.identity();
        let report = self.orchestrator.update(
            &env,
            PackageState {
                identity: &initial_identity,
                path: &initial_path,
                actions: &initial_actions,
            },
            PackageState {
                identity: &target_identity,
                path: &target_path,
                actions: &target_actions,
            },
        )?;
        Ok(LifecycleOutcome::Applied(report))
    }

    fn uninstall(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        self.ensure_supported(package)?;

        let outcome = match self.environment(package) {
            Some(env) => {
                let actions = parse(&package.descriptor)?;
                let identity = package.identity();
                let install_path = self.library.install_path(package)?;
                let report = self.orchestrator.uninstall(
                    &env,
                    PackageState {
                        identity: &identity,
                        path: &install_path,
                        actions: &actions,
                    },
                )?;
                LifecycleOutcome::Applied(report)
            }
            None => LifecycleOutcome::Skipped,
        };

        self.library.uninstall(repo, package)?;
        Ok(outcome)
    }
}
