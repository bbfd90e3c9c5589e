//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::action::ActionRegistry;
use crate::config::{ConfigStore, TackleConfig};
use crate::diagnostics::Diagnostics;
use crate::host::{ActionInstaller, FileRepository, HostContext, SupportedTypes};
use crate::installer::{ConfigInstaller, OwnershipStore};

/// Unified application context.
///
/// Frontends create this once per invocation from the project root and its
/// `tackle.toml`, then hand out the services built from it.
#[derive(Debug, Clone)]
pub struct AppContext {
    project_root: PathBuf,
    config: TackleConfig,
}

impl AppContext {
    pub fn new(project_root: PathBuf, config: TackleConfig) -> Self {
        Self {
            project_root,
            config,
        }
    }

    /// Load `tackle.toml` from `project_root` (defaults when absent).
    pub fn load(project_root: PathBuf) -> anyhow::Result<Self> {
        let config = ConfigStore::new(project_root.clone()).load()?;
        Ok(Self::new(project_root, config))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &TackleConfig {
        &self.config
    }

    pub fn config_store(&self) -> ConfigStore {
        ConfigStore::new(self.project_root.clone())
    }

    pub fn vendor_dir(&self) -> PathBuf {
        self.config.vendor_dir(&self.project_root)
    }

    pub fn state_dir(&self) -> PathBuf {
        self.config.state_dir(&self.project_root)
    }

    pub fn host_context(&self) -> HostContext {
        HostContext::new(self.project_root.clone(), self.vendor_dir())
    }

    pub fn repository(&self) -> FileRepository {
        FileRepository::in_state_dir(&self.state_dir())
    }

    pub fn ownership_store(&self) -> OwnershipStore {
        OwnershipStore::new(self.state_dir().join("ownership.json"))
    }

    /// The shared config installer, when `[shared]` is configured.
    pub fn config_installer(&self) -> Option<ConfigInstaller> {
        self.config.shared.as_ref().map(|shared| {
            ConfigInstaller::new(
                shared.registry_path(&self.project_root),
                shared.target_root(&self.project_root),
                self.ownership_store(),
            )
        })
    }

    pub fn supported_types(&self) -> SupportedTypes {
        SupportedTypes::with_extra(self.config.supported_types.iter().cloned())
    }

    /// Get an ActionInstaller wired with the built-in action registry.
    pub fn action_installer(&self, diagnostics: Arc<dyn Diagnostics>) -> ActionInstaller {
        self.action_installer_with_registry(diagnostics, ActionRegistry::with_default_actions())
    }

    pub fn action_installer_with_registry(
        &self,
        diagnostics: Arc<dyn Diagnostics>,
        registry: ActionRegistry,
    ) -> ActionInstaller {
        ActionInstaller::new(
            Arc::new(self.host_context()),
            diagnostics,
            self.config_installer().map(Arc::new),
        )
        .with_registry(registry)
        .with_types(self.supported_types())
    }
}
