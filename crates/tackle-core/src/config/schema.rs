//! Configuration schema for tackle.toml
//!
//! ```toml
//! vendor_dir = "vendor"
//! state_dir = ".tackle"
//! supported_types = ["acme-extension"]
//!
//! [shared]
//! registry = "config/registry.json"
//! target_root = "public"
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::fs::ensure_relative_path;

/// Root configuration structure for tackle.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TackleConfig {
    /// Where packages are materialized, relative to the project root
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,

    /// Installed repository and ownership records
    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    /// Package types accepted in addition to the built-in ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supported_types: Vec<String>,

    /// Shared configuration area handed to actions.
    /// Without it, actions are skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared: Option<SharedConfig>,
}

fn default_vendor_dir() -> String {
    "vendor".to_string()
}

fn default_state_dir() -> String {
    ".tackle".to_string()
}

impl Default for TackleConfig {
    fn default() -> Self {
        Self {
            vendor_dir: default_vendor_dir(),
            state_dir: default_state_dir(),
            supported_types: Vec::new(),
            shared: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// JSON registry file that `Register` writes into
    #[serde(default = "default_registry")]
    pub registry: String,

    /// Directory file-producing actions write into
    #[serde(default = "default_target_root")]
    pub target_root: String,
}

fn default_registry() -> String {
    "config/registry.json".to_string()
}

fn default_target_root() -> String {
    "public".to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            target_root: default_target_root(),
        }
    }
}

impl TackleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration written by `tackle init`: defaults plus a shared area.
    pub fn initial() -> Self {
        Self {
            shared: Some(SharedConfig::default()),
            ..Self::default()
        }
    }

    pub fn vendor_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.vendor_dir)
    }

    pub fn state_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.state_dir)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure_relative_path(Path::new(&self.vendor_dir)).context("Invalid vendor_dir")?;
        ensure_relative_path(Path::new(&self.state_dir)).context("Invalid state_dir")?;

        for ty in &self.supported_types {
            if ty.trim().is_empty() {
                anyhow::bail!("supported_types cannot contain empty entries");
            }
        }

        if let Some(shared) = &self.shared {
            shared.validate()?;
        }
        Ok(())
    }
}

impl SharedConfig {
    pub fn registry_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.registry)
    }

    pub fn target_root(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.target_root)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure_relative_path(Path::new(&self.registry)).context("Invalid shared.registry")?;
        ensure_relative_path(Path::new(&self.target_root))
            .context("Invalid shared.target_root")?;
        Ok(())
    }
}
