//! Config store for loading and saving tackle.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{TackleConfig, parser};

pub const CONFIG_FILE: &str = "tackle.toml";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
    project_root: PathBuf,
}

impl ConfigStore {
    pub fn new(project_root: PathBuf) -> Self {
        Self {
            config_path: project_root.join(CONFIG_FILE),
            project_root,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Missing file yields defaults, which carry no shared section.
    pub fn load(&self) -> anyhow::Result<TackleConfig> {
        if !self.config_path.exists() {
            return Ok(TackleConfig::new());
        }
        parser::parse_tackle_toml(&self.config_path)
    }

    pub fn save(&self, config: &TackleConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}
