//! Shared configuration installer handed to every action.
//!
//! The installer owns two areas: a JSON registry file whose top-level keys are
//! sections (`settings`, `routes`, ...) and a target root directory where
//! file-producing actions place their output.

pub mod ownership;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};

use crate::fs::{read_json_or_default, write_json_atomic};
pub use ownership::OwnershipStore;
use ownership::{hash_json, merge_owned_map};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Changed,
    NoOp,
}

#[derive(Debug, Clone)]
pub struct ConfigInstaller {
    registry_path: PathBuf,
    target_root: PathBuf,
    ownership: OwnershipStore,
}

impl ConfigInstaller {
    pub fn new(registry_path: PathBuf, target_root: PathBuf, ownership: OwnershipStore) -> Self {
        Self {
            registry_path,
            target_root,
            ownership,
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    /// Entries currently stored under `section`.
    pub fn section(&self, section: &str) -> anyhow::Result<Map<String, Value>> {
        let root = self.load_registry()?;
        section_map(&root, section)
    }

    /// Sections in which `package` owns at least one entry.
    pub fn registered_sections(&self, package: &str) -> anyhow::Result<Vec<String>> {
        self.ownership.sections_for(&self.registry_path, package)
    }

    /// Make `entries` the complete set of values `package` owns in `section`.
    ///
    /// Previously owned keys missing from `entries` are removed.
    pub fn register(
        &self,
        package: &str,
        section: &str,
        entries: &Map<String, Value>,
    ) -> anyhow::Result<RegisterOutcome> {
        let mut root = self.load_registry()?;
        let existing = section_map(&root, section)?;
        let owned = self
            .ownership
            .load(&self.registry_path, package, section)?;

        let merged = merge_owned_map(&existing, entries, &owned)
            .with_context(|| format!("Failed to register '{section}' entries for {package}"))?;

        let hashes: BTreeMap<String, String> = entries
            .iter()
            .map(|(key, value)| (key.clone(), hash_json(value)))
            .collect();

        if merged == existing && hashes == owned {
            return Ok(RegisterOutcome::NoOp);
        }

        set_section(&mut root, section, merged);
        self.save_registry(&root)?;
        self.ownership
            .save(&self.registry_path, package, section, hashes)?;
        tracing::debug!(package, section, entries = entries.len(), "registered entries");
        Ok(RegisterOutcome::Changed)
    }

    /// Remove every entry `package` owns in `section`.
    pub fn unregister(&self, package: &str, section: &str) -> anyhow::Result<RegisterOutcome> {
        let owned = self
            .ownership
            .load(&self.registry_path, package, section)?;
        if owned.is_empty() {
            return Ok(RegisterOutcome::NoOp);
        }

        let mut root = self.load_registry()?;
        let existing = section_map(&root, section)?;
        let merged = merge_owned_map(&existing, &Map::new(), &owned)
            .with_context(|| format!("Failed to unregister '{section}' entries for {package}"))?;

        set_section(&mut root, section, merged);
        self.save_registry(&root)?;
        self.ownership
            .save(&self.registry_path, package, section, BTreeMap::new())?;
        tracing::debug!(package, section, "unregistered entries");
        Ok(RegisterOutcome::Changed)
    }

    fn load_registry(&self) -> anyhow::Result<Map<String, Value>> {
        let value: Value = read_json_or_default(&self.registry_path)?;
        match value {
            Value::Null => Ok(Map::new()),
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!(
                "Expected JSON object at root: {}",
                self.registry_path.display()
            ),
        }
    }

    fn save_registry(&self, root: &Map<String, Value>) -> anyhow::Result<()> {
        write_json_atomic(&self.registry_path, root).with_context(|| {
            format!(
                "Failed to write registry file: {}",
                self.registry_path.display()
            )
        })
    }
}

fn section_map(root: &Map<String, Value>, section: &str) -> anyhow::Result<Map<String, Value>> {
    match root.get(section) {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => anyhow::bail!("Expected registry section '{}' to be a JSON object", section),
    }
}

fn set_section(root: &mut Map<String, Value>, section: &str, map: Map<String, Value>) {
    if map.is_empty() {
        root.remove(section);
    } else {
        root.insert(section.to_string(), Value::Object(map));
    }
}
