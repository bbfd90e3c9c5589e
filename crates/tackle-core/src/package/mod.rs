//! Package records as handed over by the host dependency engine.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{PackageIdentity, PackageReference};

/// File name of the package descriptor inside a package directory.
pub const DESCRIPTOR_FILE: &str = "tackle.json";

/// Package metadata, the `tackle.json` of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub package_type: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub extra: Value,
}

impl PackageDescriptor {
    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(self.name.clone(), PackageReference::parse(&self.version))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Package name cannot be empty");
        }
        if self.package_type.trim().is_empty() {
            anyhow::bail!("Package type cannot be empty for {}", self.name);
        }
        crate::fs::ensure_relative_path(Path::new(&self.name))
            .with_context(|| format!("Invalid package name: {}", self.name))?;
        Ok(())
    }
}

/// A resolved package ready to be materialized from `source_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub descriptor: PackageDescriptor,
    pub source_dir: PathBuf,
}

impl Package {
    /// Read and validate `tackle.json` from a package directory.
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let path = dir.join(DESCRIPTOR_FILE);
        let bytes = std::fs::read(&path)
            .with_context(|| format!("Failed to read package descriptor: {}", path.display()))?;
        let descriptor: PackageDescriptor = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse package descriptor: {}", path.display()))?;
        descriptor.validate()?;
        Ok(Self {
            descriptor,
            source_dir: dir.to_path_buf(),
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn package_type(&self) -> &str {
        &self.descriptor.package_type
    }

    pub fn identity(&self) -> PackageIdentity {
        self.descriptor.identity()
    }
}
