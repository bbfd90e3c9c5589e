//! Records of packages the host currently has installed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fs::{read_json_or_default, write_json_atomic};
use crate::package::Package;

const REPOSITORY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledPackage {
    pub package: Package,
    pub install_path: PathBuf,
    pub installed_at: DateTime<Utc>,
}

impl InstalledPackage {
    pub fn new(package: Package, install_path: PathBuf) -> Self {
        Self {
            package,
            install_path,
            installed_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        self.package.name()
    }
}

/// Installed-package records kept by the host engine.
pub trait InstalledRepository: std::fmt::Debug {
    fn find(&self, name: &str) -> anyhow::Result<Option<InstalledPackage>>;

    /// Insert or replace the record for the package's name.
    fn add(&mut self, record: InstalledPackage) -> anyhow::Result<()>;

    fn remove(&mut self, name: &str) -> anyhow::Result<Option<InstalledPackage>>;

    fn packages(&self) -> anyhow::Result<Vec<InstalledPackage>>;

    fn has(&self, name: &str) -> anyhow::Result<bool> {
        Ok(self.find(name)?.is_some())
    }
}

/// In-memory repository, used when nothing needs to survive the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
    packages: BTreeMap<String, InstalledPackage>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstalledRepository for MemoryRepository {
    fn find(&self, name: &str) -> anyhow::Result<Option<InstalledPackage>> {
        Ok(self.packages.get(name).cloned())
    }

    fn add(&mut self, record: InstalledPackage) -> anyhow::Result<()> {
        self.packages.insert(record.name().to_string(), record);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> anyhow::Result<Option<InstalledPackage>> {
        Ok(self.packages.remove(name))
    }

    fn packages(&self) -> anyhow::Result<Vec<InstalledPackage>> {
        Ok(self.packages.values().cloned().collect())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RepositoryState {
    version: u32,
    #[serde(default)]
    packages: BTreeMap<String, InstalledPackage>,
}

impl Default for RepositoryState {
    fn default() -> Self {
        Self {
            version: REPOSITORY_VERSION,
            packages: BTreeMap::new(),
        }
    }
}

/// JSON-file repository under the state directory.
///
/// Every mutation runs a load, modify, save cycle; saves are atomic.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub const FILE_NAME: &'static str = "installed.json";

    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_state_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> anyhow::Result<RepositoryState> {
        let state: RepositoryState = read_json_or_default(&self.path)
            .with_context(|| format!("Failed to load installed repository: {}", self.path.display()))?;
        if state.version != REPOSITORY_VERSION {
            anyhow::bail!(
                "Unsupported installed repository version {} in {}",
                state.version,
                self.path.display()
            );
        }
        Ok(state)
    }

    fn save(&self, state: &RepositoryState) -> anyhow::Result<()> {
        write_json_atomic(&self.path, state)
            .with_context(|| format!("Failed to save installed repository: {}", self.path.display()))
    }
}

impl InstalledRepository for FileRepository {
    fn find(&self, name: &str) -> anyhow::Result<Option<InstalledPackage>> {
        Ok(self.load()?.packages.get(name).cloned())
    }

    fn add(&mut self, record: InstalledPackage) -> anyhow::Result<()> {
        let mut state = self.load()?;
        state.packages.insert(record.name().to_string(), record);
        self.save(&state)
    }

    fn remove(&mut self, name: &str) -> anyhow::Result<Option<InstalledPackage>> {
        let mut state = self.load()?;
        let removed = state.packages.remove(name);
        if removed.is_some() {
            self.save(&state)?;
        }
        Ok(removed)
    }

    fn packages(&self) -> anyhow::Result<Vec<InstalledPackage>> {
        Ok(self.load()?.packages.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageDescriptor;
    use tempfile::TempDir;

    fn record(name: &str, version: &str) -> InstalledPackage {
        InstalledPackage::new(
            Package {
                descriptor: PackageDescriptor {
                    name: name.to_string(),
                    version: version.to_string(),
                    package_type: "tackle-app".to_string(),
                    extra: serde_json::Value::Null,
                },
                source_dir: PathBuf::from("/src").join(name),
            },
            PathBuf::from("/vendor").join(name),
        )
    }

    #[test]
    fn file_repository_persists_records() {
        let temp = TempDir::new().unwrap();
        let mut repo = FileRepository::in_state_dir(temp.path());

        repo.add(record("acme/blog", "1.0.0")).unwrap();
        repo.add(record("acme/shop", "0.3.0")).unwrap();

        let reopened = FileRepository::in_state_dir(temp.path());
        assert!(reopened.has("acme/blog").unwrap());
        assert_eq!(reopened.packages().unwrap().len(), 2);
    }

    #[test]
    fn add_replaces_existing_record() {
        let temp = TempDir::new().unwrap();
        let mut repo = FileRepository::in_state_dir(temp.path());

        repo.add(record("acme/blog", "1.0.0")).unwrap();
        repo.add(record("acme/blog", "2.0.0")).unwrap();

        let found = repo.find("acme/blog").unwrap().unwrap();
        assert_eq!(found.package.descriptor.version, "2.0.0");
        assert_eq!(repo.packages().unwrap().len(), 1);
    }

    #[test]
    fn remove_returns_record_once() {
        let mut repo = MemoryRepository::new();
        repo.add(record("acme/blog", "1.0.0")).unwrap();

        assert!(repo.remove("acme/blog").unwrap().is_some());
        assert!(repo.remove("acme/blog").unwrap().is_none());
        assert!(!repo.has("acme/blog").unwrap());
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let repo = FileRepository::in_state_dir(temp.path());
        std::fs::write(repo.path(), "not json {{{").unwrap();

        let err = repo.packages().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load installed repository"));
    }
}
