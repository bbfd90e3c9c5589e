//! Primary package installation: materialize the package into the vendor dir.

use std::path::PathBuf;

use anyhow::Context;

use super::HostContext;
use super::repository::{InstalledPackage, InstalledRepository};
use crate::fs::{copy_path, join_relative, remove_dir_if_empty, remove_path_if_exists};
use crate::package::Package;

/// Resolves where a package lives once installed.
pub trait InstallPathResolver {
    fn install_path(&self, package: &Package) -> anyhow::Result<PathBuf>;
}

impl InstallPathResolver for HostContext {
    /// `<vendor_dir>/<package name>`, e.g. `vendor/acme/blog`.
    fn install_path(&self, package: &Package) -> anyhow::Result<PathBuf> {
        join_relative(self.vendor_dir(), package.name())
            .with_context(|| format!("Invalid install path for package {}", package.name()))
    }
}

/// Copies package trees into the vendor directory and keeps the installed
/// repository in sync.
#[derive(Debug, Clone)]
pub struct LibraryInstaller {
    host: std::sync::Arc<HostContext>,
}

impl LibraryInstaller {
    pub fn new(host: std::sync::Arc<HostContext>) -> Self {
        Self { host }
    }

    pub fn install_path(&self, package: &Package) -> anyhow::Result<PathBuf> {
        self.host.install_path(package)
    }

    pub fn install(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
    ) -> anyhow::Result<PathBuf> {
        let install_path = self.install_path(package)?;
        self.materialize(package, &install_path)?;
        repo.add(InstalledPackage::new(package.clone(), install_path.clone()))?;
        tracing::info!(package = %package.identity(), path = %install_path.display(), "installed package");
        Ok(install_path)
    }

    /// Replace the initial package tree with the target one.
    pub fn update(
        &self,
        repo: &mut dyn InstalledRepository,
        initial: &Package,
        target: &Package,
    ) -> anyhow::Result<PathBuf> {
        let initial_path = self.install_path(initial)?;
        let target_path = self.install_path(target)?;
        if initial_path != target_path {
            remove_path_if_exists(&initial_path)?;
            self.prune_empty_parents(&initial_path)?;
            repo.remove(initial.name())?;
        }
        self.materialize(target, &target_path)?;
        repo.add(InstalledPackage::new(target.clone(), target_path.clone()))?;
        tracing::info!(
            from = %initial.identity(),
            to = %target.identity(),
            "updated package"
        );
        Ok(target_path)
    }

    pub fn uninstall(
        &self,
        repo: &mut dyn InstalledRepository,
        package: &Package,
    ) -> anyhow::Result<()> {
        let install_path = self.install_path(package)?;
        remove_path_if_exists(&install_path)?;
        self.prune_empty_parents(&install_path)?;
        repo.remove(package.name())?;
        tracing::info!(package = %package.identity(), "uninstalled package");
        Ok(())
    }

    fn materialize(&self, package: &Package, install_path: &std::path::Path) -> anyhow::Result<()> {
        if package.source_dir == install_path {
            return Ok(());
        }
        copy_path(&package.source_dir, install_path).with_context(|| {
            format!(
                "Failed to copy package {} into {}",
                package.name(),
                install_path.display()
            )
        })
    }

    /// Remove vendor namespace dirs (`vendor/acme`) left empty by a removal.
    fn prune_empty_parents(&self, install_path: &std::path::Path) -> anyhow::Result<()> {
        let mut current = install_path.parent();
        while let Some(dir) = current {
            if dir == self.host.vendor_dir() || !dir.starts_with(self.host.vendor_dir()) {
                break;
            }
            if !remove_dir_if_empty(dir)? {
                break;
            }
            current = dir.parent();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryRepository;
    use crate::package::PackageDescriptor;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn package(temp: &TempDir, name: &str, version: &str) -> Package {
        let source_dir = temp.path().join("src").join(version);
        std::fs::create_dir_all(&source_dir).unwrap();
        std::fs::write(source_dir.join("VERSION"), version).unwrap();
        Package {
            descriptor: PackageDescriptor {
                name: name.to_string(),
                version: version.to_string(),
                package_type: "tackle-app".to_string(),
                extra: serde_json::Value::Null,
            },
            source_dir,
        }
    }

    fn installer(temp: &TempDir) -> LibraryInstaller {
        LibraryInstaller::new(Arc::new(HostContext::new(
            temp.path().to_path_buf(),
            temp.path().join("vendor"),
        )))
    }

    #[test]
    fn install_copies_package_and_records_it() {
        let temp = TempDir::new().unwrap();
        let mut repo = MemoryRepository::new();
        let pkg = package(&temp, "acme/blog", "1.0.0");

        let path = installer(&temp).install(&mut repo, &pkg).unwrap();

        assert_eq!(path, temp.path().join("vendor/acme/blog"));
        assert_eq!(std::fs::read_to_string(path.join("VERSION")).unwrap(), "1.0.0");
        assert!(repo.has("acme/blog").unwrap());
    }

    #[test]
    fn update_replaces_tree_contents() {
        let temp = TempDir::new().unwrap();
        let mut repo = MemoryRepository::new();
        let v1 = package(&temp, "acme/blog", "1.0.0");
        let v2 = package(&temp, "acme/blog", "2.0.0");
        let installer = installer(&temp);

        installer.install(&mut repo, &v1).unwrap();
        let path = installer.update(&mut repo, &v1, &v2).unwrap();

        assert_eq!(std::fs::read_to_string(path.join("VERSION")).unwrap(), "2.0.0");
        let record = repo.find("acme/blog").unwrap().unwrap();
        assert_eq!(record.package.descriptor.version, "2.0.0");
    }

    #[test]
    fn uninstall_removes_tree_and_empty_namespace() {
        let temp = TempDir::new().unwrap();
        let mut repo = MemoryRepository::new();
        let pkg = package(&temp, "acme/blog", "1.0.0");
        let installer = installer(&temp);

        installer.install(&mut repo, &pkg).unwrap();
        installer.uninstall(&mut repo, &pkg).unwrap();

        assert!(!temp.path().join("vendor/acme").exists());
        assert!(!repo.has("acme/blog").unwrap());
    }
}
