//! Host integration: the surface a dependency engine calls into.
//!
//! The shim owns everything around the orchestrator: which package types are
//! handled, where packages live on disk, the primary (library) install step,
//! and the check that the shared config installer is available before any
//! action runs.

pub mod installer;
pub mod library;
pub mod repository;
pub mod types;

use std::path::{Path, PathBuf};

pub use installer::{ActionInstaller, LifecycleError, LifecycleOutcome, PackageInstaller};
pub use library::{InstallPathResolver, LibraryInstaller};
pub use repository::{FileRepository, InstalledPackage, InstalledRepository, MemoryRepository};
pub use types::SupportedTypes;

/// Host-level paths shared by the shim and handed to every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
    project_root: PathBuf,
    vendor_dir: PathBuf,
}

impl HostContext {
    pub fn new(project_root: PathBuf, vendor_dir: PathBuf) -> Self {
        Self {
            project_root,
            vendor_dir,
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn vendor_dir(&self) -> &Path {
        &self.vendor_dir
    }
}
