use std::path::PathBuf;

use anyhow::Context;

use super::parse_config;
use crate::action::{Action, ActionContext};
use crate::fs::{join_relative, remove_dir_if_empty};
use crate::types::{ActionConfig, PackageIdentity};

/// Creates folders under the shared target root.
///
/// Config: `["var/cache", "var/log"]`. Removal never deletes folders that
/// still hold content.
#[derive(Debug)]
pub struct FoldersAction {
    ctx: ActionContext,
}

impl FoldersAction {
    pub const KIND: &'static str = "Folders";

    pub fn new(ctx: ActionContext) -> Self {
        Self { ctx }
    }

    fn folders(&self, config: &ActionConfig) -> anyhow::Result<Vec<PathBuf>> {
        let declared: Vec<String> = parse_config(Self::KIND, config)?;
        declared
            .iter()
            .map(|folder| join_relative(self.ctx.target_root(), folder))
            .collect()
    }

    fn create(&self, folders: &[PathBuf]) -> anyhow::Result<()> {
        for folder in folders {
            std::fs::create_dir_all(folder)
                .with_context(|| format!("Failed to create folder: {}", folder.display()))?;
        }
        Ok(())
    }

    fn remove(&self, package: &PackageIdentity, folders: &[PathBuf]) -> anyhow::Result<()> {
        // Deepest first so nested declarations empty their parents
        let mut ordered: Vec<&PathBuf> = folders.iter().collect();
        ordered.sort_by_key(|folder| std::cmp::Reverse(folder.components().count()));
        for folder in ordered {
            if folder.exists() && !remove_dir_if_empty(folder)? {
                self.ctx.diagnostics.warning(&format!(
                    "Folder {} declared by {} is not empty and was kept",
                    folder.display(),
                    package.name()
                ));
            }
        }
        Ok(())
    }
}

impl Action for FoldersAction {
    fn install(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        let folders = self.folders(config)?;
        self.create(&folders)?;
        self.ctx.diagnostics.info(&format!(
            "Created {} folder(s) for {}",
            folders.len(),
            package.name()
        ));
        Ok(())
    }

    fn update(
        &self,
        package: &PackageIdentity,
        old_config: &ActionConfig,
        new_config: &ActionConfig,
    ) -> anyhow::Result<()> {
        let old = self.folders(old_config)?;
        let new = self.folders(new_config)?;
        let dropped: Vec<PathBuf> = old.into_iter().filter(|f| !new.contains(f)).collect();
        self.remove(package, &dropped)?;
        self.create(&new)
    }

    fn uninstall(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        let folders = self.folders(config)?;
        self.remove(package, &folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::builtin::testutil::{Fixture, identity};
    use crate::diagnostics::Level;
    use serde_json::json;

    #[test]
    fn install_creates_declared_folders() {
        let fx = Fixture::new();
        let pkg = fx.package_dir("acme/blog");
        let action = FoldersAction::new(fx.context(&pkg));

        action
            .install(&identity("acme/blog", "1.0.0"), &json!(["var/cache", "uploads"]))
            .unwrap();

        assert!(fx.public().join("var/cache").is_dir());
        assert!(fx.public().join("uploads").is_dir());
    }

    #[test]
    fn uninstall_keeps_non_empty_folders() {
        let fx = Fixture::new();
        let pkg = fx.package_dir("acme/blog");
        let action = FoldersAction::new(fx.context(&pkg));
        let id = identity("acme/blog", "1.0.0");
        let config = json!(["var", "var/cache", "uploads"]);

        action.install(&id, &config).unwrap();
        std::fs::write(fx.public().join("uploads/photo.jpg"), "x").unwrap();
        action.uninstall(&id, &config).unwrap();

        assert!(!fx.public().join("var").exists());
        assert!(fx.public().join("uploads/photo.jpg").exists());
        assert_eq!(fx.diagnostics.messages(Level::Warning).len(), 1);
    }

    #[test]
    fn update_removes_dropped_and_creates_new() {
        let fx = Fixture::new();
        let pkg = fx.package_dir("acme/blog");
        let action = FoldersAction::new(fx.context(&pkg));
        let id = identity("acme/blog", "2.0.0");

        action.install(&id, &json!(["old"])).unwrap();
        action.update(&id, &json!(["old"]), &json!(["new"])).unwrap();

        assert!(!fx.public().join("old").exists());
        assert!(fx.public().join("new").is_dir());
    }

    #[test]
    fn rejects_traversal() {
        let fx = Fixture::new();
        let pkg = fx.package_dir("acme/blog");
        let action = FoldersAction::new(fx.context(&pkg));

        let err = action
            .install(&identity("acme/blog", "1.0.0"), &json!(["../escape"]))
            .unwrap_err();
        assert!(err.to_string().contains("traversal"));
    }
}
