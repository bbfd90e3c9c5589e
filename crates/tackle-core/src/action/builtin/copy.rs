use std::path::PathBuf;

use super::{PathPair, parse_path_pairs};
use crate::action::{Action, ActionContext};
use crate::fs::{copy_path, join_relative, remove_path_if_exists};
use crate::types::{ActionConfig, PackageIdentity};

/// Copies files or directories from the package into the shared target root.
///
/// Config: `{ "assets": "public/blog", "config/app.yml": "config/blog.yml" }`.
#[derive(Debug)]
pub struct CopyAction {
    ctx: ActionContext,
}

impl CopyAction {
    pub const KIND: &'static str = "Copy";

    pub fn new(ctx: ActionContext) -> Self {
        Self { ctx }
    }

    fn destination(&self, pair: &PathPair) -> anyhow::Result<PathBuf> {
        join_relative(self.ctx.target_root(), &pair.destination)
    }

    fn copy_all(&self, pairs: &[PathPair]) -> anyhow::Result<()> {
        for pair in pairs {
            let source = join_relative(self.ctx.package_path(), &pair.source)?;
            if !source.exists() {
                anyhow::bail!(
                    "Copy source does not exist in package: {}",
                    source.display()
                );
            }
            copy_path(&source, &self.destination(pair)?)?;
        }
        Ok(())
    }
}

impl Action for CopyAction {
    fn install(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        let pairs = parse_path_pairs(Self::KIND, config)?;
        self.copy_all(&pairs)?;
        self.ctx.diagnostics.info(&format!(
            "Copied {} path(s) for {}",
            pairs.len(),
            package.name()
        ));
        Ok(())
    }

    fn update(
        &self,
        _package: &PackageIdentity,
        old_config: &ActionConfig,
        new_config: &ActionConfig,
    ) -> anyhow::Result<()> {
        let old = parse_path_pairs(Self::KIND, old_config)?;
        let new = parse_path_pairs(Self::KIND, new_config)?;
        for pair in old
            .iter()
            .filter(|o| !new.iter().any(|n| n.destination == o.destination))
        {
            remove_path_if_exists(&self.destination(pair)?)?;
        }
        self.copy_all(&new)
    }

    fn uninstall(&self, _package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        for pair in parse_path_pairs(Self::KIND, config)? {
            remove_path_if_exists(&self.destination(&pair)?)?;
        }
        Ok(())
    }
}
