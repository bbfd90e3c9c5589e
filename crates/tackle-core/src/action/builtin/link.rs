use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{PathPair, parse_path_pairs};
use crate::action::{Action, ActionContext};
use crate::fs::tree::is_symlink;
use crate::fs::{create_symlink, join_relative, remove_path_if_exists};
use crate::types::{ActionConfig, PackageIdentity};

/// Symlinks package paths into the shared target root.
///
/// Config: `{ "bin/blog": "bin/blog" }`. Links always point at the absolute
/// source path. Only symlinks are ever removed; regular files at a destination
/// are left alone.
#[derive(Debug)]
pub struct LinkAction {
    ctx: ActionContext,
}

impl LinkAction {
    pub const KIND: &'static str = "Link";

    pub fn new(ctx: ActionContext) -> Self {
        Self { ctx }
    }

    fn destination(&self, pair: &PathPair) -> anyhow::Result<PathBuf> {
        join_relative(self.ctx.target_root(), &pair.destination)
    }

    fn link_all(&self, pairs: &[PathPair]) -> anyhow::Result<()> {
        for pair in pairs {
            let source = join_relative(self.ctx.package_path(), &pair.source)?;
            if !source.exists() {
                anyhow::bail!(
                    "Link source does not exist in package: {}",
                    source.display()
                );
            }
            let source = std::fs::canonicalize(&source)
                .with_context(|| format!("Failed to resolve link source: {}", source.display()))?;
            let destination = self.destination(pair)?;
            if is_symlink(&destination) {
                if std::fs::read_link(&destination).ok().as_deref() == Some(source.as_path()) {
                    continue;
                }
                anyhow::bail!(
                    "Destination is a symlink to another location: {}",
                    destination.display()
                );
            }
            if destination.exists() {
                anyhow::bail!(
                    "Destination already exists and is not a link: {}",
                    destination.display()
                );
            }
            create_symlink(&source, &destination)?;
        }
        Ok(())
    }

    fn unlink(&self, package: &PackageIdentity, destination: &Path) -> anyhow::Result<()> {
        if is_symlink(destination) {
            remove_path_if_exists(destination)?;
        } else if destination.exists() {
            self.ctx.diagnostics.warning(&format!(
                "{} is not a link created by {} and was kept",
                destination.display(),
                package.name()
            ));
        }
        Ok(())
    }
}

impl Action for LinkAction {
    fn install(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        let pairs = parse_path_pairs(Self::KIND, config)?;
        self.link_all(&pairs)?;
        self.ctx.diagnostics.info(&format!(
            "Linked {} path(s) for {}",
            pairs.len(),
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
        // Old links may point into a previous install path, so all are replaced
        for pair in parse_path_pairs(Self::KIND, old_config)? {
            self.unlink(package, &self.destination(&pair)?)?;
        }
        self.link_all(&parse_path_pairs(Self::KIND, new_config)?)
    }

    fn uninstall(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        for pair in parse_path_pairs(Self::KIND, config)? {
            self.unlink(package, &self.destination(&pair)?)?;
        }
        Ok(())
    }
}
