use serde_json::{Map, Value};

use super::parse_config;
use crate::action::{Action, ActionContext};
use crate::types::{ActionConfig, PackageIdentity};

/// Registers configuration entries through the shared config installer.
///
/// Config: `{ "settings": { "blog.title": "Blog" }, "routes": { "/blog": "blog.index" } }`.
#[derive(Debug)]
pub struct RegisterAction {
    ctx: ActionContext,
}

impl RegisterAction {
    pub const KIND: &'static str = "Register";

    pub fn new(ctx: ActionContext) -> Self {
        Self { ctx }
    }

    fn sections(config: &ActionConfig) -> anyhow::Result<Map<String, Value>> {
        let sections: Map<String, Value> = parse_config(Self::KIND, config)?;
        for (section, entries) in &sections {
            if !entries.is_object() {
                anyhow::bail!(
                    "Invalid configuration for action '{}': section '{}' must be an object",
                    Self::KIND,
                    section
                );
            }
        }
        Ok(sections)
    }

    fn register_all(
        &self,
        package: &PackageIdentity,
        sections: &Map<String, Value>,
    ) -> anyhow::Result<()> {
        let empty = Map::new();
        for (section, entries) in sections {
            let entries = entries.as_object().unwrap_or(&empty);
            self.ctx
                .installer
                .register(package.name(), section, entries)?;
        }
        Ok(())
    }
}

impl Action for RegisterAction {
    fn install(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        let sections = Self::sections(config)?;
        self.register_all(package, &sections)?;
        self.ctx.diagnostics.info(&format!(
            "Registered {} section(s) for {}",
            sections.len(),
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
        let old = Self::sections(old_config)?;
        let new = Self::sections(new_config)?;
        for section in old.keys().filter(|section| !new.contains_key(*section)) {
            self.ctx.installer.unregister(package.name(), section)?;
        }
        self.register_all(package, &new)
    }

    fn uninstall(&self, package: &PackageIdentity, config: &ActionConfig) -> anyhow::Result<()> {
        for section in Self::sections(config)?.keys() {
            self.ctx.installer.unregister(package.name(), section)?;
        }
        Ok(())
    }
}
