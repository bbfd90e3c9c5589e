//! Operation sets computed from one or two action maps.

use serde::Serialize;

use crate::action::{ActionMap, Operation};
use crate::types::{ActionConfig, ActionKind};

/// A single unit of work for one action kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum LifecycleOperation {
    Install {
        kind: ActionKind,
        config: ActionConfig,
    },
    Update {
        kind: ActionKind,
        old_config: ActionConfig,
        new_config: ActionConfig,
    },
    Uninstall {
        kind: ActionKind,
        config: ActionConfig,
    },
}

impl LifecycleOperation {
    pub fn kind(&self) -> &ActionKind {
        match self {
            Self::Install { kind, .. } | Self::Update { kind, .. } | Self::Uninstall { kind, .. } => {
                kind
            }
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::Install { .. } => Operation::Install,
            Self::Update { .. } => Operation::Update,
            Self::Uninstall { .. } => Operation::Uninstall,
        }
    }
}

/// Operations needed to move a package from one action map to another.
///
/// Every kind of either map lands in exactly one group. Groups run in field
/// order: uninstalls, installs, updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePlan {
    pub uninstall: Vec<LifecycleOperation>,
    pub install: Vec<LifecycleOperation>,
    pub update: Vec<LifecycleOperation>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.uninstall.is_empty() && self.install.is_empty() && self.update.is_empty()
    }

    pub fn len(&self) -> usize {
        self.uninstall.len() + self.install.len() + self.update.len()
    }

    /// All operations in dispatch order.
    pub fn operations(&self) -> impl Iterator<Item = &LifecycleOperation> {
        self.uninstall
            .iter()
            .chain(self.install.iter())
            .chain(self.update.iter())
    }
}

/// Install every declared action, in declaration order.
pub fn plan_install(map: &ActionMap) -> Vec<LifecycleOperation> {
    map.iter()
        .map(|(kind, config)| LifecycleOperation::Install {
            kind: kind.clone(),
            config: config.clone(),
        })
        .collect()
}

/// Uninstall every declared action, in declaration order.
pub fn plan_uninstall(map: &ActionMap) -> Vec<LifecycleOperation> {
    map.iter()
        .map(|(kind, config)| LifecycleOperation::Uninstall {
            kind: kind.clone(),
            config: config.clone(),
        })
        .collect()
}

/// Diff two action maps by kind.
///
/// - kinds only in `initial` are uninstalled, in `initial` order
/// - kinds only in `target` are installed, in `target` order
/// - kinds in both are updated with old and new config, in `initial` order
pub fn plan_update(initial: &ActionMap, target: &ActionMap) -> UpdatePlan {
    let mut plan = UpdatePlan::default();

    for (kind, config) in initial.iter() {
        match target.get(kind) {
            None => plan.uninstall.push(LifecycleOperation::Uninstall {
                kind: kind.clone(),
                config: config.clone(),
            }),
            Some(new_config) => plan.update.push(LifecycleOperation::Update {
                kind: kind.clone(),
                old_config: config.clone(),
                new_config: new_config.clone(),
            }),
        }
    }

    for (kind, config) in target.iter() {
        if !initial.contains(kind) {
            plan.install.push(LifecycleOperation::Install {
                kind: kind.clone(),
                config: config.clone(),
            });
        }
    }

    plan
}
