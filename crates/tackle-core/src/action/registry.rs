//! Static registry mapping action kinds to their constructors.
//!
//! The registry is populated once at startup; resolving an unknown kind is a
//! typed error rather than a lookup failure deep inside dispatch.

use std::fmt;

use thiserror::Error;

use super::builtin::{CopyAction, FoldersAction, LinkAction, RegisterAction};
use super::{Action, ActionContext};
use crate::types::ActionKind;

/// Builds a fresh action instance bound to one execution context.
pub type ActionFactory = Box<dyn Fn(ActionContext) -> Box<dyn Action> + Send + Sync>;

/// No implementation is registered for a declared action kind.
#[derive(Debug, Clone, Error)]
#[error("Unknown action kind '{kind}' (registered: {})", .known.join(", "))]
pub struct UnresolvedActionKind {
    pub kind: ActionKind,
    pub known: Vec<String>,
}

pub struct ActionRegistry {
    factories: Vec<(ActionKind, ActionFactory)>,
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_default_actions()
    }
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Create a registry with all built-in actions.
    pub fn with_default_actions() -> Self {
        let mut registry = Self::new();
        registry.register(FoldersAction::KIND, |ctx| Box::new(FoldersAction::new(ctx)));
        registry.register(CopyAction::KIND, |ctx| Box::new(CopyAction::new(ctx)));
        registry.register(LinkAction::KIND, |ctx| Box::new(LinkAction::new(ctx)));
        registry.register(RegisterAction::KIND, |ctx| Box::new(RegisterAction::new(ctx)));
        registry
    }

    /// Register a factory; an existing registration for the kind is replaced.
    pub fn register<F>(&mut self, kind: impl Into<ActionKind>, factory: F)
    where
        F: Fn(ActionContext) -> Box<dyn Action> + Send + Sync + 'static,
    {
        let kind = kind.into();
        let factory: ActionFactory = Box::new(factory);
        match self.factories.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => *existing = factory,
            None => self.factories.push((kind, factory)),
        }
    }

    pub fn contains(&self, kind: &ActionKind) -> bool {
        self.factories.iter().any(|(k, _)| k == kind)
    }

    /// Registered kinds, in registration order.
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Construct a new action instance for `kind`.
    pub fn resolve(
        &self,
        kind: &ActionKind,
        ctx: ActionContext,
    ) -> Result<Box<dyn Action>, UnresolvedActionKind> {
        let factory = self
            .factories
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, factory)| factory)
            .ok_or_else(|| UnresolvedActionKind {
                kind: kind.clone(),
                known: self.kinds().into_iter().map(str::to_string).collect(),
            })?;
        Ok(factory(ctx))
    }
}
