//! Ordered mapping from action kind to its declared configuration.

use crate::types::{ActionConfig, ActionKind};

/// Actions declared by one package version, in declaration order.
///
/// Kinds are unique. Inserting a kind that is already present replaces its
/// configuration but keeps the position of the first declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionMap {
    entries: Vec<(ActionKind, ActionConfig)>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: ActionKind, config: ActionConfig) -> Option<ActionConfig> {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, existing)) => Some(std::mem::replace(existing, config)),
            None => {
                self.entries.push((kind, config));
                None
            }
        }
    }

    pub fn get(&self, kind: &ActionKind) -> Option<&ActionConfig> {
        self.entries
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, config)| config)
    }

    pub fn contains(&self, kind: &ActionKind) -> bool {
        self.entries.iter().any(|(k, _)| k == kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ActionKind> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActionKind, &ActionConfig)> {
        self.entries.iter().map(|(k, c)| (k, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ActionKind, ActionConfig)> for ActionMap {
    fn from_iter<I: IntoIterator<Item = (ActionKind, ActionConfig)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (kind, config) in iter {
            map.insert(kind, config);
        }
        map
    }
}
