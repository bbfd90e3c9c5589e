//! Ownership tracking for registry entries written on behalf of packages.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fs::{read_json_or_default, write_json_atomic};

/// Hash of an entry value, independent of object key order.
pub fn hash_json(value: &Value) -> String {
    let normalized = normalize_json(value);
    let bytes = serde_json::to_vec(&normalized).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

/// Merge `desired` into `existing`, honouring what the package owns.
///
/// Owned keys are replaced or removed only while their current value still
/// matches the recorded hash. Keys owned by nobody are never overwritten,
/// unless they already hold exactly the desired value.
pub fn merge_owned_map(
    existing: &Map<String, Value>,
    desired: &Map<String, Value>,
    ownership: &BTreeMap<String, String>,
) -> anyhow::Result<Map<String, Value>> {
    let mut merged = existing.clone();

    for (key, desired_value) in desired {
        match (ownership.get(key), existing.get(key)) {
            (Some(expected_hash), Some(existing_value)) => {
                if hash_json(existing_value) != *expected_hash {
                    anyhow::bail!("Refusing to overwrite user-modified entry: {}", key);
                }
            }
            (None, Some(existing_value)) => {
                if existing_value != desired_value {
                    anyhow::bail!("Entry '{}' already exists and is not managed by tackle", key);
                }
            }
            (_, None) => {}
        }
        merged.insert(key.clone(), desired_value.clone());
    }

    for (key, expected_hash) in ownership {
        if desired.contains_key(key) {
            continue;
        }
        if let Some(existing_value) = existing.get(key) {
            if hash_json(existing_value) != *expected_hash {
                anyhow::bail!("Refusing to remove user-modified entry: {}", key);
            }
            merged.remove(key);
        }
    }

    Ok(merged)
}

fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            let mut normalized = Map::new();
            for key in keys {
                if let Some(child) = map.get(key) {
                    normalized.insert(key.clone(), normalize_json(child));
                }
            }
            Value::Object(normalized)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalize_json).collect()),
        _ => value.clone(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OwnershipState {
    #[serde(default)]
    sections: BTreeMap<String, OwnedSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OwnedSection {
    package: String,
    section: String,
    hashes: BTreeMap<String, String>,
}

/// Persists which registry entries each package owns.
#[derive(Debug, Clone)]
pub struct OwnershipStore {
    path: PathBuf,
}

impl OwnershipStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(
        &self,
        registry_path: &Path,
        package: &str,
        section: &str,
    ) -> anyhow::Result<BTreeMap<String, String>> {
        let state = self.read()?;
        let key = ownership_key(registry_path, package, section);
        Ok(state
            .sections
            .get(&key)
            .map(|owned| owned.hashes.clone())
            .unwrap_or_default())
    }

    /// Record ownership; an empty set of hashes drops the record.
    pub fn save(
        &self,
        registry_path: &Path,
        package: &str,
        section: &str,
        hashes: BTreeMap<String, String>,
    ) -> anyhow::Result<()> {
        let mut state = self.read()?;
        let key = ownership_key(registry_path, package, section);
        if hashes.is_empty() {
            state.sections.remove(&key);
        } else {
            state.sections.insert(
                key,
                OwnedSection {
                    package: package.to_string(),
                    section: section.to_string(),
                    hashes,
                },
            );
        }
        write_json_atomic(&self.path, &state).context("Failed to save ownership state")
    }

    /// Sections of the registry a package currently owns entries in.
    pub fn sections_for(&self, registry_path: &Path, package: &str) -> anyhow::Result<Vec<String>> {
        let state = self.read()?;
        let mut sections: Vec<String> = state
            .sections
            .iter()
            .filter(|(key, owned)| {
                owned.package == package
                    && **key == ownership_key(registry_path, package, &owned.section)
            })
            .map(|(_, owned)| owned.section.clone())
            .collect();
        sections.sort();
        Ok(sections)
    }

    fn read(&self) -> anyhow::Result<OwnershipState> {
        read_json_or_default(&self.path).context("Failed to load ownership state")
    }
}

fn ownership_key(registry_path: &Path, package: &str, section: &str) -> String {
    let mut key = registry_path.to_string_lossy().to_string();
    key.push('#');
    key.push_str(package);
    key.push('#');
    key.push_str(section);
    blake3::hash(key.as_bytes()).to_hex().to_string()
}
