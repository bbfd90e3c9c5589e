//! JSON state files written with tmp + rename.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Load a JSON document, returning `T::default()` when the file is absent.
pub fn read_json_or_default<T>(path: &Path) -> anyhow::Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read state file: {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Serialize `value` and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("State path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create state directory: {}", parent.display()))?;

    // Serialize first so a failure never leaves a truncated file behind
    let bytes = serde_json::to_vec_pretty(value).context("Failed to serialize state file")?;

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("State path has no filename: {}", path.display()))?;
    let tmp_path = parent.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        std::process::id()
    ));
    fs::write(&tmp_path, bytes)
        .with_context(|| format!("Failed to write tmp state file: {}", tmp_path.display()))?;

    // Remove target first on Windows for replace semantics
    if cfg!(windows) && path.exists() {
        fs::remove_file(path).with_context(|| {
            format!("Failed to remove existing state file: {}", path.display())
        })?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to rename tmp state file: {}", tmp_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_default() {
        let temp = TempDir::new().unwrap();
        let loaded: BTreeMap<String, String> =
            read_json_or_default(&temp.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn write_creates_parent_and_leaves_no_tmp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state").join("owners.json");
        let mut value = BTreeMap::new();
        value.insert("alpha".to_string(), "1".to_string());

        write_json_atomic(&path, &value).unwrap();

        let loaded: BTreeMap<String, String> = read_json_or_default(&path).unwrap();
        assert_eq!(loaded, value);
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
