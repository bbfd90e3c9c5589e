//! Relative path validation for declared destinations.

use std::path::{Component, Path, PathBuf};

/// Reject absolute paths, `..` components, and paths naming the base itself.
pub fn ensure_relative_path(path: &Path) -> anyhow::Result<()> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("Empty paths are not allowed");
    }
    if path.is_absolute() {
        anyhow::bail!("Absolute paths are not allowed: {}", path.display());
    }
    for component in path.components() {
        match component {
            Component::ParentDir => {
                anyhow::bail!("Path traversal is not allowed: {}", path.display());
            }
            Component::Prefix(_) | Component::RootDir => {
                anyhow::bail!("Absolute paths are not allowed: {}", path.display());
            }
            _ => {}
        }
    }
    if !path.components().any(|c| matches!(c, Component::Normal(_))) {
        anyhow::bail!("Path must name an entry below its base: {}", path.display());
    }
    Ok(())
}

/// Join a declared relative path onto a base directory after validating it.
pub fn join_relative(base: &Path, relative: &str) -> anyhow::Result<PathBuf> {
    let relative = Path::new(relative);
    ensure_relative_path(relative)?;
    Ok(base.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_paths() {
        assert!(ensure_relative_path(Path::new("public/assets/app.css")).is_ok());
        assert!(ensure_relative_path(Path::new("./public")).is_ok());
    }

    #[test]
    fn rejects_traversal_and_absolute_paths() {
        assert!(ensure_relative_path(Path::new("../outside")).is_err());
        assert!(ensure_relative_path(Path::new("public/../../etc")).is_err());
        assert!(ensure_relative_path(Path::new("/etc/passwd")).is_err());
        assert!(ensure_relative_path(Path::new("")).is_err());
    }

    #[test]
    fn rejects_paths_resolving_to_the_base() {
        assert!(ensure_relative_path(Path::new(".")).is_err());
        assert!(ensure_relative_path(Path::new("./")).is_err());
        assert!(ensure_relative_path(Path::new("././.")).is_err());
        assert!(join_relative(Path::new("/srv/app"), ".").is_err());
    }

    #[test]
    fn join_relative_stays_under_base() {
        let base = Path::new("/srv/app");
        let joined = join_relative(base, "public/blog").unwrap();
        assert_eq!(joined, PathBuf::from("/srv/app/public/blog"));
        assert!(join_relative(base, "../blog").is_err());
    }
}
