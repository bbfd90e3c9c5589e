//! Copy, link and removal helpers for files and directory trees.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Copy a file or a directory tree to `dst`, replacing whatever is there.
///
/// Directories are staged in a sibling temp directory and renamed into place.
pub fn copy_path(src: &Path, dst: &Path) -> anyhow::Result<()> {
    let meta = fs::metadata(src)
        .with_context(|| format!("Failed to stat source path: {}", src.display()))?;
    ensure_parent_dir(dst)?;

    if meta.is_file() {
        if is_symlink(dst) || dst.is_dir() {
            remove_path_if_exists(dst)?;
        }
        fs::copy(src, dst).with_context(|| {
            format!(
                "Failed to copy file from {} to {}",
                src.display(),
                dst.display()
            )
        })?;
        return Ok(());
    }

    if !meta.is_dir() {
        anyhow::bail!("Unsupported filesystem entry type at {}", src.display());
    }

    let tmp_dir = unique_temp_path(dst)?;
    fs::create_dir_all(&tmp_dir)
        .with_context(|| format!("Failed to create temp directory: {}", tmp_dir.display()))?;
    if let Err(err) = copy_tree(src, &tmp_dir) {
        let _ = fs::remove_dir_all(&tmp_dir);
        return Err(err);
    }

    remove_path_if_exists(dst).with_context(|| {
        format!("Failed to remove existing destination: {}", dst.display())
    })?;
    fs::rename(&tmp_dir, dst).with_context(|| {
        format!(
            "Failed to move temp path {} into destination {}",
            tmp_dir.display(),
            dst.display()
        )
    })?;
    Ok(())
}

/// Remove a file, symlink or directory tree. Returns whether anything was removed.
pub fn remove_path_if_exists(path: &Path) -> anyhow::Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("Failed to read metadata: {}", path.display())));
        }
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    } else {
        remove_link_or_file(path)?;
    }
    Ok(true)
}

/// Remove a directory only when it has no entries left.
pub fn remove_dir_if_empty(path: &Path) -> anyhow::Result<bool> {
    if !path.is_dir() || is_symlink(path) {
        return Ok(false);
    }
    let mut entries = fs::read_dir(path)
        .with_context(|| format!("Failed to read dir: {}", path.display()))?;
    if entries.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(path)
        .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    Ok(true)
}

/// Create a symlink at `link` pointing to `target`.
pub fn create_symlink(target: &Path, link: &Path) -> anyhow::Result<()> {
    ensure_parent_dir(link)?;
    create_symlink_raw(target, link).with_context(|| {
        format!(
            "Failed to create symlink {} -> {}",
            link.display(),
            target.display()
        )
    })
}

pub(crate) fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Destination path has no parent: {}", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create destination parent: {}", parent.display()))?;
    Ok(())
}

fn unique_temp_path(dst: &Path) -> anyhow::Result<PathBuf> {
    let parent = dst
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Destination path has no parent: {}", dst.display()))?;
    let base = dst
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Destination path has no filename: {}", dst.display()))?;

    for attempt in 0u32..1000 {
        let name = format!(
            ".{}.tmp.{}.{}",
            base.to_string_lossy(),
            std::process::id(),
            attempt
        );
        let candidate = parent.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!("Failed to allocate a unique temp path for {}", dst.display());
}

fn copy_tree(src: &Path, dst: &Path) -> anyhow::Result<()> {
    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read dir: {}", src.display()))?
    {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry: {}", src.display()))?;
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat dir entry: {}", entry.path().display()))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if ty.is_dir() {
            fs::create_dir_all(&to)
                .with_context(|| format!("Failed to create directory: {}", to.display()))?;
            copy_tree(&from, &to)?;
        } else if ty.is_file() {
            fs::copy(&from, &to).with_context(|| {
                format!(
                    "Failed to copy file from {} to {}",
                    from.display(),
                    to.display()
                )
            })?;
        } else if ty.is_symlink() {
            let target = fs::read_link(&from)
                .with_context(|| format!("Failed to read symlink: {}", from.display()))?;
            create_symlink_raw(&target, &to)
                .with_context(|| format!("Failed to recreate symlink: {}", to.display()))?;
        } else {
            anyhow::bail!("Unsupported filesystem entry type at {}", from.display());
        }
    }
    Ok(())
}

#[cfg(unix)]
fn remove_link_or_file(path: &Path) -> anyhow::Result<()> {
    fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
}

#[cfg(windows)]
fn remove_link_or_file(path: &Path) -> anyhow::Result<()> {
    // Directory symlinks on Windows are removed with remove_dir
    fs::remove_file(path)
        .or_else(|_| fs::remove_dir(path))
        .with_context(|| format!("Failed to remove file: {}", path.display()))
}

#[cfg(unix)]
fn create_symlink_raw(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink_raw(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
