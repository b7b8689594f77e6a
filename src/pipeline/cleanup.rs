// src/pipeline/cleanup.rs

//! Post-download cleanup of the artifact tree.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

/// Remove every empty directory below `root`, deepest first.
///
/// The root itself is kept. Returns how many directories were removed.
pub fn remove_empty_dirs(root: &Path) -> Result<usize> {
    if !root.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let is_empty = std::fs::read_dir(entry.path())?.next().is_none();
        if is_empty {
            std::fs::remove_dir(entry.path())?;
            log::debug!("Removed empty directory {}", entry.path().display());
            removed += 1;
        }
    }

    log::info!("Removed {} empty directories under {}", removed, root.display());
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_removes_nested_empty_dirs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("foo/1.2")).unwrap();
        std::fs::create_dir_all(root.join("bar/1.0")).unwrap();
        std::fs::write(root.join("bar/1.0/bar-1.0.whl"), b"x").unwrap();
        std::fs::create_dir_all(root.join("bar/1.1")).unwrap();

        let removed = remove_empty_dirs(root).unwrap();

        assert_eq!(removed, 3);
        assert!(!root.join("foo").exists());
        assert!(!root.join("bar/1.1").exists());
        assert!(root.join("bar/1.0/bar-1.0.whl").exists());
        assert!(root.is_dir());
    }

    #[test]
    fn test_missing_root() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(remove_empty_dirs(&tmp.path().join("nope")).unwrap(), 0);
    }
}
