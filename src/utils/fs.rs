// src/utils/fs.rs

//! File system utilities.

use std::path::{Component, Path};

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::{AppError, Result};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Lower-case hex SHA-256 of a file, streamed from disk.
pub async fn file_sha256(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Remove a directory tree and recreate it empty.
pub async fn reset_dir(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

/// Remove a directory tree, ignoring a missing one.
pub async fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Check that an index-supplied name is a single plain path component.
///
/// Rejects empty names, `.`/`..`, absolute paths and anything containing a
/// separator, so joining it below a root can never leave that root.
pub fn path_component(name: &str) -> Result<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(name),
        _ => Err(AppError::validation(format!(
            "'{}' is not a plain file or directory name",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_sha256() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test.txt");
        std::fs::write(&path, b"hello world").unwrap();

        assert_eq!(
            file_sha256(&path).await.unwrap(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_file_sha256_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.txt");
        std::fs::write(&path, b"").unwrap();

        assert_eq!(
            file_sha256(&path).await.unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[tokio::test]
    async fn test_reset_dir() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("packages");
        std::fs::create_dir_all(root.join("foo/1.0")).unwrap();
        std::fs::write(root.join("foo/1.0/foo.whl"), b"x").unwrap();

        reset_dir(&root).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);

        // Missing directories are simply created.
        let fresh = temp.path().join("fresh");
        reset_dir(&fresh).await.unwrap();
        assert!(fresh.is_dir());
    }

    #[test]
    fn test_path_component() {
        assert_eq!(path_component("foo-1.0-win32.whl").unwrap(), "foo-1.0-win32.whl");
        assert_eq!(path_component("1.0rc1").unwrap(), "1.0rc1");

        for bad in ["", ".", "..", "../escaped.whl", "a/b", "/etc/passwd", "foo/"] {
            assert!(
                matches!(path_component(bad), Err(AppError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_remove_dir_if_exists() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gone");
        std::fs::create_dir_all(&dir).unwrap();

        assert!(remove_dir_if_exists(&dir).await.unwrap());
        assert!(!remove_dir_if_exists(&dir).await.unwrap());
    }
}
