// src/storage/local.rs

//! Local filesystem storage implementation.
//!
//! Keeps the package state as a pretty-printed UTF-8 JSON object keyed by
//! package name. Writes go to a temporary sibling first and are renamed into
//! place, so an interrupted save never truncates the previous state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::PackageMap;
use crate::storage::StateStorage;

/// JSON state file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage backed by the given state file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await
    }
}

#[async_trait]
impl StateStorage for LocalStorage {
    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    async fn load(&self) -> Result<PackageMap> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AppError::persistence(&self.path, e))?;
        let packages: PackageMap =
            serde_json::from_slice(&bytes).map_err(|e| AppError::persistence(&self.path, e))?;

        log::info!("Loaded {} packages from {}", packages.len(), self.path.display());
        Ok(packages)
    }

    async fn save(&self, packages: &PackageMap) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(packages)?;
        self.write_bytes(&bytes)
            .await
            .map_err(|e| AppError::persistence(&self.path, e))?;

        log::info!("Saved {} packages to {}", packages.len(), self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FileEntry, PackageState, PackageStatus};
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn sample_map() -> PackageMap {
        let mut files = IndexMap::new();
        files.insert(
            "foo-1.2-win_amd64.whl".to_string(),
            FileEntry {
                url: "https://files.example/foo-1.2-win_amd64.whl".into(),
                sha256: "abc123".into(),
            },
        );
        let mut releases = IndexMap::new();
        releases.insert("1.2".to_string(), files);

        let checked = NaiveDate::from_ymd_opt(2025, 10, 18)
            .unwrap()
            .and_hms_micro_opt(3, 0, 0, 123_456)
            .unwrap();

        let mut map = PackageMap::new();
        map.insert(
            "foo".into(),
            PackageState {
                last_checked: Some(checked),
                last_downloaded_version: Some("1.0".into()),
                latest_version: Some("1.2".into()),
                status: PackageStatus::Outdated,
                latest_releases: releases,
            },
        );
        map.insert("bar".into(), PackageState::default());
        map
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("packages.json"));
        let map = sample_map();

        storage.save(&map).await.unwrap();
        let loaded = storage.load().await.unwrap();

        assert_eq!(loaded, map);
        assert!(!tmp.path().join("packages.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_saved_file_is_pretty_json() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("packages.json"));
        storage.save(&sample_map()).await.unwrap();

        let text = std::fs::read_to_string(storage.path()).unwrap();
        assert!(text.contains("\n  \"bar\": {"));
        assert!(text.contains("\"last_checked\": \"2025-10-18T03:00:00.123456\""));
        assert!(text.contains("\"status\": \"unset\""));
    }

    #[tokio::test]
    async fn test_load_missing_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nope.json"));

        assert!(!storage.exists().await);
        assert!(matches!(
            storage.load().await,
            Err(AppError::Persistence { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_corrupt_is_persistence_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("packages.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = LocalStorage::new(&path);
        assert!(storage.exists().await);
        assert!(matches!(
            storage.load().await,
            Err(AppError::Persistence { .. })
        ));
    }
}
