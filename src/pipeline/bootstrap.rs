// src/pipeline/bootstrap.rs

//! Seeding the state file from the package list.

use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{PackageMap, PackageState};
use crate::storage::StateStorage;

/// Seed file layouts: either an object keyed by package name or a plain list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Seed {
    Keyed(serde_json::Map<String, serde_json::Value>),
    Listed(Vec<String>),
}

impl Seed {
    fn into_names(self) -> Vec<String> {
        match self {
            Seed::Keyed(map) => map.into_iter().map(|(name, _)| name).collect(),
            Seed::Listed(names) => names,
        }
    }
}

/// Read the package names listed in a seed file.
pub async fn read_seed(path: &Path) -> Result<Vec<String>> {
    let text = tokio::fs::read_to_string(path).await?;
    let seed: Seed = serde_json::from_str(&text)?;
    Ok(seed
        .into_names()
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Make sure every seeded package has an entry in the state file.
///
/// Existing entries are kept as they are. Returns the number of packages
/// added. A missing seed is tolerated as long as a state file exists.
pub async fn run_bootstrap(seed_path: &Path, storage: &dyn StateStorage) -> Result<usize> {
    let has_state = storage.exists().await;
    let has_seed = tokio::fs::try_exists(seed_path).await.unwrap_or(false);

    if !has_seed {
        if has_state {
            log::warn!(
                "Seed file {} not found, keeping existing state",
                seed_path.display()
            );
            return Ok(0);
        }
        return Err(AppError::config(format!(
            "Neither seed file {} nor state file {} exists",
            seed_path.display(),
            storage.location()
        )));
    }

    let mut packages = if has_state {
        storage.load().await?
    } else {
        PackageMap::new()
    };

    let names = read_seed(seed_path).await?;
    let mut added = 0;
    for name in names {
        if !packages.contains_key(&name) {
            packages.insert(name, PackageState::default());
            added += 1;
        }
    }

    if added > 0 || !has_state {
        storage.save(&packages).await?;
    }
    log::info!(
        "Bootstrap added {} packages ({} tracked)",
        added,
        packages.len()
    );

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PackageStatus;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_bootstrap_from_keyed_seed() {
        let tmp = TempDir::new().unwrap();
        let seed = tmp.path().join("init_packages.json");
        std::fs::write(&seed, r#"{"requests": {}, "numpy": null}"#).unwrap();
        let storage = LocalStorage::new(tmp.path().join("packages.json"));

        let added = run_bootstrap(&seed, &storage).await.unwrap();

        assert_eq!(added, 2);
        let state = storage.load().await.unwrap();
        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["numpy", "requests"]);
        assert_eq!(state["numpy"], PackageState::default());
    }

    #[tokio::test]
    async fn test_bootstrap_is_incremental() {
        let tmp = TempDir::new().unwrap();
        let seed = tmp.path().join("init_packages.json");
        std::fs::write(&seed, r#"["requests", "flask", " "]"#).unwrap();

        let storage = LocalStorage::new(tmp.path().join("packages.json"));
        let mut existing = PackageMap::new();
        existing.insert(
            "requests".into(),
            PackageState {
                last_downloaded_version: Some("2.31.0".into()),
                status: PackageStatus::UpToDate,
                ..PackageState::default()
            },
        );
        storage.save(&existing).await.unwrap();

        let added = run_bootstrap(&seed, &storage).await.unwrap();

        assert_eq!(added, 1);
        let state = storage.load().await.unwrap();
        assert_eq!(state.len(), 2);
        assert_eq!(state["requests"], existing["requests"]);
        assert_eq!(state["flask"].status, PackageStatus::Unset);
    }

    #[tokio::test]
    async fn test_missing_seed_with_state_continues() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("packages.json"));
        storage.save(&PackageMap::new()).await.unwrap();

        let added = run_bootstrap(&tmp.path().join("absent.json"), &storage)
            .await
            .unwrap();
        assert_eq!(added, 0);
    }

    #[tokio::test]
    async fn test_missing_seed_and_state_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("packages.json"));

        let result = run_bootstrap(&tmp.path().join("absent.json"), &storage).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_read_seed_rejects_other_shapes() {
        let tmp = TempDir::new().unwrap();
        let seed = tmp.path().join("init_packages.json");
        std::fs::write(&seed, "42").unwrap();
        assert!(matches!(read_seed(&seed).await, Err(AppError::Json(_))));
    }
}
