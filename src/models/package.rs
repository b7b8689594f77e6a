// src/models/package.rs

//! Per-package mirror state as persisted in the state file.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// All tracked packages, keyed by index name.
pub type PackageMap = BTreeMap<String, PackageState>;

/// Files still pending download: version -> filename -> entry, in index order.
pub type PendingReleases = IndexMap<String, IndexMap<String, FileEntry>>;

/// Outcome of the most recent check or download for a package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Never checked
    #[default]
    Unset,
    /// Every pending file has been downloaded and verified
    UpToDate,
    /// Releases are waiting to be downloaded
    Outdated,
    /// The index rejected the package; skipped for this run
    Ignore,
    /// The index could not be reached
    #[serde(alias = "Network Error")]
    NetworkError,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::UpToDate => "up_to_date",
            Self::Outdated => "outdated",
            Self::Ignore => "ignore",
            Self::NetworkError => "network_error",
        }
    }
}

/// A single release file selected for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub url: String,

    /// Expected hex digest; empty when the index published none
    #[serde(default)]
    pub sha256: String,
}

/// Mirror state of one tracked package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageState {
    /// When the index was last queried for this package
    #[serde(default)]
    pub last_checked: Option<NaiveDateTime>,

    /// Newest version whose files were all verified on disk
    #[serde(default)]
    pub last_downloaded_version: Option<String>,

    /// Latest version reported by the index
    #[serde(default)]
    pub latest_version: Option<String>,

    #[serde(default, deserialize_with = "status_or_unset")]
    pub status: PackageStatus,

    #[serde(default)]
    pub latest_releases: PendingReleases,
}

impl PackageState {
    /// Number of files still pending download.
    pub fn pending_file_count(&self) -> usize {
        self.latest_releases.values().map(|files| files.len()).sum()
    }

    pub fn is_outdated(&self) -> bool {
        self.status == PackageStatus::Outdated
    }
}

/// Fresh bootstrap entries carry `"status": null`.
fn status_or_unset<'de, D>(deserializer: D) -> Result<PackageStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PackageStatus>::deserialize(deserializer)?.unwrap_or_default())
}
