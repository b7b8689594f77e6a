// src/models/metadata.rs

//! Package metadata as published by the index JSON API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `info` block of the per-package JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexInfo {
    pub version: String,
}

/// Digests published for a release file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Digests {
    #[serde(default)]
    pub sha256: Option<String>,
}

/// A downloadable artifact of a release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexFile {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub digests: Digests,
}

impl IndexFile {
    /// Expected sha256, empty when the index did not publish one.
    pub fn sha256(&self) -> &str {
        self.digests.sha256.as_deref().unwrap_or("")
    }
}

/// Wire shape of the per-package JSON document.
#[derive(Debug, Deserialize)]
struct RawMetadata {
    info: IndexInfo,
    #[serde(default)]
    releases: IndexMap<String, Vec<IndexFile>>,
}

/// One published version and its files.
#[derive(Debug, Clone)]
pub struct Release {
    pub version: String,
    pub files: Vec<IndexFile>,
}

/// Release history in index order (assumed upload-chronological).
#[derive(Debug, Clone, Default)]
pub struct ReleaseHistory(Vec<Release>);

impl ReleaseHistory {
    pub fn new(releases: Vec<Release>) -> Self {
        Self(releases)
    }

    /// Position of a version in the listing.
    pub fn position(&self, version: &str) -> Option<usize> {
        self.0.iter().position(|r| r.version == version)
    }

    pub fn releases(&self) -> &[Release] {
        &self.0
    }
}

/// Full release metadata for one package.
#[derive(Debug, Clone)]
pub struct IndexMetadata {
    /// Latest published version
    pub latest_version: String,
    pub history: ReleaseHistory,
}

impl IndexMetadata {
    /// Parse the index JSON document, keeping the `releases` key order.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let raw: RawMetadata = serde_json::from_str(text)?;
        let releases = raw
            .releases
            .into_iter()
            .map(|(version, files)| Release { version, files })
            .collect();

        Ok(Self {
            latest_version: raw.info.version,
            history: ReleaseHistory::new(releases),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "info": {"version": "2.3.3", "summary": "ignored"},
        "releases": {
            "2.3.2": [
                {
                    "filename": "pandas-2.3.2-cp310-cp310-win_amd64.whl",
                    "url": "https://files.example/pandas-2.3.2-cp310-cp310-win_amd64.whl",
                    "digests": {"md5": "x", "sha256": "52bc29a9"},
                    "size": 11539648
                }
            ],
            "10.0": [],
            "2.3.3": [
                {"filename": "pandas-2.3.3.tar.gz", "url": "https://files.example/pandas-2.3.3.tar.gz", "digests": {}}
            ]
        }
    }"#;

    #[test]
    fn test_parse_keeps_listing_order() {
        let meta = IndexMetadata::from_json(SAMPLE).unwrap();
        assert_eq!(meta.latest_version, "2.3.3");

        let versions: Vec<&str> = meta
            .history
            .releases()
            .iter()
            .map(|r| r.version.as_str())
            .collect();
        assert_eq!(versions, vec!["2.3.2", "10.0", "2.3.3"]);
        assert_eq!(meta.history.position("2.3.3"), Some(2));
        assert_eq!(meta.history.position("9.9"), None);
    }

    #[test]
    fn test_missing_digest_is_empty() {
        let meta = IndexMetadata::from_json(SAMPLE).unwrap();
        let releases = meta.history.releases();
        assert_eq!(releases[2].files[0].sha256(), "");
        assert_eq!(releases[0].files[0].sha256(), "52bc29a9");
    }

    #[test]
    fn test_missing_info_is_error() {
        assert!(IndexMetadata::from_json(r#"{"releases": {}}"#).is_err());
    }
}
