// src/services/platform.rs

//! Platform classification of release filenames.
//!
//! Filenames are matched against an ordered keyword table; the first
//! platform with a matching keyword wins. The download decision then
//! applies the configured whitelist or blacklist.

use crate::models::{DownloadMode, PlatformConfig, PlatformKeywords};

/// Filenames starting with this prefix never count as `mac` ("machine" contains "mac").
const MAC_FALSE_POSITIVE_PREFIX: &str = "machine";

/// Decide whether a file of the given platform should be downloaded.
///
/// Unknown platforms fall back to `allow_unknown`.
pub fn decide(
    platform: Option<&str>,
    mode: DownloadMode,
    platforms: &[String],
    allow_unknown: bool,
) -> bool {
    let Some(platform) = platform else {
        return allow_unknown;
    };

    let listed = platforms.iter().any(|p| p.eq_ignore_ascii_case(platform));
    match mode {
        DownloadMode::Whitelist => listed,
        DownloadMode::Blacklist => !listed,
    }
}

/// Classifies filenames and applies the download policy.
#[derive(Debug, Clone)]
pub struct PlatformClassifier {
    mode: DownloadMode,
    platforms: Vec<String>,
    allow_unknown: bool,
    keywords: Vec<PlatformKeywords>,
}

impl PlatformClassifier {
    /// Create a classifier from the platform configuration.
    pub fn new(config: &PlatformConfig) -> Self {
        let keywords = config
            .keywords
            .iter()
            .map(|entry| PlatformKeywords {
                platform: entry.platform.to_lowercase(),
                keywords: entry.keywords.iter().map(|k| k.to_lowercase()).collect(),
            })
            .collect();

        Self {
            mode: config.download_mode,
            platforms: config.platforms.clone(),
            allow_unknown: config.allow_unknown_platform_download,
            keywords,
        }
    }

    /// Guess the platform of a release file, `None` if unrecognized.
    pub fn classify(&self, filename: &str) -> Option<&str> {
        let name = filename.to_lowercase();

        self.keywords
            .iter()
            .filter(|entry| {
                !(entry.platform == "mac" && name.starts_with(MAC_FALSE_POSITIVE_PREFIX))
            })
            .find(|entry| entry.keywords.iter().any(|kw| name.contains(kw.as_str())))
            .map(|entry| entry.platform.as_str())
    }

    /// Whether a release file passes the platform policy.
    pub fn should_download(&self, filename: &str) -> bool {
        let platform = self.classify(filename);
        let accepted = decide(platform, self.mode, &self.platforms, self.allow_unknown);
        log::debug!(
            "{} -> platform {:?}, {:?} => {}",
            filename,
            platform,
            self.mode,
            if accepted { "download" } else { "skip" }
        );
        accepted
    }
}
