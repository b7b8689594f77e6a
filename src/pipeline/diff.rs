// src/pipeline/diff.rs

//! Version diffing and platform filtering.
//!
//! Turns a fetch result plus the prior state of a package into the updated
//! state: which releases appeared since the last mirrored version and which
//! of their files pass the platform policy.

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::error::{AppError, Result};
use crate::models::{
    FileEntry, IndexMetadata, PackageState, PackageStatus, PendingReleases, Release,
    ReleaseHistory,
};
use crate::services::PlatformClassifier;

/// What a check did to a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The fetch failed; the status records why
    Failed(PackageStatus),
    /// Already mirrored the latest version
    Current,
    /// New releases are pending download
    Outdated {
        latest_version: String,
        versions: usize,
        files: usize,
    },
}

/// Releases published after `last_downloaded` up to and including `latest`.
///
/// Without a previous download only the latest release is taken; older
/// history is not backfilled.
pub fn new_versions<'a>(
    package: &str,
    history: &'a ReleaseHistory,
    last_downloaded: Option<&str>,
    latest: &str,
) -> Result<&'a [Release]> {
    let end = history
        .position(latest)
        .ok_or_else(|| AppError::consistency(package, latest))?;

    let start = match last_downloaded {
        Some(last) => {
            history
                .position(last)
                .ok_or_else(|| AppError::consistency(package, last))?
                + 1
        }
        None => end,
    };

    // A latest version listed before the last download yields nothing new.
    Ok(history.releases().get(start..=end).unwrap_or(&[]))
}

/// Keep only files accepted by the platform policy, dropping empty versions.
pub fn filter_releases(releases: &[Release], classifier: &PlatformClassifier) -> PendingReleases {
    let mut pending = PendingReleases::new();

    for release in releases {
        let files: IndexMap<String, FileEntry> = release
            .files
            .iter()
            .filter(|file| classifier.should_download(&file.filename))
            .map(|file| {
                (
                    file.filename.clone(),
                    FileEntry {
                        url: file.url.clone(),
                        sha256: file.sha256().to_string(),
                    },
                )
            })
            .collect();

        if !files.is_empty() {
            pending.insert(release.version.clone(), files);
        }
    }

    pending
}

/// Apply a check result to a package's state.
///
/// On a consistency error the state is left untouched.
pub fn apply_check(
    package: &str,
    state: &mut PackageState,
    fetched: std::result::Result<&IndexMetadata, PackageStatus>,
    classifier: &PlatformClassifier,
    now: NaiveDateTime,
) -> Result<CheckOutcome> {
    let metadata = match fetched {
        Ok(metadata) => metadata,
        Err(status) => {
            state.status = status;
            state.last_checked = Some(now);
            return Ok(CheckOutcome::Failed(status));
        }
    };

    let latest = metadata.latest_version.as_str();
    if state.last_downloaded_version.as_deref() == Some(latest) {
        state.last_checked = Some(now);
        return Ok(CheckOutcome::Current);
    }

    let releases = new_versions(
        package,
        &metadata.history,
        state.last_downloaded_version.as_deref(),
        latest,
    )?;
    // Latest listed before the last download: the newest release was
    // withdrawn, and the mirror already holds it.
    if releases.is_empty() {
        state.last_checked = Some(now);
        return Ok(CheckOutcome::Current);
    }

    let pending = filter_releases(releases, classifier);

    let outcome = CheckOutcome::Outdated {
        latest_version: latest.to_string(),
        versions: pending.len(),
        files: pending.values().map(|files| files.len()).sum(),
    };

    state.status = PackageStatus::Outdated;
    state.latest_version = Some(latest.to_string());
    state.latest_releases = pending;
    state.last_checked = Some(now);

    Ok(outcome)
}
