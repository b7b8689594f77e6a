// src/pipeline/download.rs

//! Download phase.
//!
//! Reloads the persisted state, wipes the download root and fetches every
//! pending file of the outdated packages. Packages are split evenly across
//! the workers; within a package versions and files go in listing order and
//! the first failing file stops the package.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use reqwest::Client;
use tokio::task::JoinSet;

use crate::error::{AppError, Result};
use crate::models::{Config, PackageState, PackageStatus};
use crate::services::FileDownloader;
use crate::storage::{StateStorage, StateStore};
use crate::utils;
use crate::utils::fs::{remove_dir_if_exists, reset_dir};

use super::shard::partition_even;

/// Counts of what the download phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub workers: usize,
    pub packages: usize,
    pub completed: usize,
    pub failed: usize,
    pub files_total: usize,
    /// Files verified on disk
    pub files_downloaded: usize,
    /// Files verified, given up on or skipped after a failure in their package
    pub files_processed: usize,
}

/// Shared by the workers of one download phase.
struct Progress {
    processed: AtomicUsize,
    verified: AtomicUsize,
    total: usize,
    show: bool,
}

impl Progress {
    fn file_verified(&self, worker: &str, package: &str, version: &str, filename: &str) {
        self.verified.fetch_add(1, Ordering::Relaxed);
        let done = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.show {
            log::info!(
                "{} [{}/{}] {} {} {}",
                worker,
                done,
                self.total,
                package,
                version,
                filename
            );
        }
    }

    /// A failed file plus the files of its package that will not be tried.
    fn files_abandoned(&self, worker: &str, package: &str, count: usize) {
        let done = self.processed.fetch_add(count, Ordering::Relaxed) + count;
        if self.show {
            log::info!(
                "{} [{}/{}] {}: {} files not downloaded",
                worker,
                done,
                self.total,
                package,
                count
            );
        }
    }
}

/// Download everything the last check marked as outdated.
pub async fn run_downloader(
    config: Arc<Config>,
    storage: &dyn StateStorage,
    client: Client,
    download_root: &Path,
) -> Result<DownloadSummary> {
    let start = Instant::now();
    utils::log::header("Downloading new releases");

    let store = Arc::new(StateStore::new(storage.load().await?));

    reset_dir(download_root).await?;
    log::info!("Cleared download directory {}", download_root.display());

    let names = store.names_where(PackageState::is_outdated);
    let files_total: usize = names
        .iter()
        .filter_map(|name| store.get(name))
        .map(|state| state.pending_file_count())
        .sum();

    if names.is_empty() {
        log::info!("No outdated packages, nothing to download");
        return Ok(DownloadSummary::default());
    }
    log::info!(
        "{} outdated packages, {} files to download",
        names.len(),
        files_total
    );

    let downloader = FileDownloader::new(client, download_root, config.download.max_attempts);
    let progress = Arc::new(Progress {
        processed: AtomicUsize::new(0),
        verified: AtomicUsize::new(0),
        total: files_total,
        show: config.logging.show_progress,
    });

    let mut tasks = JoinSet::new();
    for (index, shard) in partition_even(&names, config.download.worker_count)
        .into_iter()
        .enumerate()
    {
        if shard.is_empty() {
            continue;
        }
        tasks.spawn(download_shard(
            format!("downloader-{}", index + 1),
            shard,
            downloader.clone(),
            Arc::clone(&store),
            Arc::clone(&progress),
        ));
    }

    let mut summary = DownloadSummary {
        workers: tasks.len(),
        packages: names.len(),
        files_total,
        ..DownloadSummary::default()
    };
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((completed, failed)) => {
                summary.completed += completed;
                summary.failed += failed;
            }
            Err(e) => log::error!("Download worker stopped unexpectedly: {}", e),
        }
    }
    summary.files_downloaded = progress.verified.load(Ordering::Relaxed);
    summary.files_processed = progress.processed.load(Ordering::Relaxed);

    storage.save(&store.snapshot()).await?;

    utils::log::summary(
        "Download complete",
        &[
            ("Workers", summary.workers.to_string()),
            ("Packages completed", summary.completed.to_string()),
            ("Packages failed", summary.failed.to_string()),
            (
                "Files processed",
                format!("{}/{}", summary.files_processed, summary.files_total),
            ),
            ("Files verified", summary.files_downloaded.to_string()),
            ("Elapsed", utils::log::elapsed(start.elapsed())),
        ],
    );

    Ok(summary)
}

/// Returns the number of packages completed and failed.
async fn download_shard(
    worker: String,
    shard: Vec<String>,
    downloader: FileDownloader,
    store: Arc<StateStore>,
    progress: Arc<Progress>,
) -> (usize, usize) {
    let (mut completed, mut failed) = (0, 0);

    for name in shard {
        match download_package(&worker, &name, &downloader, &store, &progress).await {
            Ok(()) => completed += 1,
            Err(e) => {
                log::error!("{} {} left outdated: {}", worker, name, e);
                failed += 1;
            }
        }
    }

    (completed, failed)
}

async fn download_package(
    worker: &str,
    name: &str,
    downloader: &FileDownloader,
    store: &StateStore,
    progress: &Progress,
) -> Result<()> {
    // Work from a copy so no lock is held while downloading.
    let Some(state) = store.get(name) else {
        return Ok(());
    };

    let mut completed: Vec<String> = Vec::new();
    let mut failure: Option<(String, AppError)> = None;
    let mut verified = 0;

    'versions: for (version, files) in &state.latest_releases {
        for (filename, entry) in files {
            match downloader
                .download(name, version, filename, entry, worker)
                .await
            {
                Ok(_) => {
                    verified += 1;
                    progress.file_verified(worker, name, version, filename);
                }
                Err(e) => {
                    let abandoned = state.pending_file_count() - verified;
                    progress.files_abandoned(worker, name, abandoned);
                    failure = Some((version.clone(), e));
                    break 'versions;
                }
            }
        }
        completed.push(version.clone());
    }

    let Some((failed_version, error)) = failure else {
        store.update(name, |state| {
            if let Some(version) = state.latest_version.clone().or(completed.pop()) {
                state.last_downloaded_version = Some(version);
            }
            state.status = PackageStatus::UpToDate;
            state.latest_releases.clear();
        });
        log::info!("{} {} is up to date", worker, name);
        return Ok(());
    };

    // An unsafe name never got a directory, so there is nothing to remove.
    if let Ok(version_dir) = downloader.version_dir(name, &failed_version) {
        if let Err(e) = remove_dir_if_exists(&version_dir).await {
            log::warn!(
                "{} could not remove {}: {}",
                worker,
                version_dir.display(),
                e
            );
        }
    }

    store.update(name, |state| {
        for version in &completed {
            state.latest_releases.shift_remove(version);
        }
        if let Some(last) = completed.last() {
            state.last_downloaded_version = Some(last.clone());
        }
        state.status = PackageStatus::Outdated;
    });

    Err(error)
}
