// src/pipeline/workflow.rs

//! Phase sequencing for the `check` and `run` commands.

use std::path::Path;
use std::sync::Arc;

use chrono::Local;

use crate::error::Result;
use crate::models::Config;
use crate::storage::{LocalStorage, StateStorage, StateStore};
use crate::utils::{self, http};

use super::archive::create_daily_archive;
use super::bootstrap::run_bootstrap;
use super::check::{CheckSummary, run_checker};
use super::cleanup::remove_empty_dirs;
use super::download::run_downloader;

/// Load the state, check every package and persist the result.
pub async fn run_check(config: Arc<Config>, storage: &dyn StateStorage) -> Result<CheckSummary> {
    config.validate()?;
    let store = Arc::new(StateStore::new(storage.load().await?));
    let client = http::create_check_client(&config)?;

    let summary = run_checker(config, Arc::clone(&store), client).await;
    storage.save(&store.snapshot()).await?;

    Ok(summary)
}

/// Run the full pipeline: init, check, download, cleanup and archive.
///
/// An invalid config or a failed bootstrap stops the run; check and download
/// failures are logged and the remaining steps still run.
pub async fn run_pipeline(config: Arc<Config>, data_dir: &Path, skip_archive: bool) -> Result<()> {
    config.validate()?;
    utils::log::header("Starting mirror pipeline");

    let storage = LocalStorage::new(config.paths.state_path(data_dir));
    let download_root = config.paths.download_path(data_dir);
    let total_steps = if skip_archive { 4 } else { 5 };

    utils::log::step(1, total_steps, "Init - Seeding package state");
    run_bootstrap(&config.paths.seed_path(data_dir), &storage).await?;

    utils::log::step(2, total_steps, "Check - Querying the index");
    if let Err(e) = run_check(Arc::clone(&config), &storage).await {
        log::error!("Check phase failed: {}", e);
    }

    utils::log::step(3, total_steps, "Download - Fetching new releases");
    let client = http::create_download_client(&config)?;
    if let Err(e) = run_downloader(Arc::clone(&config), &storage, client, &download_root).await {
        log::error!("Download phase failed: {}", e);
    }

    utils::log::step(4, total_steps, "Cleanup - Removing empty directories");
    remove_empty_dirs(&download_root)?;

    if !skip_archive {
        utils::log::step(5, total_steps, "Archive - Bundling downloads");
        let archive_dir = config.paths.archive_path(data_dir);
        create_daily_archive(&download_root, &archive_dir, Local::now().date_naive())?;
    }

    log::info!("Pipeline complete");
    Ok(())
}
