// src/pipeline/check.rs

//! Version check phase.
//!
//! Splits the tracked packages into contiguous shards, one tokio task per
//! non-empty shard. Each task queries the index for its packages in order
//! and applies the result to the shared store. Persisting the store is left
//! to the caller.

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use reqwest::Client;
use tokio::task::JoinSet;

use crate::error::AppError;
use crate::models::{Config, PackageStatus};
use crate::services::{MetadataFetcher, PlatformClassifier};
use crate::storage::StateStore;
use crate::utils;

use super::diff::{CheckOutcome, apply_check};
use super::shard::partition_contiguous;

/// Counts of what the check phase did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub workers: usize,
    pub checked: usize,
    pub current: usize,
    pub outdated: usize,
    pub ignored: usize,
    pub network_errors: usize,
    pub inconsistent: usize,
}

impl CheckSummary {
    fn record(&mut self, outcome: &CheckOutcome) {
        self.checked += 1;
        match outcome {
            CheckOutcome::Current => self.current += 1,
            CheckOutcome::Outdated { .. } => self.outdated += 1,
            CheckOutcome::Failed(PackageStatus::Ignore) => self.ignored += 1,
            CheckOutcome::Failed(_) => self.network_errors += 1,
        }
    }

    fn merge(&mut self, other: CheckSummary) {
        self.checked += other.checked;
        self.current += other.current;
        self.outdated += other.outdated;
        self.ignored += other.ignored;
        self.network_errors += other.network_errors;
        self.inconsistent += other.inconsistent;
    }
}

/// Check every tracked package against the index.
pub async fn run_checker(
    config: Arc<Config>,
    store: Arc<StateStore>,
    client: Client,
) -> CheckSummary {
    let start = Instant::now();
    utils::log::header("Checking for new versions");

    let names = store.names();
    let shards = partition_contiguous(&names, config.check.worker_count);

    let fetcher = MetadataFetcher::new(client, config.index.url.clone(), &config.check);
    let classifier = Arc::new(PlatformClassifier::new(&config.platform));

    let mut tasks = JoinSet::new();
    for (index, shard) in shards.into_iter().enumerate() {
        if shard.is_empty() {
            continue;
        }
        tasks.spawn(check_shard(
            format!("checker-{}", index + 1),
            shard,
            fetcher.clone(),
            Arc::clone(&classifier),
            Arc::clone(&store),
        ));
    }

    let mut summary = CheckSummary {
        workers: tasks.len(),
        ..CheckSummary::default()
    };
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(shard_summary) => summary.merge(shard_summary),
            Err(e) => log::error!("Check worker stopped unexpectedly: {}", e),
        }
    }

    utils::log::summary(
        "Check complete",
        &[
            ("Workers", summary.workers.to_string()),
            ("Packages checked", summary.checked.to_string()),
            ("Up to date", summary.current.to_string()),
            ("Outdated", summary.outdated.to_string()),
            ("Ignored", summary.ignored.to_string()),
            ("Network errors", summary.network_errors.to_string()),
            ("Inconsistent", summary.inconsistent.to_string()),
            ("Elapsed", utils::log::elapsed(start.elapsed())),
        ],
    );

    summary
}

async fn check_shard(
    worker: String,
    shard: Vec<String>,
    fetcher: MetadataFetcher,
    classifier: Arc<PlatformClassifier>,
    store: Arc<StateStore>,
) -> CheckSummary {
    log::debug!("{} starting with {} packages", worker, shard.len());
    let mut summary = CheckSummary::default();

    for name in shard {
        let fetched = fetcher.fetch(&name, &worker).await;
        let now = Local::now().naive_local();

        let applied = store.update(&name, |state| {
            let result = fetched.as_ref().map_err(AppError::recorded_status);
            apply_check(&name, state, result, &classifier, now)
        });

        match applied {
            None => log::warn!("{} skipped {}: no longer tracked", worker, name),
            Some(Ok(outcome)) => {
                log_outcome(&worker, &name, &outcome, fetched.as_ref().err());
                summary.record(&outcome);
            }
            Some(Err(e)) => {
                log::error!("{} could not diff {}: {}", worker, name, e);
                summary.inconsistent += 1;
            }
        }
    }

    summary
}

fn log_outcome(worker: &str, name: &str, outcome: &CheckOutcome, error: Option<&AppError>) {
    match outcome {
        CheckOutcome::Current => log::info!("{} {} is up to date", worker, name),
        CheckOutcome::Outdated {
            latest_version,
            versions,
            files,
        } => log::info!(
            "{} {} is outdated: latest {}, {} versions with {} files pending",
            worker,
            name,
            latest_version,
            versions,
            files
        ),
        CheckOutcome::Failed(status) => match error {
            Some(e) => log::warn!("{} {} marked {}: {}", worker, name, status.as_str(), e),
            None => log::warn!("{} {} marked {}", worker, name, status.as_str()),
        },
    }
}
