// src/services/fetcher.rs

//! Package metadata fetcher.
//!
//! Queries the index JSON API for one package and classifies failures:
//!
//! | failure                      | retry | backoff               | recorded as     |
//! |------------------------------|-------|-----------------------|-----------------|
//! | connection error             | yes   | `base * 2^attempt`    | `network_error` |
//! | timeout                      | yes   | `base`                | `network_error` |
//! | HTTP 429/500/502/503/504     | yes   | `base * 2^attempt`    | `network_error` |
//! | other HTTP error (e.g. 404)  | no    | -                     | `ignore`        |
//! | anything else                | no    | -                     | `network_error` |

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{AppError, Result};
use crate::models::{CheckConfig, IndexMetadata};
use crate::utils::metadata_url;

/// HTTP statuses worth retrying.
const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// How a failed attempt should be handled.
#[derive(Debug)]
enum Attempt {
    /// Retry after `base * 2^attempt`
    Exponential(AppError),
    /// Retry after `base`
    Fixed(AppError),
    /// Give up immediately
    Abort(AppError),
}

impl Attempt {
    /// Wait before the next try after failed attempt `attempt` (0-based),
    /// or `None` when the failure is final.
    fn delay(&self, base: Duration, attempt: u32) -> Option<Duration> {
        match self {
            Self::Exponential(_) => Some(base.saturating_mul(2u32.saturating_pow(attempt))),
            Self::Fixed(_) => Some(base),
            Self::Abort(_) => None,
        }
    }

    fn into_error(self) -> AppError {
        match self {
            Self::Exponential(error) | Self::Fixed(error) | Self::Abort(error) => error,
        }
    }
}

/// Fetches package metadata from the index.
#[derive(Clone)]
pub struct MetadataFetcher {
    client: Client,
    index_url: String,
    max_attempts: u32,
    base_delay: Duration,
}

impl MetadataFetcher {
    /// Create a fetcher for the given index.
    pub fn new(client: Client, index_url: impl Into<String>, config: &CheckConfig) -> Self {
        Self {
            client,
            index_url: index_url.into(),
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Fetch the full release metadata of a package.
    ///
    /// Errors map to a package status through [`AppError::recorded_status`].
    pub async fn fetch(&self, package: &str, worker: &str) -> Result<IndexMetadata> {
        let url = metadata_url(&self.index_url, package)?;

        for attempt in 0..self.max_attempts {
            log::debug!(
                "{} fetching {} (attempt {}/{})",
                worker,
                package,
                attempt + 1,
                self.max_attempts
            );

            let outcome = match self.try_fetch(url.as_str(), package).await {
                Ok(metadata) => {
                    log::debug!(
                        "{} fetched {} (latest {})",
                        worker,
                        package,
                        metadata.latest_version
                    );
                    return Ok(metadata);
                }
                Err(outcome) => outcome,
            };

            let is_last = attempt + 1 >= self.max_attempts;
            let delay = outcome.delay(self.base_delay, attempt);
            let error = outcome.into_error();
            let Some(delay) = delay else {
                log::error!("{} failed to fetch {}: {}", worker, package, error);
                return Err(error);
            };

            if is_last {
                log::error!(
                    "{} giving up on {} after {} attempts: {}",
                    worker,
                    package,
                    self.max_attempts,
                    error
                );
                return Err(AppError::network(package, error));
            }

            log::warn!(
                "{} fetch of {} failed (attempt {}/{}), retrying in {:?}: {}",
                worker,
                package,
                attempt + 1,
                self.max_attempts,
                delay,
                error
            );
            tokio::time::sleep(delay).await;
        }

        Err(AppError::network(package, "no attempts made"))
    }

    /// Single request, classified on failure.
    async fn try_fetch(
        &self,
        url: &str,
        package: &str,
    ) -> std::result::Result<IndexMetadata, Attempt> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, package));
        }

        let text = response.text().await.map_err(classify_transport)?;
        IndexMetadata::from_json(&text).map_err(|e| Attempt::Abort(e.into()))
    }
}

fn classify_transport(error: reqwest::Error) -> Attempt {
    if error.is_timeout() {
        Attempt::Fixed(error.into())
    } else if error.is_connect() {
        Attempt::Exponential(error.into())
    } else {
        Attempt::Abort(AppError::network("request", error))
    }
}

fn classify_status(status: StatusCode, package: &str) -> Attempt {
    if RETRYABLE_STATUSES.contains(&status.as_u16()) {
        Attempt::Exponential(AppError::network(package, format!("HTTP {}", status)))
    } else {
        Attempt::Abort(AppError::Ignored {
            context: package.to_string(),
            status: status.as_u16(),
        })
    }
}
