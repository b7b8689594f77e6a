// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::Config;

/// Create the client used for metadata requests.
///
/// The timeout covers the whole request, metadata documents are small.
pub fn create_check_client(config: &Config) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.index.user_agent)
        .timeout(Duration::from_secs(config.check.timeout_secs))
        .danger_accept_invalid_certs(!config.index.tls_verify)
        .build()?;
    Ok(client)
}

/// Create the client used for file downloads.
///
/// Artifacts can be large, so only connecting and each body read are bounded.
pub fn create_download_client(config: &Config) -> Result<reqwest::Client> {
    let timeout = Duration::from_secs(config.download.timeout_secs);
    let client = reqwest::Client::builder()
        .user_agent(&config.index.user_agent)
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .danger_accept_invalid_certs(!config.index.tls_verify)
        .build()?;
    Ok(client)
}
