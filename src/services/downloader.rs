// src/services/downloader.rs

//! Single-file download with sha256 verification.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::FileEntry;
use crate::utils::fs::{file_sha256, path_component};

/// Downloads release files into `<root>/<package>/<version>/<filename>`.
#[derive(Clone)]
pub struct FileDownloader {
    client: Client,
    root: PathBuf,
    max_attempts: u32,
}

impl FileDownloader {
    pub fn new(client: Client, root: impl Into<PathBuf>, max_attempts: u32) -> Self {
        Self {
            client,
            root: root.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Directory holding the files of one version.
    ///
    /// Fails when either name could resolve outside the root.
    pub fn version_dir(&self, package: &str, version: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(path_component(package)?)
            .join(path_component(version)?))
    }

    /// Download and verify one file, retrying failed attempts.
    ///
    /// Any partial or mismatching file is removed before the next attempt,
    /// so nothing is left on disk when every attempt fails.
    pub async fn download(
        &self,
        package: &str,
        version: &str,
        filename: &str,
        entry: &FileEntry,
        worker: &str,
    ) -> Result<PathBuf> {
        let dir = self.version_dir(package, version)?;
        let path = dir.join(path_component(filename)?);
        tokio::fs::create_dir_all(&dir).await?;

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            log::debug!(
                "{} downloading {} (attempt {}/{})",
                worker,
                filename,
                attempt,
                self.max_attempts
            );

            match self.attempt(&entry.url, &path, &entry.sha256).await {
                Ok(()) => {
                    log::debug!("{} downloaded and verified {}", worker, filename);
                    return Ok(path);
                }
                Err(error) => {
                    log::warn!(
                        "{} download of {} failed (attempt {}/{}): {}",
                        worker,
                        filename,
                        attempt,
                        self.max_attempts,
                        error
                    );
                    discard(&path).await;
                    last_error = Some(error);
                }
            }
        }

        let error = last_error.unwrap_or_else(|| AppError::network(filename, "no attempts made"));
        log::error!(
            "{} giving up on {} after {} attempts",
            worker,
            filename,
            self.max_attempts
        );
        Err(error)
    }

    /// Stream the body to disk, then re-hash the written file.
    async fn attempt(&self, url: &str, path: &Path, expected: &str) -> Result<()> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        drop(file);

        if !expected.is_empty() {
            let actual = file_sha256(path).await?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(AppError::Integrity {
                    path: path.display().to_string(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(())
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            log::warn!("Could not remove damaged file {}: {}", path.display(), e);
        }
    }
}
