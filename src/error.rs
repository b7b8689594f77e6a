// src/error.rs

//! Unified error handling for the mirror application.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::models::PackageStatus;

/// Result type alias for mirror operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Directory traversal failed
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Archive could not be written
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connectivity, timeout or server error that survived every retry
    #[error("Network error for {context}: {message}")]
    Network { context: String, message: String },

    /// Non-retryable client error; the package is skipped for this run
    #[error("Ignored {context}: index answered HTTP {status}")]
    Ignored { context: String, status: u16 },

    /// Downloaded content does not match the published digest
    #[error("Integrity error for {path}: expected sha256 {expected}, got {actual}")]
    Integrity {
        path: String,
        expected: String,
        actual: String,
    },

    /// A version the diff relies on is missing from the release listing
    #[error("Consistency error for {package}: version {version} not in release listing")]
    Consistency { package: String, version: String },

    /// State file could not be read or written
    #[error("Persistence error for {path}: {message}")]
    Persistence { path: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a network error with context.
    pub fn network(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a consistency error.
    pub fn consistency(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Consistency {
            package: package.into(),
            version: version.into(),
        }
    }

    /// Create a persistence error for a state file.
    pub fn persistence(path: &Path, message: impl fmt::Display) -> Self {
        Self::Persistence {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Status recorded on a package whose metadata fetch failed with this error.
    ///
    /// Only non-retryable client errors are ignored; everything else counts
    /// as a network error so the package is retried on the next run.
    pub fn recorded_status(&self) -> PackageStatus {
        match self {
            Self::Ignored { .. } => PackageStatus::Ignore,
            _ => PackageStatus::NetworkError,
        }
    }
}
