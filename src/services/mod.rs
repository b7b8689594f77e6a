// src/services/mod.rs

//! Service layer for the mirror application.
//!
//! This module contains the building blocks used by the pipeline:
//! - Metadata fetching with classified retries (`MetadataFetcher`)
//! - Platform classification of release files (`PlatformClassifier`)
//! - Verified file downloads (`FileDownloader`)

mod downloader;
mod fetcher;
pub mod platform;

pub use downloader::FileDownloader;
pub use fetcher::MetadataFetcher;
pub use platform::{PlatformClassifier, decide};
