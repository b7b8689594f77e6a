// src/models/mod.rs

//! Domain models for the mirror application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod metadata;
mod package;

// Re-export all public types
pub use config::{
    CheckConfig, Config, DownloadConfig, DownloadMode, IndexConfig, LoggingConfig, PathsConfig,
    PlatformConfig, PlatformKeywords,
};
pub use metadata::{IndexFile, IndexMetadata, Release, ReleaseHistory};
pub use package::{FileEntry, PackageMap, PackageState, PackageStatus, PendingReleases};
