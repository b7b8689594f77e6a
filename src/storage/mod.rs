// src/storage/mod.rs

//! Storage abstractions for package state persistence.
//!
//! The state file is read and written wholesale, only while no workers run:
//! once before the check phase, after it, and after the download phase.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── config.toml           # Mirror configuration
//! ├── init_packages.json    # Seed: package names to track
//! ├── packages.json         # Persisted package state
//! ├── packages/             # Downloaded artifacts (wiped per download phase)
//! │   └── {package}/{version}/{filename}
//! ├── archives/
//! │   └── packages_YYYY-MM-DD.zip
//! └── logs/
//!     └── log_YYYYmmdd_HHMMSS.txt
//! ```

pub mod local;
pub mod store;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::PackageMap;

// Re-export for convenience
pub use local::LocalStorage;
pub use store::StateStore;

/// Trait for package state backends.
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Whether a persisted state exists.
    async fn exists(&self) -> bool;

    /// Load the full state map.
    async fn load(&self) -> Result<PackageMap>;

    /// Replace the persisted state with `packages`.
    async fn save(&self, packages: &PackageMap) -> Result<()>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
