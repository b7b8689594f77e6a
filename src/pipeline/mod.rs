// src/pipeline/mod.rs

//! Pipeline entry points for mirror operations.
//!
//! - `run_bootstrap`: Seed the state file from the package list
//! - `run_checker`: Diff the index against the state (check phase)
//! - `run_downloader`: Fetch and verify pending files (download phase)
//! - `remove_empty_dirs` / `create_daily_archive`: Post-download housekeeping
//! - `run_pipeline`: All of the above in order

pub mod archive;
pub mod bootstrap;
pub mod check;
pub mod cleanup;
pub mod diff;
pub mod download;
pub mod shard;
pub mod workflow;

pub use archive::create_daily_archive;
pub use bootstrap::run_bootstrap;
pub use check::{CheckSummary, run_checker};
pub use cleanup::remove_empty_dirs;
pub use download::{DownloadSummary, run_downloader};
pub use workflow::{run_check, run_pipeline};
