// src/lib.rs

//! pkgmirror Library
//!
//! Keeps a local mirror of selected PyPI packages: a concurrent check phase
//! polls the index and records pending releases, a concurrent download phase
//! fetches and verifies them.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
