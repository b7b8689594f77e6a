// src/utils/mod.rs

//! Utility functions and helpers.

pub mod fs;
pub mod http;
pub mod log;

use url::Url;

use crate::error::Result;

/// Build the JSON metadata endpoint of a package on the index.
pub fn metadata_url(index_url: &str, package: &str) -> Result<Url> {
    let mut base = Url::parse(index_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!("pypi/{}/json", package))?)
}
