// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Package index endpoint and HTTP settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Version check phase settings
    #[serde(default)]
    pub check: CheckConfig,

    /// Download phase settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Platform filtering rules
    #[serde(default)]
    pub platform: PlatformConfig,

    /// File locations, relative to the data directory
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.index.url.trim().is_empty() {
            return Err(AppError::validation("index.url is empty"));
        }
        if self.index.user_agent.trim().is_empty() {
            return Err(AppError::validation("index.user_agent is empty"));
        }
        if self.check.worker_count == 0 {
            return Err(AppError::validation("check.worker_count must be > 0"));
        }
        if self.check.timeout_secs == 0 {
            return Err(AppError::validation("check.timeout_secs must be > 0"));
        }
        if self.check.max_attempts == 0 {
            return Err(AppError::validation("check.max_attempts must be > 0"));
        }
        if self.download.worker_count == 0 {
            return Err(AppError::validation("download.worker_count must be > 0"));
        }
        if self.download.timeout_secs == 0 {
            return Err(AppError::validation("download.timeout_secs must be > 0"));
        }
        if self.download.max_attempts == 0 {
            return Err(AppError::validation("download.max_attempts must be > 0"));
        }
        self.platform.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            check: CheckConfig::default(),
            download: DownloadConfig::default(),
            platform: PlatformConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Package index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Base URL of the index; metadata lives at `{url}/pypi/{name}/json`
    #[serde(default = "defaults::index_url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Verify TLS certificates
    #[serde(default = "defaults::tls_verify")]
    pub tls_verify: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: defaults::index_url(),
            user_agent: defaults::user_agent(),
            tls_verify: defaults::tls_verify(),
        }
    }
}

/// Version check phase settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Number of concurrent check workers
    #[serde(default = "defaults::check_workers")]
    pub worker_count: usize,

    /// Metadata request timeout in seconds
    #[serde(default = "defaults::check_timeout")]
    pub timeout_secs: u64,

    /// Attempts per metadata request
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Base delay for retry backoff in milliseconds
    #[serde(default = "defaults::retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            worker_count: defaults::check_workers(),
            timeout_secs: defaults::check_timeout(),
            max_attempts: defaults::max_attempts(),
            retry_base_delay_ms: defaults::retry_base_delay(),
        }
    }
}

/// Download phase settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Number of concurrent download workers
    #[serde(default = "defaults::download_workers")]
    pub worker_count: usize,

    /// Connect/idle timeout for file downloads in seconds
    #[serde(default = "defaults::download_timeout")]
    pub timeout_secs: u64,

    /// Attempts per file
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            worker_count: defaults::download_workers(),
            timeout_secs: defaults::download_timeout(),
            max_attempts: defaults::max_attempts(),
        }
    }
}

/// Whether `platforms` lists what to keep or what to skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    Whitelist,
    Blacklist,
}

/// Keywords identifying one platform in release filenames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformKeywords {
    /// Platform label (e.g., "windows")
    pub platform: String,

    /// Lower-case substrings matched against filenames
    pub keywords: Vec<String>,
}

/// Platform filtering rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "defaults::download_mode")]
    pub download_mode: DownloadMode,

    /// Platforms the mode applies to
    #[serde(default = "defaults::platforms")]
    pub platforms: Vec<String>,

    /// Download files whose platform cannot be recognized
    #[serde(default = "defaults::allow_unknown")]
    pub allow_unknown_platform_download: bool,

    /// Ordered keyword table; the first matching platform wins
    #[serde(default = "defaults::platform_keywords")]
    pub keywords: Vec<PlatformKeywords>,
}

impl PlatformConfig {
    fn validate(&self) -> Result<()> {
        if self.keywords.is_empty() {
            return Err(AppError::validation("No platform keywords defined"));
        }
        if self.platforms.is_empty() {
            return Err(AppError::validation("platform.platforms is empty"));
        }
        for platform in &self.platforms {
            let known = self
                .keywords
                .iter()
                .any(|k| k.platform.eq_ignore_ascii_case(platform));
            if !known {
                return Err(AppError::validation(format!(
                    "Unknown platform '{}': no keywords defined for it",
                    platform
                )));
            }
        }
        Ok(())
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            download_mode: defaults::download_mode(),
            platforms: defaults::platforms(),
            allow_unknown_platform_download: defaults::allow_unknown(),
            keywords: defaults::platform_keywords(),
        }
    }
}

/// Data file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON seed listing package names to track
    #[serde(default = "defaults::seed_file")]
    pub seed_file: String,

    /// Persisted package state
    #[serde(default = "defaults::state_file")]
    pub state_file: String,

    /// Root of the downloaded artifact tree
    #[serde(default = "defaults::download_dir")]
    pub download_dir: String,

    /// Where dated archives are written
    #[serde(default = "defaults::archive_dir")]
    pub archive_dir: String,
}

impl PathsConfig {
    pub fn seed_path(&self, base: &Path) -> PathBuf {
        base.join(&self.seed_file)
    }

    pub fn state_path(&self, base: &Path) -> PathBuf {
        base.join(&self.state_file)
    }

    pub fn download_path(&self, base: &Path) -> PathBuf {
        base.join(&self.download_dir)
    }

    pub fn archive_path(&self, base: &Path) -> PathBuf {
        base.join(&self.archive_dir)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seed_file: defaults::seed_file(),
            state_file: defaults::state_file(),
            download_dir: defaults::download_dir(),
            archive_dir: defaults::archive_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Log a line per finished download
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,

    /// Directory for per-run log files, relative to the data directory;
    /// empty disables file logging
    #[serde(default = "defaults::log_dir")]
    pub log_dir: String,
}

impl LoggingConfig {
    pub fn log_path(&self, base: &Path) -> Option<PathBuf> {
        let dir = self.log_dir.trim();
        (!dir.is_empty()).then(|| base.join(dir))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_progress: defaults::show_progress(),
            log_dir: defaults::log_dir(),
        }
    }
}

mod defaults {
    use super::{DownloadMode, PlatformKeywords};

    // Index defaults
    pub fn index_url() -> String {
        "https://pypi.org".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pkgmirror/0.1)".into()
    }
    pub fn tls_verify() -> bool {
        true
    }

    // Check defaults
    pub fn check_workers() -> usize {
        10
    }
    pub fn check_timeout() -> u64 {
        8
    }
    pub fn max_attempts() -> u32 {
        3
    }
    pub fn retry_base_delay() -> u64 {
        1000
    }

    // Download defaults
    pub fn download_workers() -> usize {
        2
    }
    pub fn download_timeout() -> u64 {
        15
    }

    // Platform defaults
    pub fn download_mode() -> DownloadMode {
        DownloadMode::Whitelist
    }
    pub fn platforms() -> Vec<String> {
        vec!["windows".into(), "linux".into()]
    }
    pub fn allow_unknown() -> bool {
        true
    }
    pub fn platform_keywords() -> Vec<PlatformKeywords> {
        vec![
            PlatformKeywords {
                platform: "windows".to_string(),
                keywords: vec![
                    "win32".into(),
                    "win64".into(),
                    "windows".into(),
                    "pywin".into(),
                    "pypiwin32".into(),
                ],
            },
            PlatformKeywords {
                platform: "mac".to_string(),
                keywords: vec!["mac".into(), "osx".into(), "darwin".into()],
            },
            PlatformKeywords {
                platform: "linux".to_string(),
                keywords: vec![
                    "linux".into(),
                    "ubuntu".into(),
                    "debian".into(),
                    "centos".into(),
                    "fedora".into(),
                ],
            },
        ]
    }

    // Path defaults
    pub fn seed_file() -> String {
        "init_packages.json".into()
    }
    pub fn state_file() -> String {
        "packages.json".into()
    }
    pub fn download_dir() -> String {
        "packages".into()
    }
    pub fn archive_dir() -> String {
        "archives".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_progress() -> bool {
        true
    }
    pub fn log_dir() -> String {
        "logs".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.check.worker_count, 10);
        assert_eq!(config.download.worker_count, 2);
        assert_eq!(config.platform.download_mode, DownloadMode::Whitelist);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [platform]
            download_mode = "blacklist"
            platforms = ["mac"]

            [check]
            worker_count = 4
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.platform.download_mode, DownloadMode::Blacklist);
        assert_eq!(config.platform.platforms, vec!["mac".to_string()]);
        assert_eq!(config.check.worker_count, 4);
        assert_eq!(config.check.max_attempts, 3);
        assert_eq!(config.index.url, "https://pypi.org");
        assert_eq!(config.platform.keywords.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_keyword_table_order() {
        let toml = r#"
            [platform]
            platforms = ["linux"]

            [[platform.keywords]]
            platform = "linux"
            keywords = ["manylinux"]

            [[platform.keywords]]
            platform = "windows"
            keywords = ["win_amd64"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let order: Vec<&str> = config
            .platform
            .keywords
            .iter()
            .map(|k| k.platform.as_str())
            .collect();
        assert_eq!(order, vec!["linux", "windows"]);
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        let mut config = Config::default();
        config.platform.platforms = vec!["solaris".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = Config::default();
        config.download.worker_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mode_fails_to_parse() {
        let toml = r#"
            [platform]
            download_mode = "greylist"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[check]\nworker_count = 4\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.check.worker_count, 4);
        assert_eq!(config.download.worker_count, 2);
        assert!(Config::load(tmp.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_paths_are_relative_to_base() {
        let paths = PathsConfig::default();
        let base = Path::new("/srv/mirror");
        assert_eq!(paths.state_path(base), base.join("packages.json"));
        assert_eq!(paths.download_path(base), base.join("packages"));

        let mut logging = LoggingConfig::default();
        assert_eq!(logging.log_path(base), Some(base.join("logs")));
        logging.log_dir = String::new();
        assert_eq!(logging.log_path(base), None);
    }
}
