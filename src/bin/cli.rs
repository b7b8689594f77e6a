// src/bin/cli.rs

//! pkgmirror CLI
//!
//! Local execution entry point for the package mirror.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use pkgmirror::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    storage::{LocalStorage, StateStorage},
    utils::{self, http},
};

/// pkgmirror - Platform-filtered PyPI mirror
#[derive(Parser, Debug)]
#[command(
    name = "pkgmirror",
    version,
    about = "Mirror new releases of selected PyPI packages"
)]
struct Cli {
    /// Directory holding the seed, state, downloads and archives
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Path to the config file (default: {data_dir}/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add packages from the seed file to the state file
    Init,

    /// Query the index and record new versions
    Check,

    /// Download the files of outdated packages
    Download,

    /// Remove empty directories from the download tree
    Cleanup,

    /// Bundle the download tree into a dated archive
    Archive,

    /// Run full pipeline: Init → Check → Download → Cleanup → Archive
    Run {
        /// Stop after cleanup
        #[arg(long)]
        skip_archive: bool,
    },

    /// Validate the configuration file
    Validate,

    /// Show state file statistics
    Info,
}

/// Initialize logging; `RUST_LOG` still overrides the default filter.
///
/// With a log directory every line also goes to a per-run file there.
fn init_logging(verbose: bool, level: &str, log_dir: Option<&Path>) -> Option<PathBuf> {
    let level = if verbose { "debug" } else { level };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    let mut log_file = None;
    if let Some(dir) = log_dir {
        match utils::log::create_run_log(dir, Local::now().naive_local()) {
            Ok((path, file)) => {
                let tee = utils::log::Tee::new(std::io::stderr(), file);
                builder.target(env_logger::Target::Pipe(Box::new(tee)));
                log_file = Some(path);
            }
            Err(e) => eprintln!("Could not create log file in {}: {}", dir.display(), e),
        }
    }

    builder.init();
    log_file
}

/// Fail fast on a configuration the pipeline cannot run with.
fn require_valid(config: &Config) -> Result<()> {
    config.validate().inspect_err(|e| {
        log::error!("Config validation failed: {}. Run 'validate' for details.", e);
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("config.toml"));
    // Loaded before logging exists, so a load failure is reported below.
    let loaded = Config::load(&config_path);
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    let log_file = init_logging(
        cli.verbose,
        &config.logging.level,
        config.logging.log_path(&cli.data_dir).as_deref(),
    );

    if let Some(path) = log_file {
        log::info!("Logging to {}", path.display());
    }
    match &loaded {
        Ok(_) => log::info!("Loaded configuration from {}", config_path.display()),
        Err(e) => log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
    }

    if matches!(
        cli.command,
        Command::Init | Command::Check | Command::Download | Command::Run { .. }
    ) {
        require_valid(&config)?;
    }

    let config = Arc::new(config);
    let storage = LocalStorage::new(config.paths.state_path(&cli.data_dir));
    let download_root = config.paths.download_path(&cli.data_dir);

    match cli.command {
        Command::Init => {
            let seed_path = config.paths.seed_path(&cli.data_dir);
            let added = pipeline::run_bootstrap(&seed_path, &storage).await?;
            log::info!("{} packages added to {}", added, storage.location());
        }

        Command::Check => {
            if !storage.exists().await {
                return Err(AppError::config(format!(
                    "State file {} not found. Run 'init' first.",
                    storage.location()
                )));
            }
            pipeline::run_check(Arc::clone(&config), &storage).await?;
        }

        Command::Download => {
            let client = http::create_download_client(&config)?;
            pipeline::run_downloader(Arc::clone(&config), &storage, client, &download_root)
                .await?;
        }

        Command::Cleanup => {
            pipeline::remove_empty_dirs(&download_root)?;
        }

        Command::Archive => {
            let archive_dir = config.paths.archive_path(&cli.data_dir);
            match pipeline::create_daily_archive(
                &download_root,
                &archive_dir,
                Local::now().date_naive(),
            )? {
                Some(path) => log::info!("Archive written to {}", path.display()),
                None => log::info!("Nothing to archive"),
            }
        }

        Command::Run { skip_archive } => {
            pipeline::run_pipeline(Arc::clone(&config), &cli.data_dir, skip_archive).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let seed_path = config.paths.seed_path(&cli.data_dir);
            match pipeline::bootstrap::read_seed(&seed_path).await {
                Ok(names) => log::info!("✓ Seed OK ({} packages)", names.len()),
                Err(e) => log::warn!("Seed file {}: {}", seed_path.display(), e),
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Data directory: {}", cli.data_dir.display());

            if !storage.exists().await {
                log::info!("No state file yet.");
                return Ok(());
            }

            let packages = storage.load().await?;
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for state in packages.values() {
                *counts.entry(state.status.as_str()).or_default() += 1;
            }
            let pending: usize = packages.values().map(|s| s.pending_file_count()).sum();

            log::info!("Tracked packages: {}", packages.len());
            for (status, count) in counts {
                log::info!("  {}: {}", status, count);
            }
            log::info!("Files pending download: {}", pending);
        }
    }

    log::info!("Done!");

    Ok(())
}
