//! # assetpin
//!
//! Publishes new asset bundles to a pinning service and records the
//! returned addresses per network.
//!
//! ## Commands
//!
//! - `store`: Upload every asset with no recorded address
//! - `status`: Show published and pending assets
//! - `pending`: Print pending asset ids
//!
//! ## Example
//!
//! ```bash
//! # See what would be uploaded
//! assetpin --network rinkeby store --dry-run
//!
//! # Upload, four at a time
//! ASSETPIN_API_TOKEN=... assetpin --network rinkeby store
//!
//! # Try it without a pinning service (state goes to <state-root>/.mock)
//! assetpin --mock store
//! ```
//!
//! ## Exit status
//!
//! `0` when everything was stored (or nothing was pending), `1` when at least
//! one asset failed, `2` on a fatal error (config, scan, lock, state save).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::{pending, status, store};
use config::{Config, CONFIG_FILE};

/// Every asset stored, or nothing to do.
pub const EXIT_OK: u8 = 0;
/// At least one asset failed.
pub const EXIT_FAILED: u8 = 1;
/// Configuration, scan, lock or state-save error.
pub const EXIT_FATAL: u8 = 2;
/// Stopped by Ctrl+C.
pub const EXIT_INTERRUPTED: u8 = 130;

const DEFAULT_LOG_FILTER: &str = "warn,assetpin=info";

/// Publish asset bundles to a pinning service and track their addresses.
#[derive(Parser, Debug)]
#[command(name = "assetpin")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file (default: ./assetpin.toml, then the user config dir)
    #[arg(long, global = true, env = "ASSETPIN_CONFIG")]
    config: Option<PathBuf>,

    /// Network whose state is synchronized
    #[arg(long, global = true, env = "ASSETPIN_NETWORK")]
    network: Option<String>,

    /// Directory holding one subdirectory per asset
    #[arg(long, global = true)]
    assets_root: Option<PathBuf>,

    /// Directory holding per-network state (default: <assets-root>/data)
    #[arg(long, global = true)]
    state_root: Option<PathBuf>,

    /// Pinning service API token
    #[arg(long, global = true, env = "ASSETPIN_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Use an in-memory store and a separate <state-root>/.mock state (for testing/demo)
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload every asset that has no recorded address
    Store {
        /// List pending assets without uploading
        #[arg(long)]
        dry_run: bool,

        /// Maximum concurrent uploads
        #[arg(long, short)]
        concurrency: Option<usize>,
    },

    /// Show published and pending assets
    Status,

    /// Print pending asset ids, one per line
    Pending,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(status) => ExitCode::from(status),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let config = load_config(&cli)?;
    tracing::debug!(?config, "Resolved configuration");

    match cli.command {
        Commands::Store {
            dry_run,
            concurrency,
        } => {
            let options = store::StoreOptions {
                dry_run,
                concurrency,
            };
            store::run(&config, options, cli.mock).await
        }
        Commands::Status => {
            status::run(&config, cli.mock).await?;
            Ok(EXIT_OK)
        }
        Commands::Pending => {
            pending::run(&config, cli.mock).await?;
            Ok(EXIT_OK)
        }
    }
}

/// Load the config file and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let (mut config, path) = Config::locate(cli.config.as_deref(), &config_candidates())
        .context("Failed to load configuration")?;
    match &path {
        Some(path) => tracing::debug!("Using config file {}", path.display()),
        None => tracing::debug!("No config file found, using defaults"),
    }

    if let Some(network) = &cli.network {
        config.network = network.clone();
    }
    if let Some(root) = &cli.assets_root {
        config.assets.root = root.clone();
    }
    if let Some(state_root) = &cli.state_root {
        config.assets.state_root = Some(state_root.clone());
    }
    if let Some(token) = &cli.api_token {
        config.store.api_token = Some(token.clone());
    }
    Ok(config)
}

/// Config files tried when `--config` is not given, in order.
fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dirs) = directories::ProjectDirs::from("io", "ydun", "assetpin") {
        candidates.push(dirs.config_dir().join(CONFIG_FILE));
    }
    candidates
}

/// Log to stderr so stdout carries only command output.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
