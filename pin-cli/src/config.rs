//! Configuration loading for assetpin.
//!
//! Configuration is loaded from a TOML file (default: `assetpin.toml` in the
//! working directory, then the user config directory). Every field has a
//! default, so the file is optional.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pin_content::{HttpStoreConfig, DEFAULT_ENDPOINT};
use pin_core::RetryPolicy;
use pin_sync::SyncSettings;
use pin_types::{Namespace, TypesError};

/// Default config file name.
pub const CONFIG_FILE: &str = "assetpin.toml";

/// Root configuration for assetpin.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Network whose state is synchronized (default: localhost).
    #[serde(default = "default_network")]
    pub network: String,
    /// Asset locations.
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Content store.
    #[serde(default)]
    pub store: StoreConfig,
    /// Synchronization tuning.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Asset locations.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetsConfig {
    /// Directory holding one subdirectory per asset (default: assets).
    #[serde(default = "default_assets_root")]
    pub root: PathBuf,
    /// Directory holding per-network state (default: `<root>/data`).
    pub state_root: Option<PathBuf>,
}

/// Content store configuration.
#[derive(Clone, Deserialize)]
pub struct StoreConfig {
    /// Pinning service base URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer token for the pinning service.
    pub api_token: Option<String>,
    /// Per-request timeout in seconds (default: 60).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Synchronization tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Maximum concurrent uploads (default: 4).
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Attempts per asset, including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Backoff before the first retry in milliseconds (default: 500).
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Backoff cap in milliseconds (default: 10000).
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

// Default value functions
fn default_network() -> String {
    "localhost".to_string()
}

fn default_assets_root() -> PathBuf {
    PathBuf::from("assets")
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_concurrency() -> usize {
    pin_sync::DEFAULT_CONCURRENCY
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_max_ms() -> u64 {
    10_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: default_network(),
            assets: AssetsConfig::default(),
            store: StoreConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_assets_root(),
            state_root: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load the configuration the CLI should use.
    ///
    /// An explicit path must exist. Otherwise the first existing file among
    /// `candidates` is used, and defaults apply when there is none.
    pub fn locate(
        explicit: Option<&Path>,
        candidates: &[PathBuf],
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Ok((Self::from_file(path)?, Some(path.clone()))),
            None => Ok((Self::default(), None)),
        }
    }

    /// The configured network as a validated namespace.
    pub fn namespace(&self) -> Result<Namespace, ConfigError> {
        Namespace::new(self.network.as_str()).map_err(ConfigError::InvalidNetwork)
    }

    /// Retry policy from the `[sync]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.sync.max_attempts,
            Duration::from_millis(self.sync.backoff_base_ms),
            Duration::from_millis(self.sync.backoff_max_ms),
        )
    }

    /// Synchronizer settings for the configured network.
    pub fn sync_settings(&self) -> Result<SyncSettings, ConfigError> {
        let mut settings = SyncSettings::new(&self.assets.root, self.namespace()?);
        if let Some(state_root) = &self.assets.state_root {
            settings.state_root = state_root.clone();
        }
        settings.concurrency = self.sync.concurrency.max(1);
        settings.timeout = Duration::from_secs(self.store.timeout_secs);
        settings.retry = self.retry_policy();
        Ok(settings)
    }

    /// HTTP store settings from the `[store]` section.
    pub fn http_store_config(&self) -> HttpStoreConfig {
        HttpStoreConfig {
            endpoint: self.store.endpoint.clone(),
            api_token: self.store.api_token.clone(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Network name cannot be used as a state directory.
    #[error("invalid network: {0}")]
    InvalidNetwork(#[source] TypesError),
}
