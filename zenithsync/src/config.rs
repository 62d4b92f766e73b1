//! Configuration for the sync engine.

use std::path::PathBuf;
use std::time::Duration;

use crate::routing::{default_config_files, ConfigFile};

/// Default HTTP timeout for asset fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of parallel fetches per wave.
pub const DEFAULT_PARALLEL_FETCHES: usize = 4;

/// Default namespace for media asset ids.
pub const DEFAULT_ASSET_NAMESPACE: &str = "com.zenithfit";

/// Default remote location of the configuration documents.
pub const DEFAULT_CONFIG_BASE_URL: &str =
    "https://raw.githubusercontent.com/zenithfit/zenith-fit-data/main";

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root of the shared store, reachable by every collaborating process.
    pub store_root: PathBuf,

    /// Directory of bundled defaults used when the store has no copy yet.
    pub fallback_dir: Option<PathBuf>,

    /// Base URL the configuration wave fetches from.
    pub config_base_url: String,

    /// Base URL the media wave fetches from.
    pub media_base_url: String,

    /// Namespace used to build media asset ids.
    pub asset_namespace: String,

    /// Fixed configuration set; doubles as the routing filename table.
    pub config_files: Vec<ConfigFile>,

    /// Maximum concurrent fetches within one wave.
    pub max_parallel_fetches: usize,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("."),
            fallback_dir: None,
            config_base_url: DEFAULT_CONFIG_BASE_URL.to_string(),
            media_base_url: format!("{DEFAULT_CONFIG_BASE_URL}/images"),
            asset_namespace: DEFAULT_ASSET_NAMESPACE.to_string(),
            config_files: default_config_files(),
            max_parallel_fetches: DEFAULT_PARALLEL_FETCHES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SyncConfig {
    /// Create a configuration with the given store root.
    pub fn new(store_root: impl Into<PathBuf>) -> Self {
        Self {
            store_root: store_root.into(),
            ..Default::default()
        }
    }

    /// Set the bundled fallback directory.
    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(dir.into());
        self
    }

    /// Set the configuration wave base URL.
    pub fn with_config_base_url(mut self, url: impl Into<String>) -> Self {
        self.config_base_url = url.into();
        self
    }

    /// Set the media wave base URL.
    pub fn with_media_base_url(mut self, url: impl Into<String>) -> Self {
        self.media_base_url = url.into();
        self
    }

    /// Set the media asset id namespace.
    pub fn with_asset_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.asset_namespace = namespace.into();
        self
    }

    /// Replace the fixed configuration set.
    pub fn with_config_files(mut self, files: Vec<ConfigFile>) -> Self {
        self.config_files = files;
        self
    }

    /// Set the per-wave concurrency bound (minimum 1).
    pub fn with_max_parallel_fetches(mut self, max: usize) -> Self {
        self.max_parallel_fetches = max.max(1);
        self
    }

    /// Set the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
