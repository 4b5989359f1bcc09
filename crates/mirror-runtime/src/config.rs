//! # Mirror Configuration
//!
//! Unified configuration for the mirror runtime: where the per-node source
//! mounts live, where the address book is, where durable state and accepted
//! data land, and how often each stream is polled.
//!
//! Every field has a sane default; `MIRROR_*` environment variables
//! override individual values without a config file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use shared_types::{StreamFileName, StreamKind, StreamProfile};
use thiserror::Error;

/// Complete mirror configuration.
#[derive(Debug, Clone, Default)]
pub struct MirrorConfig {
    /// Human-readable network label, used in logs only.
    pub network: String,
    /// Per-node object source configuration.
    pub sources: SourceConfig,
    /// Node registry configuration.
    pub registry: RegistryConfig,
    /// Durable state and accepted-data locations.
    pub storage: StorageConfig,
    /// Per-stream polling and capability settings.
    pub streams: StreamsConfig,
}

impl MirrorConfig {
    /// Build a configuration from defaults plus `MIRROR_*` overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            network: env_string("MIRROR_NETWORK", "testnet"),
            ..Self::default()
        };

        if let Some(root) = env_path("MIRROR_SOURCE_ROOT") {
            config.sources.root_dir = root;
        }
        config.sources.worker_pool_size =
            env_parse("MIRROR_WORKER_POOL_SIZE", config.sources.worker_pool_size);
        config.sources.fetch_timeout_secs =
            env_parse("MIRROR_FETCH_TIMEOUT_SECS", config.sources.fetch_timeout_secs);

        if let Some(path) = env_path("MIRROR_ADDRESS_BOOK") {
            config.registry.address_book_path = path;
        }

        if let Some(dir) = env_path("MIRROR_STATE_DIR") {
            config.storage.state_dir = dir;
        }
        if let Some(dir) = env_path("MIRROR_DATA_DIR") {
            config.storage.data_dir = dir;
        }

        config.streams.balance.enabled =
            env_parse("MIRROR_BALANCE_ENABLED", config.streams.balance.enabled);
        config.streams.balance.poll_interval_secs = env_parse(
            "MIRROR_BALANCE_POLL_SECS",
            config.streams.balance.poll_interval_secs,
        );
        config.streams.record.enabled =
            env_parse("MIRROR_RECORD_ENABLED", config.streams.record.enabled);
        config.streams.record.poll_interval_secs = env_parse(
            "MIRROR_RECORD_POLL_SECS",
            config.streams.record.poll_interval_secs,
        );
        if let Ok(boundary) = std::env::var("MIRROR_RECORD_BYPASS_BOUNDARY") {
            if !boundary.is_empty() {
                config.streams.record.bypass_boundary = Some(boundary);
            }
        }

        config
    }

    /// A configuration pointing every path under `base`, with short
    /// timeouts. For tests only.
    #[must_use]
    pub fn for_testing(base: &Path) -> Self {
        let mut config = Self {
            network: "test".to_string(),
            ..Self::default()
        };
        config.sources.root_dir = base.join("sources");
        config.sources.worker_pool_size = 2;
        config.sources.fetch_timeout_secs = 2;
        config.registry.address_book_path = base.join("address-book.json");
        config.storage.state_dir = base.join("state");
        config.storage.data_dir = base.join("data");
        config.streams.balance.poll_interval_secs = 1;
        config.streams.record.poll_interval_secs = 1;
        config
    }

    /// Validate the configuration before anything is wired with it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.worker_pool_size == 0 {
            return Err(ConfigError::ZeroWorkerPool);
        }
        if self.sources.fetch_timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "sources.fetch_timeout_secs",
            });
        }
        for settings in [&self.streams.balance, &self.streams.record] {
            if settings.enabled && settings.poll_interval_secs == 0 {
                return Err(ConfigError::ZeroDuration {
                    field: "streams.poll_interval_secs",
                });
            }
        }
        if !self.streams.balance.enabled && !self.streams.record.enabled {
            return Err(ConfigError::NoStreamsEnabled);
        }
        Ok(())
    }

    /// The capability profile for one stream kind, with the configured
    /// bypass boundary applied.
    #[must_use]
    pub fn profile(&self, kind: StreamKind) -> StreamProfile {
        match kind {
            StreamKind::Balance => StreamProfile::balance(),
            StreamKind::Record => {
                let mut profile = StreamProfile::record();
                profile.bypass_boundary = self
                    .streams
                    .record
                    .bypass_boundary
                    .as_deref()
                    .map(StreamFileName::from);
                profile
            }
        }
    }

    /// Profiles of all enabled streams.
    #[must_use]
    pub fn enabled_profiles(&self) -> Vec<StreamProfile> {
        let mut profiles = Vec::new();
        if self.streams.balance.enabled {
            profiles.push(self.profile(StreamKind::Balance));
        }
        if self.streams.record.enabled {
            profiles.push(self.profile(StreamKind::Record));
        }
        profiles
    }

    /// Polling interval for one stream kind.
    #[must_use]
    pub fn poll_interval(&self, kind: StreamKind) -> Duration {
        let secs = match kind {
            StreamKind::Balance => self.streams.balance.poll_interval_secs,
            StreamKind::Record => self.streams.record.poll_interval_secs,
        };
        Duration::from_secs(secs)
    }

    /// Fetch timeout as a duration.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.fetch_timeout_secs)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The fetch worker pool must hold at least one permit.
    #[error("worker pool size must be at least 1")]
    ZeroWorkerPool,

    /// A duration field was set to zero.
    #[error("{field} must be at least 1 second")]
    ZeroDuration {
        /// The offending field.
        field: &'static str,
    },

    /// Both streams are disabled; the mirror would do nothing.
    #[error("no streams enabled; enable at least one of balance/record")]
    NoStreamsEnabled,
}

/// Per-node object source configuration.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Root directory holding one subdirectory per node id.
    pub root_dir: PathBuf,
    /// Maximum concurrent outbound fetches across all streams.
    pub worker_pool_size: usize,
    /// Per-fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./mirror-sources"),
            worker_pool_size: 8,
            fetch_timeout_secs: 10,
        }
    }
}

/// Node registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Path to the network address book (JSON, one entry per node).
    pub address_book_path: PathBuf,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address_book_path: PathBuf::from("./address-book.json"),
        }
    }
}

/// Durable state and accepted-data locations.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory for the cursor store and its lock file.
    pub state_dir: PathBuf,
    /// Directory accepted files are archived under, per stream kind.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("./mirror-state"),
            data_dir: PathBuf::from("./mirror-data"),
        }
    }
}

/// Per-stream polling and capability settings.
#[derive(Debug, Clone, Default)]
pub struct StreamsConfig {
    /// Balance snapshot stream.
    pub balance: StreamSettings,
    /// Hash-chained record stream.
    pub record: StreamSettings,
}

/// Settings of one stream.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Whether this stream is polled at all.
    pub enabled: bool,
    /// Seconds between polling cycles.
    pub poll_interval_secs: u64,
    /// Inclusive filename boundary at/below which chain mismatches are
    /// tolerated. Only meaningful for chain-linked streams.
    pub bypass_boundary: Option<String>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: 60,
            bypass_boundary: None,
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key).ok().map(PathBuf::from)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
