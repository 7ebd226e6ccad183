//! Console configuration.
//!
//! Sources, lowest precedence first:
//! - built-in defaults
//! - `/etc/metascope/metascope.*`, `./config/metascope.*`
//! - the file named by `METASCOPE_CONFIG`
//! - `METASCOPE__SECTION__KEY` environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::version::MetaVersion;

/// Root configuration structure for the console.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub meta: MetaStoreConfig,

    #[serde(default)]
    pub cluster: ClusterConfig,

    #[serde(default)]
    pub repair: RepairConfig,
}

impl ConsoleConfig {
    /// Loads configuration from every source and validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Self::set_defaults(Config::builder())?;

        builder = builder
            .add_source(File::with_name("/etc/metascope/metascope").required(false))
            .add_source(File::with_name("./config/metascope").required(false));

        if let Ok(config_path) = std::env::var("METASCOPE_CONFIG") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        // Example: METASCOPE__META__BASE_PATH=by-dev/meta
        builder = builder.add_source(
            Environment::with_prefix("METASCOPE")
                .separator("__")
                .try_parsing(true),
        );

        let config: ConsoleConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn set_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("meta.base_path", MetaStoreConfig::DEFAULT_BASE_PATH)?
            .set_default(
                "meta.request_timeout_ms",
                MetaStoreConfig::DEFAULT_REQUEST_TIMEOUT_MS,
            )?
            .set_default("cluster.version", MetaVersion::default().as_str())?
            .set_default("repair.guard_revisions", false)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.meta.base_path.trim_matches('/').is_empty() {
            return Err(ConfigError::Message(
                "meta.base_path must not be empty".to_string(),
            ));
        }

        if self.meta.request_timeout_ms == 0 {
            return Err(ConfigError::Message(
                "meta.request_timeout_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from a specific file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config: ConsoleConfig = Self::set_defaults(Config::builder())?
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

/// Metadata store addressing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetaStoreConfig {
    /// Root under which every entity prefix lives.
    pub base_path: String,

    /// Deadline applied to every store call.
    pub request_timeout_ms: u64,

    /// Snapshot file used by the offline backend.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,
}

impl MetaStoreConfig {
    pub const DEFAULT_BASE_PATH: &'static str = "by-dev/meta";
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 3_000;

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for MetaStoreConfig {
    fn default() -> Self {
        Self {
            base_path: Self::DEFAULT_BASE_PATH.to_string(),
            request_timeout_ms: Self::DEFAULT_REQUEST_TIMEOUT_MS,
            snapshot_path: None,
        }
    }
}

/// Cluster the metadata belongs to.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ClusterConfig {
    /// Newest schema generation the decoder may assume.
    #[serde(default)]
    pub version: MetaVersion,
}

/// Write-path behaviour of repair commands.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RepairConfig {
    /// Reject writes when the stored revision moved since the plan was built.
    #[serde(default)]
    pub guard_revisions: bool,
}
