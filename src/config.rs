//! Configuration module for the feed monitor.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::model::{Permissions, DEFAULT_FEED_HISTORY};
use crate::{MonitorError, Result};

/// Monitor loop configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Maximum number of links kept in global history.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Pause after each processed tenant, in seconds.
    #[serde(default = "default_pacing_interval")]
    pub pacing_interval_secs: u64,
    /// Pause after a cycle that processed no tenant, in seconds.
    #[serde(default = "default_idle_interval")]
    pub idle_interval_secs: u64,
    /// Maximum number of links kept in each feed's own history.
    #[serde(default = "default_max_feed_history")]
    pub max_feed_history: usize,
    /// Capabilities a tenant must grant before its feeds are processed.
    #[serde(default = "default_required_permissions")]
    pub required_permissions: Vec<String>,
    /// Channel names whose feeds never record into global history.
    #[serde(default)]
    pub global_history_excluded_channels: Vec<String>,
}

fn default_history_capacity() -> usize {
    100_000
}

fn default_pacing_interval() -> u64 {
    180
}

fn default_idle_interval() -> u64 {
    5
}

fn default_max_feed_history() -> usize {
    DEFAULT_FEED_HISTORY
}

fn default_required_permissions() -> Vec<String> {
    vec![
        "VIEW_CHANNEL".to_string(),
        "SEND_MESSAGES".to_string(),
        "EMBED_LINKS".to_string(),
    ]
}

impl MonitorConfig {
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_secs(self.pacing_interval_secs)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_secs(self.idle_interval_secs)
    }

    /// Resolve `required_permissions` to a capability set.
    pub fn required_permissions(&self) -> Result<Permissions> {
        Permissions::from_names(&self.required_permissions)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            pacing_interval_secs: default_pacing_interval(),
            idle_interval_secs: default_idle_interval(),
            max_feed_history: default_max_feed_history(),
            required_permissions: default_required_permissions(),
            global_history_excluded_channels: Vec::new(),
        }
    }
}

/// Feed fetching configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum feed size in bytes.
    #[serde(default = "default_max_feed_size")]
    pub max_feed_size_bytes: u64,
    /// Maximum description length in characters.
    #[serde(default = "default_max_description_length")]
    pub max_description_length: usize,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Allow feeds on loopback/private hosts (off unless testing locally).
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_feed_size() -> u64 {
    crate::rss::MAX_FEED_SIZE
}

fn default_max_description_length() -> usize {
    crate::rss::MAX_DESCRIPTION_LENGTH
}

fn default_user_agent() -> String {
    format!("feedmon/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_feed_size_bytes: default_max_feed_size(),
            max_description_length: default_max_description_length(),
            user_agent: default_user_agent(),
            allow_private_hosts: false,
        }
    }
}

/// Publisher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    /// Webhook request timeout in seconds.
    #[serde(default = "default_publish_timeout")]
    pub timeout_secs: u64,
    /// Display name override for webhook posts.
    #[serde(default)]
    pub username: Option<String>,
}

fn default_publish_timeout() -> u64 {
    10
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_publish_timeout(),
            username: None,
        }
    }
}

/// Tenant document storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one JSON document per tenant.
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_path() -> String {
    "data/tenants".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/feedmon.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// A channel of a configured tenant.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChannelConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// A tenant served by this process.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TenantConfig {
    pub id: String,
    pub name: String,
    /// Capabilities granted to the bot on this tenant.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub channels: Vec<ChannelConfig>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Monitor loop configuration.
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// Feed fetching configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Publisher configuration.
    #[serde(default)]
    pub publisher: PublisherConfig,
    /// Tenant document storage.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tenants served by this process.
    #[serde(default)]
    pub tenants: Vec<TenantConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(MonitorError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| MonitorError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FEEDMON_LOG_LEVEL`: Override the log level
    /// - `FEEDMON_STORE_PATH`: Override the tenant document directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("FEEDMON_LOG_LEVEL") {
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
        if let Ok(path) = std::env::var("FEEDMON_STORE_PATH") {
            if !path.is_empty() {
                self.store.path = path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.monitor.history_capacity == 0 {
            return Err(MonitorError::Validation(
                "monitor.history_capacity must be greater than 0".to_string(),
            ));
        }
        if self.monitor.max_feed_history == 0 {
            return Err(MonitorError::Validation(
                "monitor.max_feed_history must be greater than 0".to_string(),
            ));
        }
        self.monitor.required_permissions()?;

        let mut ids = HashSet::new();
        for tenant in &self.tenants {
            if !ids.insert(tenant.id.as_str()) {
                return Err(MonitorError::Validation(format!(
                    "duplicate tenant id: {}",
                    tenant.id
                )));
            }
            Permissions::from_names(&tenant.permissions)?;
            for channel in &tenant.channels {
                if let Some(webhook) = &channel.webhook_url {
                    url::Url::parse(webhook).map_err(|e| {
                        MonitorError::Validation(format!(
                            "invalid webhook URL for channel {} of tenant {}: {}",
                            channel.id, tenant.id, e
                        ))
                    })?;
                }
            }
        }
        Ok(())
    }
}
