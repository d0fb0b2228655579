//! Configuration loader using Figment for layered config management.
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. TOML config file
//! 3. Environment variables (FUNDSYNC_* prefix, `__` nesting)

use crate::foundation::constants::{
    DEFAULT_MATCH_WINDOW_SECS, DEFAULT_MAX_QUERY_WINDOW, DEFAULT_ORPHAN_RETRY_CYCLES, DEFAULT_POLL_INTERVAL_SECS,
};
use crate::foundation::{Result, SyncError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for config overrides.
///
/// Example: `FUNDSYNC_SYNC__POLL_INTERVAL_SECONDS` -> `sync.poll_interval_seconds`
const ENV_PREFIX: &str = "FUNDSYNC_";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { sync: SyncConfig::default(), logging: LoggingConfig::default() }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SyncConfig {
    /// JSON-RPC endpoint of the ledger node.
    #[serde(default = "default_node_rpc_url")]
    pub node_rpc_url: String,
    /// Steady-state cadence tick, seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Widest event query span accepted before split-and-retry.
    #[serde(default = "default_max_query_window")]
    pub max_query_window: u64,
    /// Reconciliation window for optimistic donations, seconds.
    #[serde(default = "default_match_window")]
    pub match_window_seconds: u64,
    /// Sync cycles a donation for an unknown campaign is retried before it
    /// is reported as orphaned.
    #[serde(default = "default_orphan_retry_cycles")]
    pub orphan_retry_cycles: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            node_rpc_url: default_node_rpc_url(),
            poll_interval_seconds: default_poll_interval(),
            max_query_window: default_max_query_window(),
            match_window_seconds: default_match_window(),
            orphan_retry_cycles: default_orphan_retry_cycles(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter expression, e.g. `"info"`, `"fundsync=debug"`, `"root=warn"`.
    #[serde(default = "default_log_filters")]
    pub filters: String,
    /// Optional directory for a log file; console-only when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filters: default_log_filters(), log_dir: None }
    }
}

fn default_node_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_max_query_window() -> u64 {
    DEFAULT_MAX_QUERY_WINDOW
}

fn default_match_window() -> u64 {
    DEFAULT_MATCH_WINDOW_SECS
}

fn default_orphan_retry_cycles() -> u32 {
    DEFAULT_ORPHAN_RETRY_CYCLES
}

fn default_log_filters() -> String {
    "info".to_string()
}

/// Load configuration from a TOML file (if present) plus environment
/// overrides, then validate.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    info!("loading configuration path={}", path.display());
    let figment = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config: AppConfig = figment.extract().map_err(|err| SyncError::ConfigError(format!("config extraction failed: {err}")))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.sync.node_rpc_url.trim().is_empty() {
        return Err(SyncError::ConfigError("sync.node_rpc_url must not be empty".to_string()));
    }
    if config.sync.poll_interval_seconds == 0 {
        return Err(SyncError::ConfigError("sync.poll_interval_seconds must be positive".to_string()));
    }
    if config.sync.max_query_window == 0 {
        return Err(SyncError::ConfigError("sync.max_query_window must be positive".to_string()));
    }
    if config.sync.match_window_seconds == 0 {
        return Err(SyncError::ConfigError("sync.match_window_seconds must be positive".to_string()));
    }
    Ok(())
}
