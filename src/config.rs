//! Startup configuration: one hierarchical merge, validated before use.
//!
//! Grounded on the teacher's `infrastructure::config::ConfigLoader`
//! (figment, programmatic defaults merged with environment variables,
//! validated with a dedicated error enum) narrowed to an env-var-only
//! source per SPEC_FULL.md §4.11 — this kernel has no project-local YAML
//! file to merge, so the `Yaml::file` layers the teacher chains in have no
//! counterpart here. Unlike the teacher, which namespaces its own env vars
//! under a prefix, this kernel's external interface (SPEC_FULL.md §6) names
//! bare variables (`PORT`, `DB_PATH`, `COMPLETER_KEYS`, ...), so the merge
//! reads the environment unprefixed.

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default)]
    pub completer_keys: Vec<String>,

    #[serde(default = "default_completer_model")]
    pub completer_model: String,

    #[serde(default = "default_mcp_url")]
    pub mcp_url: String,

    #[serde(default)]
    pub mcp_credential: String,

    #[serde(default = "default_poll_interval_s")]
    pub poll_interval_s: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_backoff_s")]
    pub base_backoff_s: u64,

    #[serde(default = "default_max_backoff_s")]
    pub max_backoff_s: u64,

    #[serde(default = "default_role_vocabulary")]
    pub role_vocabulary: String,

    #[serde(default)]
    pub api_credentials: Vec<String>,

    #[serde(default)]
    pub admin_master_token: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_port() -> u16 {
    8000
}
fn default_db_path() -> String {
    "swarmd.db".to_string()
}
fn default_completer_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}
fn default_mcp_url() -> String {
    "http://localhost:9000".to_string()
}
fn default_poll_interval_s() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_backoff_s() -> u64 {
    10
}
fn default_max_backoff_s() -> u64 {
    300
}
fn default_role_vocabulary() -> String {
    "default".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            db_path: default_db_path(),
            completer_keys: Vec::new(),
            completer_model: default_completer_model(),
            mcp_url: default_mcp_url(),
            mcp_credential: String::new(),
            poll_interval_s: default_poll_interval_s(),
            max_retries: default_max_retries(),
            base_backoff_s: default_base_backoff_s(),
            max_backoff_s: default_max_backoff_s(),
            role_vocabulary: default_role_vocabulary(),
            api_credentials: Vec::new(),
            admin_master_token: None,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("db_path must not be empty")]
    EmptyDbPath,
    #[error("invalid log level: {0}, must be one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("invalid log format: {0}, must be one of json, pretty")]
    InvalidLogFormat(String),
    #[error("base_backoff_s ({0}) must be less than max_backoff_s ({1})")]
    InvalidBackoff(u64, u64),
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

impl Config {
    /// Programmatic defaults merged with bare (unprefixed) environment
    /// variables; nested fields are not used, so no separator configuration
    /// is needed beyond the default.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::raw())
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(self.log_format.clone()));
        }
        if self.base_backoff_s >= self.max_backoff_s {
            return Err(ConfigError::InvalidBackoff(self.base_backoff_s, self.max_backoff_s));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().expect("defaults must validate");
    }

    #[test]
    fn empty_db_path_rejected() {
        let mut config = Config::default();
        config.db_path = String::new();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDbPath)));
    }

    #[test]
    fn unknown_log_level_rejected() {
        let mut config = Config::default();
        config.log_level = "verbose".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLogLevel(_))));
    }

    #[test]
    fn backoff_must_strictly_increase() {
        let mut config = Config::default();
        config.base_backoff_s = 300;
        config.max_backoff_s = 300;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBackoff(300, 300))));
    }
}
