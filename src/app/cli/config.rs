//! TOML configuration file loading
//!
//! The file is optional. An explicit `--config-file` must exist; otherwise
//! `<config dir>/subpool/subpool.toml` is used when present. Keys are
//! kebab-case and unknown keys are rejected:
//!
//! ```toml
//! url = "memory://local"
//! subject = "jobs.>"
//! pool-size = 4
//! queue-capacity = 32
//! connection-name = "jobs-worker"
//! log-level = "debug"
//! log-format = "json"
//! ```

use super::args::Args;
use crate::broker::{ConnectOptions, MEMORY_SCHEME};
use crate::core::error_handling::ContextualError;
use crate::core::logging::LogFormat;
use crate::pool::{PoolOptions, DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_URL: &str = "memory://subpool";
pub const DEFAULT_SUBJECT: &str = "subpool.demo";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Unsupported broker URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Parse { message, .. } | ConfigError::InvalidUrl { message, .. } => {
                Some(message)
            }
            ConfigError::NotFound { .. } => Some("The specified configuration file does not exist"),
            ConfigError::Read { .. } => None,
        }
    }
}

/// Values read from the configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PoolSettings {
    pub url: Option<String>,
    pub subject: Option<String>,
    pub pool_size: Option<usize>,
    pub queue_capacity: Option<usize>,
    pub connection_name: Option<String>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

impl PoolSettings {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: error.message().to_string(),
        })
    }

    pub async fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&contents, path)
    }

    /// Load the explicit file, else the default file when it exists
    pub async fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        match config_file {
            Some(path) if !path.exists() => Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            }),
            Some(path) => Self::from_file(path).await,
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    log::debug!("using configuration file {}", path.display());
                    Self::from_file(&path).await
                }
                _ => Ok(Self::default()),
            },
        }
    }
}

/// `<config dir>/subpool/subpool.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("subpool").join("subpool.toml"))
}

/// Final settings after CLI values are laid over the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub url: String,
    pub subject: String,
    pub pool_size: usize,
    pub queue_capacity: usize,
    pub connection_name: Option<String>,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
    pub messages: usize,
    pub drain: bool,
    pub handler_delay_ms: Option<u64>,
}

impl RunSettings {
    pub fn resolve(args: &Args, file: PoolSettings) -> Self {
        Self {
            url: args
                .url
                .clone()
                .or(file.url)
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            subject: args
                .subject
                .clone()
                .or(file.subject)
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            pool_size: args.pool_size.or(file.pool_size).unwrap_or(DEFAULT_POOL_SIZE),
            queue_capacity: args
                .queue_capacity
                .or(file.queue_capacity)
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
            connection_name: args.connection_name.clone().or(file.connection_name),
            log_level: args.log_level.clone().or(file.log_level),
            log_format: args.log_format.or(file.log_format).unwrap_or_default(),
            log_file: match &args.log_file {
                Some(_) => args.log_file_path(),
                None => file.log_file,
            },
            color: args.color_override().or(file.color),
            messages: args.messages,
            drain: args.drain,
            handler_delay_ms: args.handler_delay,
        }
    }

    /// Name of the in-process broker addressed by `url`
    pub fn broker_name(&self) -> Result<&str, ConfigError> {
        match self.url.strip_prefix(MEMORY_SCHEME) {
            Some(name) if !name.is_empty() => Ok(name),
            Some(_) => Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                message: "broker name must not be empty".to_string(),
            }),
            None => Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
                message: format!("only {}<name> URLs are supported", MEMORY_SCHEME),
            }),
        }
    }

    pub fn connect_options(&self, role: &str) -> ConnectOptions {
        let name = match &self.connection_name {
            Some(name) => format!("{}-{}", name, role),
            None => format!("subpool-{}", role),
        };
        ConnectOptions::new().with_name(name)
    }

    /// Pool options without a handler; the caller installs its own
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions::new()
            .with_pool_size(self.pool_size)
            .with_queue_capacity(self.queue_capacity)
            .with_connect_options(self.connect_options("pool"))
    }
}
