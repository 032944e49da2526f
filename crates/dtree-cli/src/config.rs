//! Application configuration
//!
//! Resolution order: built-in defaults, then the optional TOML file, then
//! `DTREE_*` environment variables.

use dtree_store::{ServiceConfig, StoreError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log level override
pub const ENV_LOG_LEVEL: &str = "DTREE_LOG_LEVEL";
/// Log format override (`pretty` or `json`)
pub const ENV_LOG_FORMAT: &str = "DTREE_LOG_FORMAT";
/// Page size cap override
pub const ENV_MAX_PAGE_SIZE: &str = "DTREE_MAX_PAGE_SIZE";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Configuration file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`AppConfig`]
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Configuration file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: toml::de::Error,
    },

    /// A setting is out of range or malformed
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Setting name
        key: String,
        /// What is wrong with it
        message: String,
    },

    /// Configuration could not be rendered as TOML
    #[error("failed to encode configuration: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl ConfigError {
    fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Text that names no [`LogFormat`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log format '{0}', expected pretty or json")]
pub struct UnknownLogFormat(pub String);

impl FromStr for LogFormat {
    type Err = UnknownLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(UnknownLogFormat(other.to_string())),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging
    pub log: LogConfig,
    /// Discussion service, including tree policies
    pub service: ServiceConfig,
}

impl AppConfig {
    /// Load from an optional file and the process environment
    ///
    /// # Errors
    /// Unreadable or malformed files and invalid settings.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying overrides
    ///
    /// # Errors
    /// Unreadable or malformed files.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `DTREE_*` overrides from `lookup`
    ///
    /// # Errors
    /// Unparseable override values.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log.format = format.parse().map_err(|e: UnknownLogFormat| {
                ConfigError::invalid(ENV_LOG_FORMAT, e.to_string())
            })?;
        }
        if let Some(max) = lookup(ENV_MAX_PAGE_SIZE) {
            let max: u32 = max
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::invalid(ENV_MAX_PAGE_SIZE, e.to_string()))?;
            self.service.max_page_size = max;
            self.service.default_page_size = self.service.default_page_size.min(max);
        }
        Ok(())
    }

    /// Check every setting
    ///
    /// # Errors
    /// The first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        EnvFilter::try_new(&self.log.level)
            .map_err(|e| ConfigError::invalid("log.level", e.to_string()))?;
        self.service.validate().map_err(|e| match e {
            StoreError::InvalidConfig { setting, message } => {
                ConfigError::invalid(format!("service.{setting}"), message)
            }
            other => ConfigError::invalid("service", other.to_string()),
        })
    }

    /// Render as TOML
    ///
    /// # Errors
    /// Serialization failures.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
