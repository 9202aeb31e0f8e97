//! Configuration types for a11y-audit.

use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default per-URL timeout for the animated-image pre-scan.
pub const DEFAULT_ANIMATION_TIMEOUT_MS: u64 = 5000;

/// Top-level configuration for a11y-audit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Preset to use (`recommended`, `strict`, `minimal`).
    #[serde(default)]
    pub preset: Option<String>,

    /// Severity threshold for a failing exit status (default: `error`).
    #[serde(default)]
    pub fail_on: Option<String>,

    /// Scan configuration.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Per-rule configurations.
    #[serde(default)]
    pub rules: HashMap<String, RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule is enabled.
    #[must_use]
    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        self.rules
            .get(rule)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a rule.
    #[must_use]
    pub fn rule_severity(&self, rule: &str) -> Option<Severity> {
        self.rules.get(rule).and_then(|c| c.severity)
    }

    /// Gets the options table for a rule.
    #[must_use]
    pub fn rule_config(&self, rule: &str) -> Option<&RuleConfig> {
        self.rules.get(rule)
    }

    /// Resolves `fail_on`, defaulting to [`Severity::Error`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a known severity.
    pub fn fail_on_severity(&self) -> Result<Severity, ConfigError> {
        match &self.fail_on {
            None => Ok(Severity::Error),
            Some(value) => value.parse().map_err(|message| ConfigError::Invalid {
                field: "fail_on".to_string(),
                message,
            }),
        }
    }
}

/// Scan-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// URL relative image references resolve against.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Whether to fetch images for the animated-image pre-scan.
    #[serde(default = "default_true")]
    pub fetch_remote: bool,

    /// Per-URL fetch timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub animation_timeout_ms: u64,
}

impl ScanConfig {
    /// The pre-scan timeout as a [`Duration`].
    #[must_use]
    pub fn animation_timeout(&self) -> Duration {
        Duration::from_millis(self.animation_timeout_ms)
    }

    /// Parses `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed.
    pub fn parsed_base_url(&self) -> Result<Option<Url>, ConfigError> {
        self.base_url
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| ConfigError::Invalid {
                    field: "scan.base_url".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            fetch_remote: true,
            animation_timeout_ms: DEFAULT_ANIMATION_TIMEOUT_MS,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_ANIMATION_TIMEOUT_MS
}

/// Per-rule configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for this rule.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Rule-specific options as key-value pairs.
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl RuleConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string option with a default value.
    #[must_use]
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.options
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A field parsed but holds an unusable value.
    #[error("Invalid `{field}`: {message}")]
    Invalid {
        /// Dotted field path.
        field: String,
        /// What was wrong.
        message: String,
    },
}
