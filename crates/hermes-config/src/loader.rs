//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! defaults, TOML or JSON sources, and environment variables.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use hermes_core::ErrorReporting;
use hermes_telemetry::LogFormat;

use crate::{ConfigError, HermesConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "HERMES";

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values, or a preset
/// 2. A configuration file or string (TOML or JSON)
/// 3. Environment variables `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use hermes_config::ConfigLoader;
///
/// # fn main() -> Result<(), hermes_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("hermes.toml")?
///     .with_env()
///     .load()?;
/// # let _ = config;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HermesConfig,
    env_prefix: Option<String>,
    env_vars: Option<BTreeMap<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HermesConfig::default(),
            env_prefix: None,
            env_vars: None,
        }
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HermesConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HermesConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file, chosen by extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.config = parse(&content, &format)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `"toml"` or `"json"` format.
    ///
    /// ```
    /// use hermes_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nmax_body_size = 1024", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.server.max_body_size(), 1024);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Applies `HERMES__*` environment variables on load.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_prefix(DEFAULT_ENV_PREFIX)
    }

    /// Applies `PREFIX__SECTION__KEY` environment variables on load.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Uses `vars` instead of the process environment.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Applies environment overrides and validates.
    pub fn load(mut self) -> Result<HermesConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars = match self.env_vars.take() {
                Some(vars) => vars,
                None => env::vars().collect(),
            };
            for (key, value) in vars.iter().filter(|(k, _)| k.starts_with(&prefix)) {
                self.apply_env_var(key, value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HermesConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let integer = || {
            value
                .parse::<u64>()
                .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
        };
        let size = || {
            value
                .parse::<usize>()
                .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
        };
        let boolean =
            || parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"));
        let errors = || {
            parse_errors(value)
                .ok_or_else(|| ConfigError::env_parse_error(key, "expected 'first' or 'all'"))
        };

        let server = &self.config.server;
        match parts.as_slice() {
            // Server section
            ["SERVER", "ERRORS"] => {
                self.config.server = server.to_builder().errors(errors()?).build();
            }
            ["SERVER", "MAX_BODY_SIZE"] => {
                self.config.server = server.to_builder().max_body_size(size()?).build();
            }
            ["SERVER", "MAX_MULTIPART_FIELDS"] => {
                self.config.server = server.to_builder().max_multipart_fields(size()?).build();
            }
            ["SERVER", "REQUEST_ID_HEADER"] => {
                self.config.server = server.to_builder().request_id_header(value).build();
            }

            // Client section
            ["CLIENT", "ERRORS"] => self.config.client.errors = errors()?,
            ["CLIENT", "REQUEST_TIMEOUT_MS"] => self.config.client.request_timeout_ms = integer()?,
            ["CLIENT", "USER_AGENT"] => {
                self.config.client.user_agent = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }

            // Logging section
            ["LOGGING", "ENABLED"] => self.config.logging.enabled = boolean()?,
            ["LOGGING", "LEVEL"] => self.config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    "compact" => LogFormat::Compact,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json', 'pretty', or 'compact'",
                        ))
                    }
                };
            }
            ["LOGGING", "SPAN_EVENTS"] => self.config.logging.span_events = boolean()?,
            ["LOGGING", "FILE_LINE_INFO"] => self.config.logging.file_line_info = boolean()?,
            ["LOGGING", "THREAD_IDS"] => self.config.logging.thread_ids = boolean()?,
            ["LOGGING", "INCLUDE_TARGET"] => self.config.logging.include_target = boolean()?,

            _ => return Err(ConfigError::env_parse_error(key, "unknown configuration key")),
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<HermesConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_errors(s: &str) -> Option<ErrorReporting> {
    match s.to_lowercase().as_str() {
        "first" => Some(ErrorReporting::First),
        "all" => Some(ErrorReporting::All),
        _ => None,
    }
}
