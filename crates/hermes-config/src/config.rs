//! Top-level configuration.

use hermes_client::ClientConfig;
use hermes_server::ServerConfig;
use hermes_telemetry::{create_env_filter, LogConfig};
use http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration for a Hermes process.
///
/// Every section is optional in a file; missing sections and fields take
/// their defaults. Unknown top-level sections are rejected.
///
/// ```toml
/// [server]
/// errors = "first"
/// max_body_size = 1048576
///
/// [client]
/// request_timeout_ms = 5000
///
/// [logging]
/// level = "hermes_server=debug,info"
/// format = "compact"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HermesConfig {
    /// Server request handling.
    pub server: ServerConfig,
    /// Outbound calls.
    pub client: ClientConfig,
    /// Logging.
    pub logging: LogConfig,
}

impl HermesConfig {
    /// Defaults with development logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Defaults with production logging.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Checks values that deserialize but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_body_size() == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_size",
                "must be greater than zero",
            ));
        }

        if self.server.max_multipart_fields() == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_multipart_fields",
                "must be greater than zero",
            ));
        }

        if HeaderName::from_bytes(self.server.request_id_header().as_bytes()).is_err() {
            return Err(ConfigError::invalid_value(
                "server.request_id_header",
                format!("invalid header name: {}", self.server.request_id_header()),
            ));
        }

        if self.client.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "client.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_telemetry::LogFormat;

    #[test]
    fn test_default_is_valid() {
        assert!(HermesConfig::default().validate().is_ok());
        assert!(HermesConfig::development().validate().is_ok());
    }

    #[test]
    fn test_presets_differ_in_logging() {
        assert_eq!(HermesConfig::development().logging.format, LogFormat::Pretty);
        assert_eq!(HermesConfig::production().logging.format, LogFormat::Json);
        assert_eq!(
            HermesConfig::development().server,
            HermesConfig::production().server
        );
    }

    #[test]
    fn test_validate_rejects_zero_body_size() {
        let config = HermesConfig {
            server: ServerConfig::builder().max_body_size(0).build(),
            ..HermesConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_body_size"));
    }

    #[test]
    fn test_validate_rejects_bad_header() {
        let config = HermesConfig {
            server: ServerConfig::builder().request_id_header("bad header").build(),
            ..HermesConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_filter() {
        let mut config = HermesConfig::default();
        config.logging.level = "hermes=loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));

        config.logging.enabled = false;
        assert!(config.validate().is_ok());
    }
}
