//! Client configuration types.
//!
//! # Example
//!
//! ```rust
//! use hermes_client::ClientConfig;
//! use hermes_core::ErrorReporting;
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .errors(ErrorReporting::First)
//!     .request_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert!(config.parse_options().stops_early());
//! assert_eq!(config.request_timeout(), Duration::from_secs(5));
//! ```

use std::time::Duration;

use hermes_core::{ErrorReporting, ParseOptions};
use serde::{Deserialize, Serialize};

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Issue collection mode for request encoding and response decoding.
    pub errors: ErrorReporting,

    /// Request timeout in milliseconds, applied by [`ReqwestTransport`](crate::ReqwestTransport).
    pub request_timeout_ms: u64,

    /// `User-Agent` sent by [`ReqwestTransport`](crate::ReqwestTransport).
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Creates a new client configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Returns the parse options derived from the error mode.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            errors: self.errors,
        }
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            errors: ErrorReporting::default(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Sets the issue collection mode.
    #[must_use]
    pub fn errors(mut self, errors: ErrorReporting) -> Self {
        self.config.errors = errors;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the `User-Agent`.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
