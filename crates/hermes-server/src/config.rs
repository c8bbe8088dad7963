//! Server configuration types.
//!
//! # Example
//!
//! ```rust
//! use hermes_core::ErrorReporting;
//! use hermes_server::ServerConfig;
//!
//! let config = ServerConfig::builder()
//!     .errors(ErrorReporting::First)
//!     .max_body_size(64 * 1024)
//!     .build();
//!
//! assert!(config.parse_options().stops_early());
//! assert_eq!(config.max_body_size(), 64 * 1024);
//! ```

use hermes_core::{ErrorReporting, ParseOptions};
use serde::{Deserialize, Serialize};

/// Default maximum request body size (2 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Default maximum number of multipart fields.
pub const DEFAULT_MAX_MULTIPART_FIELDS: usize = 100;

/// Default request ID header.
pub const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Issue collection mode for request decoding.
    errors: ErrorReporting,

    /// Largest accepted request body, in bytes.
    max_body_size: usize,

    /// Largest accepted number of multipart fields.
    max_multipart_fields: usize,

    /// Header carrying the request ID on responses.
    request_id_header: String,
}

impl ServerConfig {
    /// Creates a new server configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the parse options derived from the error mode.
    #[must_use]
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            errors: self.errors,
        }
    }

    /// Returns the maximum request body size.
    #[must_use]
    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Returns the maximum number of multipart fields.
    #[must_use]
    pub fn max_multipart_fields(&self) -> usize {
        self.max_multipart_fields
    }

    /// Returns the request ID header name.
    #[must_use]
    pub fn request_id_header(&self) -> &str {
        &self.request_id_header
    }

    /// Returns a builder seeded with this configuration.
    #[must_use]
    pub fn to_builder(&self) -> ServerConfigBuilder {
        ServerConfigBuilder {
            errors: self.errors,
            max_body_size: self.max_body_size,
            max_multipart_fields: self.max_multipart_fields,
            request_id_header: self.request_id_header.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone)]
pub struct ServerConfigBuilder {
    errors: ErrorReporting,
    max_body_size: usize,
    max_multipart_fields: usize,
    request_id_header: String,
}

impl ServerConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            errors: ErrorReporting::default(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            max_multipart_fields: DEFAULT_MAX_MULTIPART_FIELDS,
            request_id_header: DEFAULT_REQUEST_ID_HEADER.to_string(),
        }
    }

    /// Sets the issue collection mode.
    #[must_use]
    pub fn errors(mut self, errors: ErrorReporting) -> Self {
        self.errors = errors;
        self
    }

    /// Sets the maximum request body size.
    #[must_use]
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Sets the maximum number of multipart fields.
    #[must_use]
    pub fn max_multipart_fields(mut self, fields: usize) -> Self {
        self.max_multipart_fields = fields;
        self
    }

    /// Sets the request ID header name.
    #[must_use]
    pub fn request_id_header(mut self, name: impl Into<String>) -> Self {
        self.request_id_header = name.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            errors: self.errors,
            max_body_size: self.max_body_size,
            max_multipart_fields: self.max_multipart_fields,
            request_id_header: self.request_id_header,
        }
    }
}

impl Default for ServerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
