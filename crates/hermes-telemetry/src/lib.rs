//! Logging setup for Hermes.
//!
//! Hermes crates emit `tracing` events: `debug!` on decode paths, `warn!` on
//! validation and authentication failures, `error!` on contract violations.
//! This crate installs the subscriber that renders them.
//!
//! # Example
//!
//! ```rust,no_run
//! use hermes_telemetry::{init_logging, LogConfig, LogFormat};
//!
//! let config = LogConfig {
//!     level: "hermes_server=debug,info".to_string(),
//!     format: LogFormat::Compact,
//!     ..LogConfig::production()
//! };
//! init_logging(&config).unwrap();
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
