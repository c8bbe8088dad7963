//! Typed, layered configuration for Hermes.
//!
//! [`HermesConfig`] gathers the server, client, and logging sections.
//! [`ConfigLoader`] builds one from defaults, a TOML or JSON source, and
//! `HERMES__SECTION__KEY` environment variables, then validates it.
//!
//! # Example
//!
//! ```
//! use hermes_config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .with_string(
//!         r#"
//!         [server]
//!         errors = "first"
//!
//!         [client]
//!         request_timeout_ms = 5000
//!         "#,
//!         "toml",
//!     )
//!     .unwrap()
//!     .with_env_vars([("HERMES__LOGGING__LEVEL", "warn")])
//!     .with_env()
//!     .load()
//!     .unwrap();
//!
//! assert!(config.server.parse_options().stops_early());
//! assert_eq!(config.client.request_timeout_ms, 5000);
//! assert_eq!(config.logging.level, "warn");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
