//! # Hermes Client
//!
//! Calls a Hermes contract from the outside.
//!
//! This crate provides the client half of a contract:
//!
//! - [`RequestEncoder`] - Encodes typed input and credentials into a request
//! - [`ResponseParser`] - Decodes a response against the declared statuses
//! - [`Client`] and [`Call`] - Per-operation call builder
//! - [`Transport`] - Pluggable transport, with [`ReqwestTransport`] built in
//!
//! Failures are tagged by side. [`ClientError::is_retryable`] is true only
//! for transport faults, where no response arrived.
//!
//! ## Example
//!
//! ```rust
//! use hermes_client::RequestEncoder;
//! use hermes_core::{Endpoint, Schema};
//! use hermes_security::Credentials;
//! use serde_json::json;
//!
//! let endpoint = Endpoint::get("getStuff", "/stuff/:param/:another?")
//!     .path(
//!         Schema::object()
//!             .field("param", Schema::string())
//!             .optional_field("another", Schema::string()),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let request = RequestEncoder::default()
//!     .encode(&endpoint, &json!({"path": {"param": "value"}}), &Credentials::new())
//!     .unwrap();
//! assert_eq!(request.uri(), "/stuff/value");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod encoder;
mod error;
pub mod multipart;
mod parser;
mod transport;

pub use client::{Call, Client};
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_REQUEST_TIMEOUT_MS};
pub use encoder::RequestEncoder;
pub use error::{ClientError, ClientSideError, ServerSideError};
pub use parser::ResponseParser;
pub use transport::{ReqwestTransport, Transport, TransportError};
