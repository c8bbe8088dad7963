//! # Hermes Server
//!
//! Serves a Hermes contract.
//!
//! This crate provides the server half of a contract:
//!
//! - [`RequestParser`] - Decodes path, query, headers, and body, then runs security
//! - [`ResponseEncoder`] - Encodes handler output for its declared status
//! - [`HandlerRegistry`] - Typed handlers keyed by operation ID
//! - [`App`] - Routing and dispatch over a registry
//! - [`HermesService`] - hyper `Service` adapter
//!
//! ## Example
//!
//! ```rust
//! use hermes_core::{Api, Endpoint, ResponseSpec, Schema};
//! use hermes_security::Security;
//! use hermes_server::{App, HandlerError};
//! use http::StatusCode;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct WhoAmI {}
//!
//! let api = Api::new("Example")
//!     .add_endpoint(
//!         Endpoint::get("whoami", "/whoami")
//!             .security(Security::bearer("bearerAuth"))
//!             .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let app = App::builder(api)
//!     .handle("whoami", |_: WhoAmI, token: String| async move {
//!         Ok::<_, HandlerError>(format!("token {token}"))
//!     })
//!     .build()
//!     .unwrap();
//! # let _ = app;
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod config;
mod encoder;
mod error;
mod handler;
pub mod multipart;
mod parser;
mod request_id;
mod service;

pub use app::{App, AppBuilder};
pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_MULTIPART_FIELDS,
    DEFAULT_REQUEST_ID_HEADER,
};
pub use encoder::{envelope_response, http_error_response, ResponseEncoder};
pub use error::{RequestError, ResponseEncodingError};
pub use handler::{ErasedHandler, HandlerError, HandlerRegistry, InvokeError};
pub use parser::{ParsedRequest, RequestParser};
pub use request_id::RequestId;
pub use service::{HermesService, ResponseBody};
