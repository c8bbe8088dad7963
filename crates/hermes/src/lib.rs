//! # Hermes
//!
//! **Declarative HTTP API contracts with matching server and client codecs**
//!
//! An endpoint is declared once, as data: method, path template, schemas
//! for the path, query, headers and body, the responses it may produce,
//! and the security that guards it. From that single declaration Hermes
//! derives:
//!
//! - a **server request parser** that turns raw requests into validated
//!   handler input, and a **response encoder** that turns handler output
//!   into wire responses;
//! - a **client request encoder** and **response parser** that are their
//!   exact mirror, so a value survives `encode` then `decode` unchanged;
//! - a **security algebra** (`map`, `map_effect`, `and`, `or`, `as_value`)
//!   evaluated on the server and used to inject credentials on the client.
//!
//! ## Quick Start
//!
//! ```rust
//! use hermes::prelude::*;
//! use http::StatusCode;
//! use serde_json::{json, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Api::new("Users").add_endpoint(
//!     Endpoint::get("getUser", "/users/:id")
//!         .path(Schema::object().field("id", Schema::integer_from_string()))
//!         .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::any()))
//!         .build()?,
//! )?;
//!
//! let app = App::builder(api)
//!     .handle("getUser", |input: Value, _: ()| async move {
//!         Ok::<_, HandlerError>(json!({"id": input["path"]["id"], "name": "Ada"}))
//!     })
//!     .build()?;
//!
//! // Any `Transport` works here; the in-memory one skips the socket.
//! let client = hermes_test::TestClient::new(app).contract();
//! let user = client
//!     .call("getUser")
//!     .input(&json!({"path": {"id": 7}}))
//!     .send_value()
//!     .await?;
//! assert_eq!(user, json!({"id": 7, "name": "Ada"}));
//! # Ok(())
//! # }
//! ```
//!
//! ## Crates
//!
//! ```text
//! hermes-router     path templates, route matching
//! hermes-security   schemes and combinators
//! hermes-core       schemas, endpoints, responses, registry, wire helpers
//! hermes-server     request parser, response encoder, dispatch
//! hermes-client     request encoder, response parser, transports
//! hermes-config     layered configuration
//! hermes-telemetry  structured logging
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export contract types
pub use hermes_core as core;

// Re-export router types
pub use hermes_router as router;

// Re-export security types
pub use hermes_security as security;

// Re-export server types
pub use hermes_server as server;

// Re-export client types
pub use hermes_client as client;

// Re-export configuration types
pub use hermes_config as config;

// Re-export telemetry types
pub use hermes_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        Api, ApiGroup, ContractError, Endpoint, ErrorReporting, HttpError, Reply, Representation,
        ResponseSpec, Schema,
    };

    // Security schemes and credentials
    pub use hermes_security::{ApiKeyIn, BasicCredentials, Credential, Security};

    // Server
    pub use hermes_server::{App, HandlerError, ServerConfig};

    // Client
    pub use hermes_client::{Client, ClientConfig, ClientError, ReqwestTransport, Transport};

    // Configuration and logging
    pub use hermes_config::{ConfigLoader, HermesConfig};
    pub use hermes_telemetry::{init_logging, LogConfig};
}
