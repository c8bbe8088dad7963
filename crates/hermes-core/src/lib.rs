//! # Hermes Core
//!
//! The contract model shared by Hermes servers and clients.
//!
//! A service declares its HTTP API once, and both sides derive their codecs
//! from that declaration:
//!
//! - [`Schema`] - Bidirectional codec between wire and domain values
//! - [`Representation`] - Body serialization format keyed by content type
//! - [`ResponseSpec`] - One declared response, keyed by status
//! - [`Endpoint`] - One operation: identity, request slots, responses, security
//! - [`Api`] / [`ApiGroup`] - Immutable registry with unique operation ids
//! - [`ParseOptions`] - First-issue or all-issues error collection
//! - [`ContractError`], [`ValidationError`], [`HttpError`], [`ErrorEnvelope`] - Error taxonomy
//!
//! # Example
//!
//! ```
//! use hermes_core::{Api, Endpoint, ResponseSpec, Schema};
//! use http::StatusCode;
//!
//! let get_user = Endpoint::get("getUser", "/users/:id")
//!     .path(Schema::object().field("id", Schema::integer_from_string()))
//!     .response(
//!         ResponseSpec::new(StatusCode::OK)
//!             .with_body(Schema::object().field("name", Schema::string())),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let api = Api::new("Users").add_endpoint(get_user).unwrap();
//! assert_eq!(api.endpoint("getUser").unwrap().path(), "/users/:id");
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod api;
mod endpoint;
mod error;
mod options;
mod representation;
mod response;
mod schema;
mod slot;
pub mod wire;

pub use api::{Api, ApiGroup, DEFAULT_GROUP};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{
    ContractError, ErrorCategory, ErrorDetail, ErrorEnvelope, HttpError, Issue, Location,
    ValidationError,
};
pub use options::{ErrorReporting, ParseOptions};
pub use representation::{negotiate, Representation};
pub use response::{Reply, ResponseSpec};
pub use schema::{Schema, Transform};
pub use slot::Slot;

pub use hermes_router::{PathTemplate, TemplateError};
pub use hermes_security::{AnySecurity, Security};
