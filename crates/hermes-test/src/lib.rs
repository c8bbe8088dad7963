//! # Hermes Test
//!
//! In-memory testing for Hermes contracts. Requests never touch a socket:
//! raw requests and contract-encoded calls both go straight into
//! [`App::handle`](hermes_server::App::handle).
//!
//! - [`TestClient`] sends raw requests built with [`TestRequest`] and
//!   returns a [`TestResponse`] with assertion helpers.
//! - [`TestClient::contract`] returns a [`hermes_client::Client`] over an
//!   [`InMemoryTransport`], so the client encoder and response parser run
//!   against the real server parser and encoder.
//!
//! ## Example
//!
//! ```rust,ignore
//! let client = TestClient::new(app);
//!
//! client
//!     .post("/users")
//!     .json(&json!({"name": ""}))
//!     .send()
//!     .await?
//!     .assert_status(StatusCode::BAD_REQUEST)
//!     .assert_error_code("VALIDATION_ERROR");
//!
//! let user: User = client
//!     .contract()
//!     .call("createUser")
//!     .input(&json!({"body": {"name": "Ada"}}))
//!     .send()
//!     .await?;
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;
mod transport;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
pub use transport::InMemoryTransport;
