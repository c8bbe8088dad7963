//! Composable security schemes for Hermes contracts.
//!
//! A [`Security<T>`] value is one credential extraction effect plus the
//! documentation of the schemes it reads. The same value serves three
//! purposes:
//!
//! - **Server enforcement**: [`Security::extract`] runs against a [`RequestHead`]
//! - **Client injection**: [`SchemeDoc::inject`] writes a per-call [`Credential`]
//! - **Documentation**: [`Security::schemes`] and [`Security::requirements`]
//!
//! ## Failure priority
//!
//! | Combinator | Evaluation | Reported failure when both fail |
//! |------------|------------|---------------------------------|
//! | `a.and(b)` | both, concurrently | `a`'s |
//! | `a.or(b)`  | `a`, then `b` on failure | `b`'s |
//!
//! ## Example
//!
//! ```rust
//! use hermes_security::{ApiKeyIn, BasicCredentials, Security};
//!
//! #[derive(Clone)]
//! enum Caller {
//!     User(String),
//!     Service(String),
//! }
//!
//! let security = Security::basic("basicAuth")
//!     .map(|creds: BasicCredentials| Caller::User(creds.user))
//!     .or(Security::api_key("serviceKey", "x-api-key", ApiKeyIn::Header).map(Caller::Service));
//!
//! assert_eq!(security.schemes().count(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-security/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod credential;
mod erased;
mod error;
mod request;
mod scheme;
mod security;

pub use credential::{BasicCredentials, Credential, Credentials};
pub use erased::{AnySecurity, BoxedCredential};
pub use error::SecurityError;
pub use request::RequestHead;
pub use scheme::{ApiKeyIn, SchemeDoc, SchemeKind};
pub use security::Security;
