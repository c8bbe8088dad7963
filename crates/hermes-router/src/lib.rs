//! Path templates and radix tree routing for Hermes.
//!
//! This crate is the path half of a Hermes contract. A [`PathTemplate`] is
//! compiled once from a declaration such as `/users/:id/:tab?` and then used
//! in both directions:
//!
//! - **Server**: [`Router`] matches incoming paths and extracts parameters
//! - **Client**: [`PathTemplate::substitute`] turns encoded values back into a path
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!                   "users"
//!              ┌───────┴───────┐
//!            "me"            (param)
//!            [GET]          [GET,DELETE]
//!                              │
//!                           (param)      <- from "/users/:id/:tab?"
//!                            [GET]
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;
mod template;

pub use error::{RouterError, TemplateError};
pub use method_router::{MethodRouter, RouteEntry};
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;
pub use template::{PathTemplate, Segment};

/// A matched route with its operation ID and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The operation ID for the matched route
    pub operation_id: &'a str,
    /// Extracted, percent-decoded path parameters
    pub params: Params,
}

impl<'a> RouteMatch<'a> {
    /// Creates a new route match.
    #[must_use]
    pub fn new(operation_id: &'a str, params: Params) -> Self {
        Self {
            operation_id,
            params,
        }
    }
}
