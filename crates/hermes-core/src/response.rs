//! Response declarations.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::representation::Representation;
use crate::schema::Schema;
use crate::slot::Slot;

/// One possible response of an endpoint, keyed by status.
///
/// # Example
///
/// ```
/// use hermes_core::{ResponseSpec, Schema};
/// use http::StatusCode;
///
/// let created = ResponseSpec::new(StatusCode::CREATED)
///     .with_body(Schema::object().field("id", Schema::integer()))
///     .with_headers(Schema::object().field("location", Schema::string()));
///
/// assert_eq!(created.status(), StatusCode::CREATED);
/// assert!(created.has_headers());
/// ```
#[derive(Debug, Clone)]
pub struct ResponseSpec {
    status: StatusCode,
    body: Slot,
    headers: Slot,
    representations: Vec<Representation>,
    description: Option<String>,
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl ResponseSpec {
    /// Creates a response with an ignored body and a JSON representation.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            body: Slot::Ignored,
            headers: Slot::Ignored,
            representations: vec![Representation::json()],
            description: None,
        }
    }

    /// Sets the body schema.
    #[must_use]
    pub fn with_body(mut self, schema: Schema) -> Self {
        self.body = Slot::Codec(schema);
        self
    }

    /// Sets the header schema.
    #[must_use]
    pub fn with_headers(mut self, schema: Schema) -> Self {
        self.headers = Slot::Codec(schema);
        self
    }

    /// Replaces the representation list. The first one is used on encode.
    #[must_use]
    pub fn with_representations(mut self, representations: Vec<Representation>) -> Self {
        self.representations = representations;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the body slot.
    #[must_use]
    pub fn body(&self) -> &Slot {
        &self.body
    }

    /// Returns the header slot.
    #[must_use]
    pub fn headers(&self) -> &Slot {
        &self.headers
    }

    /// Returns true if headers are declared.
    #[must_use]
    pub fn has_headers(&self) -> bool {
        !self.headers.is_ignored()
    }

    /// Returns the representations.
    #[must_use]
    pub fn representations(&self) -> &[Representation] {
        &self.representations
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A `{status, body, headers}` triple.
///
/// Handlers return it, and callers receive it, for endpoints where
/// [`Endpoint::is_full_response`](crate::Endpoint::is_full_response) is true.
/// Other endpoints exchange the bare body.
///
/// # Example
///
/// ```
/// use hermes_core::Reply;
/// use serde_json::json;
///
/// let reply = Reply::new(201, json!({"id": 7}))
///     .with_headers(json!({"location": "/users/7"}));
///
/// let wire = serde_json::to_value(&reply).unwrap();
/// assert_eq!(wire["status"], 201);
/// assert_eq!(wire["headers"]["location"], "/users/7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply<B = Value, H = Value> {
    /// Declared status code.
    pub status: u16,
    /// Response body.
    pub body: B,
    /// Response headers, when the status declares them.
    #[serde(default)]
    pub headers: H,
}

impl<B> Reply<B, Value> {
    /// Creates a reply without headers.
    #[must_use]
    pub fn new(status: u16, body: B) -> Self {
        Self {
            status,
            body,
            headers: Value::Null,
        }
    }
}

impl<B, H> Reply<B, H> {
    /// Replaces the headers.
    #[must_use]
    pub fn with_headers<H2>(self, headers: H2) -> Reply<B, H2> {
        Reply {
            status: self.status,
            body: self.body,
            headers,
        }
    }
}
