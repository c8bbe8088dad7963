//! Error types for Hermes.
//!
//! Errors fall into two families:
//!
//! - [`ContractError`]: the declaration itself is inconsistent. Raised while
//!   building endpoints, registries, or applications, never while serving.
//! - Runtime faults: [`ValidationError`] (a request slot failed to decode)
//!   and [`HttpError`] (a handler chose a wire response). Both render as an
//!   [`ErrorEnvelope`].
//!
//! # Envelope format
//!
//! ```json
//! {
//!   "error": {
//!     "code": "VALIDATION_ERROR",
//!     "message": "invalid query: limit: expected integer, received \"ten\"",
//!     "category": "validation",
//!     "details": { "location": "query", "issues": [ ... ] }
//!   },
//!   "request_id": "0190f6a4-..."
//! }
//! ```

use std::fmt;

use hermes_router::{RouterError, TemplateError};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A request slot failed to decode.
    Validation,
    /// Credentials were missing or rejected.
    Authentication,
    /// No route matched the path.
    NotFound,
    /// The path matched but the method did not.
    MethodNotAllowed,
    /// The handler produced something the contract does not declare.
    ContractViolation,
    /// Unexpected failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::ContractViolation | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable code used in envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Authentication => "AUTHENTICATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::ContractViolation => "CONTRACT_VIOLATION",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Where in a request a validation issue was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Request body.
    Body,
    /// Path parameters.
    Path,
    /// Query string.
    Query,
    /// Request headers.
    Headers,
}

impl Location {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Path => "path",
            Self::Query => "query",
            Self::Headers => "headers",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single decode or encode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Property path from the slot root, e.g. `["user", "email"]`.
    pub path: Vec<String>,
    /// Description of the expected shape.
    pub expected: String,
    /// Truncated rendering of the received value.
    pub received: String,
}

impl Issue {
    /// Creates an issue.
    #[must_use]
    pub fn new(path: Vec<String>, expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self {
            path,
            expected: expected.into(),
            received: received.into(),
        }
    }

    /// Creates an issue at the slot root.
    #[must_use]
    pub fn root(expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self::new(Vec::new(), expected, received)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path.join("."))?;
        }
        write!(f, "expected {}, received {}", self.expected, self.received)
    }
}

/// Renders issues on one line.
pub(crate) fn summarize(issues: &[Issue]) -> String {
    match issues {
        [] => "no issues".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// A request slot failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {location}: {}", summarize(.issues))]
pub struct ValidationError {
    /// The slot that failed.
    pub location: Location,
    /// Every issue collected for the slot.
    pub issues: Vec<Issue>,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(location: Location, issues: Vec<Issue>) -> Self {
        Self { location, issues }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope::new(ErrorCategory::Validation, self.to_string())
            .with_details(serde_json::json!({
                "location": self.location,
                "issues": self.issues,
            }))
            .with_request_id(request_id)
    }
}

/// An HTTP response chosen by a handler, bypassing the response encoder.
///
/// The body is sent as JSON with the given status.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("HTTP {status}")]
pub struct HttpError {
    /// Response status.
    pub status: StatusCode,
    /// JSON response body.
    pub body: serde_json::Value,
}

impl HttpError {
    /// Creates an HTTP error with a JSON body.
    #[must_use]
    pub fn new(status: StatusCode, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Creates an HTTP error carrying a standard envelope.
    #[must_use]
    pub fn from_envelope(status: StatusCode, envelope: &ErrorEnvelope) -> Self {
        Self::new(
            status,
            serde_json::to_value(envelope).unwrap_or(serde_json::Value::Null),
        )
    }

    /// 404 with an envelope.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::from_envelope(
            StatusCode::NOT_FOUND,
            &ErrorEnvelope::new(ErrorCategory::NotFound, message),
        )
    }

    /// 401 with an envelope.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::from_envelope(
            StatusCode::UNAUTHORIZED,
            &ErrorEnvelope::new(ErrorCategory::Authentication, message),
        )
    }
}

/// Construction-time faults in a contract, registry, or application.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The operation id is empty or contains whitespace.
    #[error("invalid operation id '{operation_id}'")]
    InvalidOperationId {
        /// The rejected id.
        operation_id: String,
    },

    /// The path template could not be parsed.
    #[error("operation '{operation_id}': {source}")]
    Template {
        /// Operation being built.
        operation_id: String,
        /// Parse failure.
        #[source]
        source: TemplateError,
    },

    /// A template parameter has no field in the path schema.
    #[error("operation '{operation_id}': path parameter ':{name}' has no field in the path schema")]
    UnmatchedPathParameter {
        /// Operation being built.
        operation_id: String,
        /// Parameter name.
        name: String,
    },

    /// A path schema field has no parameter in the template.
    #[error("operation '{operation_id}': path schema field '{name}' does not appear in the template")]
    UnusedPathField {
        /// Operation being built.
        operation_id: String,
        /// Field name.
        name: String,
    },

    /// A template parameter and its schema field disagree on optionality.
    #[error(
        "operation '{operation_id}': path parameter '{name}' is {} in the template but {} in the path schema",
        if *.template_optional { "optional" } else { "required" },
        if *.template_optional { "required" } else { "optional" }
    )]
    PathOptionalityMismatch {
        /// Operation being built.
        operation_id: String,
        /// Parameter name.
        name: String,
        /// Whether the template marks it optional.
        template_optional: bool,
    },

    /// A path, query, or header schema is not an object.
    #[error("operation '{operation_id}': {location} schema must be an object")]
    NonObjectSlot {
        /// Operation being built.
        operation_id: String,
        /// Offending slot.
        location: Location,
    },

    /// Two responses declare the same status.
    #[error("operation '{operation_id}': status {status} is declared more than once")]
    DuplicateStatus {
        /// Operation being built.
        operation_id: String,
        /// Repeated status.
        status: u16,
    },

    /// A representation list is empty.
    #[error("operation '{operation_id}': {context} must declare at least one representation")]
    NoRepresentations {
        /// Operation being built.
        operation_id: String,
        /// Which list was empty.
        context: String,
    },

    /// Two endpoints share an operation id.
    #[error("duplicate operation id '{operation_id}'")]
    DuplicateOperationId {
        /// Repeated id.
        operation_id: String,
    },

    /// Two groups share a name.
    #[error("duplicate group '{name}'")]
    DuplicateGroup {
        /// Repeated name.
        name: String,
    },

    /// Two endpoints resolve to the same route.
    #[error(transparent)]
    RouteConflict(#[from] RouterError),

    /// A handler was attached to an operation the registry does not contain.
    #[error("no operation '{operation_id}' in the registry")]
    UnknownOperation {
        /// Requested id.
        operation_id: String,
    },

    /// An operation has no handler.
    #[error("operation '{operation_id}' has no handler")]
    MissingHandler {
        /// Operation without a handler.
        operation_id: String,
    },

    /// An operation has more than one handler.
    #[error("operation '{operation_id}' already has a handler")]
    DuplicateHandler {
        /// Operation with two handlers.
        operation_id: String,
    },

    /// A handler expects a different credential type than the security yields.
    #[error("operation '{operation_id}': handler expects credential {found} but security yields {expected}")]
    CredentialMismatch {
        /// Operation being attached.
        operation_id: String,
        /// Type produced by the endpoint's security.
        expected: &'static str,
        /// Type the handler takes.
        found: &'static str,
    },
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// Creates an envelope for a category.
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: category.code().to_string(),
                message: message.into(),
                category,
                details: None,
            },
            request_id: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Attaches a request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: Option<&str>) -> Self {
        self.request_id = request_id.map(ToString::to_string);
        self
    }
}

/// Error detail within an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(
            ErrorCategory::Validation.default_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCategory::Authentication.default_status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCategory::ContractViolation.default_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ErrorCategory::MethodNotAllowed.code(), "METHOD_NOT_ALLOWED");
    }

    #[test]
    fn test_issue_display() {
        let issue = Issue::new(
            vec!["user".into(), "email".into()],
            "string",
            "42",
        );
        assert_eq!(issue.to_string(), "user.email: expected string, received 42");
        assert_eq!(
            Issue::root("object", "null").to_string(),
            "expected object, received null"
        );
    }

    #[test]
    fn test_validation_error_envelope() {
        let error = ValidationError::new(
            Location::Query,
            vec![
                Issue::new(vec!["limit".into()], "integer", "\"ten\""),
                Issue::new(vec!["offset".into()], "integer", "\"x\""),
            ],
        );
        assert_eq!(
            error.to_string(),
            "invalid query: limit: expected integer, received \"ten\" (and 1 more)"
        );

        let envelope = error.to_envelope(Some("req-1"));
        assert_eq!(envelope.error.code, "VALIDATION_ERROR");
        assert_eq!(envelope.request_id.as_deref(), Some("req-1"));
        let details = envelope.error.details.unwrap();
        assert_eq!(details["location"], "query");
        assert_eq!(details["issues"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_http_error_envelope_body() {
        let error = HttpError::not_found("user 7 not found");
        assert_eq!(error.status, StatusCode::NOT_FOUND);
        assert_eq!(error.body["error"]["code"], "NOT_FOUND");
        assert_eq!(error.body["error"]["message"], "user 7 not found");
    }

    #[test]
    fn test_optionality_mismatch_message() {
        let err = ContractError::PathOptionalityMismatch {
            operation_id: "getStuff".into(),
            name: "another".into(),
            template_optional: true,
        };
        assert!(err
            .to_string()
            .contains("is optional in the template but required in the path schema"));
    }
}
