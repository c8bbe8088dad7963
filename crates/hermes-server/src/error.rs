//! Server-side runtime faults.
//!
//! Each fault renders as an [`ErrorEnvelope`] with the status of its
//! category:
//!
//! | Fault | Status | Code |
//! |-------|--------|------|
//! | [`RequestError::Validation`] | 400 | `VALIDATION_ERROR` |
//! | [`RequestError::Security`] | 401 | `AUTHENTICATION_ERROR` |
//! | [`ResponseEncodingError`] | 500 | `CONTRACT_VIOLATION` |

use hermes_core::{ErrorCategory, ErrorEnvelope, Issue, ValidationError};
use hermes_security::SecurityError;
use http::StatusCode;
use thiserror::Error;

/// An inbound request did not satisfy its endpoint's contract.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// One or more slots failed to decode, in slot order.
    #[error("{}", describe_validation(.0))]
    Validation(Vec<ValidationError>),

    /// The security extraction failed.
    #[error(transparent)]
    Security(#[from] SecurityError),
}

impl RequestError {
    /// Returns the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Security(_) => ErrorCategory::Authentication,
        }
    }

    /// Returns the response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to an envelope.
    ///
    /// A single failing slot carries `{location, issues}` details; several
    /// carry `{errors: [{location, issues}, ...]}`.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        match self {
            Self::Validation(errors) => match errors.as_slice() {
                [only] => only.to_envelope(request_id),
                _ => ErrorEnvelope::new(ErrorCategory::Validation, self.to_string())
                    .with_details(serde_json::json!({
                        "errors": errors
                            .iter()
                            .map(|e| serde_json::json!({
                                "location": e.location,
                                "issues": e.issues,
                            }))
                            .collect::<Vec<_>>(),
                    }))
                    .with_request_id(request_id),
            },
            Self::Security(e) => ErrorEnvelope::new(ErrorCategory::Authentication, e.to_string())
                .with_details(serde_json::json!({ "scheme": e.scheme }))
                .with_request_id(request_id),
        }
    }
}

impl From<ValidationError> for RequestError {
    fn from(error: ValidationError) -> Self {
        Self::Validation(vec![error])
    }
}

fn describe_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A handler produced a value its endpoint does not declare.
///
/// This is a programming error; the server answers 500 and logs it.
#[derive(Debug, Clone, Error)]
#[error("operation '{operation_id}': {message}")]
pub struct ResponseEncodingError {
    /// Operation whose handler misbehaved.
    pub operation_id: String,
    /// What went wrong.
    pub message: String,
    /// Schema issues, if the failure came from a codec.
    pub issues: Vec<Issue>,
}

impl ResponseEncodingError {
    /// Creates an encoding error without schema issues.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            message: message.into(),
            issues: Vec::new(),
        }
    }

    /// Attaches schema issues.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues = issues;
        self
    }

    /// Converts this error to an envelope. Issue details are not exposed.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope::new(
            ErrorCategory::ContractViolation,
            "response does not match the declared contract",
        )
        .with_request_id(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::Location;

    fn query_error() -> ValidationError {
        ValidationError::new(
            Location::Query,
            vec![Issue::new(vec!["limit".into()], "integer", "\"x\"")],
        )
    }

    #[test]
    fn test_single_validation_envelope() {
        let error = RequestError::from(query_error());
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.details.unwrap()["location"], "query");
    }

    #[test]
    fn test_multi_validation_envelope() {
        let body = ValidationError::new(Location::Body, vec![Issue::root("object", "null")]);
        let error = RequestError::Validation(vec![query_error(), body]);
        assert_eq!(
            error.to_string(),
            "invalid query: limit: expected integer, received \"x\"; invalid body: expected object, received null"
        );
        let details = error.to_envelope(Some("r")).error.details.unwrap();
        assert_eq!(details["errors"][1]["location"], "body");
    }

    #[test]
    fn test_security_envelope() {
        let error = RequestError::from(SecurityError::missing("bearerAuth", "Authorization header"));
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.code, "AUTHENTICATION_ERROR");
        assert_eq!(envelope.error.details.unwrap()["scheme"], "bearerAuth");
    }

    #[test]
    fn test_encoding_envelope_hides_issues() {
        let error = ResponseEncodingError::new("getUser", "status 418 is not declared")
            .with_issues(vec![Issue::root("string", "1")]);
        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.code, "CONTRACT_VIOLATION");
        assert!(envelope.error.details.is_none());
    }
}
