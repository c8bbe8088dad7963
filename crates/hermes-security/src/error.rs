//! Security error types.

use thiserror::Error;

/// A credential could not be extracted, verified, or injected.
///
/// On the server this maps to `401 Unauthorized`. `scheme` names the scheme
/// whose failure was reported, which for composite security values follows
/// the priority rules documented on [`Security::and`] and [`Security::or`].
///
/// [`Security::and`]: crate::Security::and
/// [`Security::or`]: crate::Security::or
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("security scheme '{scheme}' failed: {message}")]
pub struct SecurityError {
    /// Name of the failing scheme.
    pub scheme: String,
    /// Human-readable failure reason.
    pub message: String,
}

impl SecurityError {
    /// Creates a new security error.
    #[must_use]
    pub fn new(scheme: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            message: message.into(),
        }
    }

    /// The credential was absent from the request.
    #[must_use]
    pub fn missing(scheme: impl Into<String>, what: &str) -> Self {
        Self::new(scheme, format!("missing {what}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SecurityError::missing("bearerAuth", "authorization header");
        assert_eq!(
            err.to_string(),
            "security scheme 'bearerAuth' failed: missing authorization header"
        );
    }
}
