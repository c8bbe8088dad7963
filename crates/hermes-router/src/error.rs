//! Template and routing error types.

use thiserror::Error;

/// Errors raised while parsing or substituting a path template.
///
/// Parse errors surface at contract construction time; substitution errors
/// surface on the client while encoding an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template does not begin with `/`.
    #[error("path template '{template}' must start with '/'")]
    MissingLeadingSlash {
        /// The offending template.
        template: String,
    },

    /// A parameter token has an empty or malformed name.
    #[error("invalid parameter name '{name}' in path template '{template}'")]
    InvalidParameterName {
        /// The offending template.
        template: String,
        /// The raw parameter name.
        name: String,
    },

    /// The same parameter name is used twice.
    #[error("parameter ':{name}' appears more than once in path template '{template}'")]
    DuplicateParameter {
        /// The offending template.
        template: String,
        /// The repeated name.
        name: String,
    },

    /// A literal or required segment follows an optional parameter.
    #[error(
        "segment '{segment}' follows an optional parameter in path template '{template}'; \
         optional parameters may only appear at the end"
    )]
    NotTrailingOptional {
        /// The offending template.
        template: String,
        /// The segment that follows the optional parameter.
        segment: String,
    },

    /// No value was supplied for a required parameter.
    #[error("missing value for required path parameter '{name}'")]
    MissingParameter {
        /// Parameter name.
        name: String,
    },

    /// An empty string was supplied for a parameter.
    #[error("empty value for path parameter '{name}'")]
    EmptyParameter {
        /// Parameter name.
        name: String,
    },

    /// An optional parameter is present while an earlier optional one is absent.
    #[error("optional path parameter '{present}' is set but the preceding optional parameter '{missing}' is not")]
    OptionalGap {
        /// The absent optional parameter.
        missing: String,
        /// The present optional parameter that follows it.
        present: String,
    },
}

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The template could not be parsed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Two operations resolve to the same method and path shape.
    #[error("route conflict: {method} {path} is already bound to '{existing}'")]
    Conflict {
        /// HTTP method.
        method: String,
        /// The template being registered.
        path: String,
        /// Operation already bound to the route.
        existing: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemplateError::MissingParameter {
            name: "id".to_string(),
        };
        assert_eq!(err.to_string(), "missing value for required path parameter 'id'");

        let err = RouterError::Conflict {
            method: "GET".to_string(),
            path: "/users/:id".to_string(),
            existing: "getUser".to_string(),
        };
        assert!(err.to_string().contains("getUser"));
    }
}
