//! Test error types.

use thiserror::Error;

/// Errors raised while building requests or reading responses.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be built.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// The response body is not valid UTF-8.
    #[error("body is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = TestError::RequestBuild("bad uri".into());
        assert_eq!(err.to_string(), "request build error: bad uri");
    }

    #[test]
    fn test_from_json() {
        let json_err = serde_json::from_str::<i32>("nope").unwrap_err();
        let err: TestError = json_err.into();
        assert!(matches!(err, TestError::Json(_)));
    }
}
