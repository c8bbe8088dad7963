//! Wire representations of bodies.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

type StringifyFn = Arc<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;
type ParseFn = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// A body serialization format with its content type.
///
/// # Example
///
/// ```
/// use hermes_core::Representation;
/// use serde_json::json;
///
/// let text = Representation::plain_text();
/// assert_eq!(text.stringify(&json!("hello")).unwrap(), "hello");
/// assert_eq!(text.stringify(&json!(42)).unwrap(), "42");
/// assert_eq!(text.stringify(&json!({"a": 1})).unwrap(), r#"{"a":1}"#);
/// assert!(text.matches("text/plain; charset=utf-8"));
/// ```
#[derive(Clone)]
pub struct Representation {
    content_type: String,
    stringify: StringifyFn,
    parse: ParseFn,
}

impl Representation {
    /// Creates a custom representation.
    pub fn new<S, P>(content_type: impl Into<String>, stringify: S, parse: P) -> Self
    where
        S: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
        P: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            content_type: content_type.into(),
            stringify: Arc::new(stringify),
            parse: Arc::new(parse),
        }
    }

    /// `application/json`. An empty or blank body parses as null.
    #[must_use]
    pub fn json() -> Self {
        Self::new(
            mime::APPLICATION_JSON.as_ref(),
            |value| serde_json::to_string(value).map_err(|e| e.to_string()),
            |text| {
                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }
                serde_json::from_str(text).map_err(|e| e.to_string())
            },
        )
    }

    /// `text/plain`.
    ///
    /// Strings are written as-is, numbers and booleans in their decimal or
    /// literal form, and anything else as JSON. Parsing yields the text as a
    /// string.
    #[must_use]
    pub fn plain_text() -> Self {
        Self::new(
            mime::TEXT_PLAIN.as_ref(),
            |value| match value {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                Value::Bool(b) => Ok(b.to_string()),
                other => serde_json::to_string(other).map_err(|e| e.to_string()),
            },
            |text| Ok(Value::String(text.to_string())),
        )
    }

    /// The content type written on encode.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Serializes a value.
    pub fn stringify(&self, value: &Value) -> Result<String, String> {
        (self.stringify)(value)
    }

    /// Parses text.
    pub fn parse(&self, text: &str) -> Result<Value, String> {
        (self.parse)(text)
    }

    /// Returns true if a `Content-Type` header value selects this
    /// representation. Parameters are ignored and the comparison is
    /// case-insensitive.
    #[must_use]
    pub fn matches(&self, content_type: &str) -> bool {
        match (essence(content_type), essence(&self.content_type)) {
            (Some(theirs), Some(ours)) => theirs == ours,
            _ => false,
        }
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Picks the representation selected by a `Content-Type`, falling back to
/// the first declared one.
#[must_use]
pub fn negotiate<'a>(
    representations: &'a [Representation],
    content_type: Option<&str>,
) -> Option<&'a Representation> {
    content_type
        .and_then(|ct| representations.iter().find(|r| r.matches(ct)))
        .or_else(|| representations.first())
}

fn essence(content_type: &str) -> Option<String> {
    content_type
        .parse::<mime::Mime>()
        .ok()
        .map(|m| m.essence_str().to_ascii_lowercase())
}
