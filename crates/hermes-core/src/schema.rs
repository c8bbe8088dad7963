//! Bidirectional schemas.
//!
//! A [`Schema`] is a codec between a wire value and a domain value, both
//! carried as [`serde_json::Value`]. Decoding validates and converts what
//! arrived on the wire; encoding validates and converts what a handler or
//! caller produced. Typed Rust values enter and leave through serde at the
//! edges of the server and client.
//!
//! Most variants are symmetric: a `String` schema accepts a string in both
//! directions. The `*FromString` variants and [`Schema::transform`] are not:
//! `IntegerFromString` decodes `"42"` into `42` and encodes `42` into `"42"`,
//! which is how numeric path and query parameters are declared.
//!
//! # Example
//!
//! ```
//! use hermes_core::{ParseOptions, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::object()
//!     .field("id", Schema::integer_from_string())
//!     .optional_field("tab", Schema::string());
//!
//! let options = ParseOptions::default();
//! let decoded = schema.decode(&json!({"id": "7", "extra": true}), &options).unwrap();
//! assert_eq!(decoded, json!({"id": 7}));
//!
//! let encoded = schema.encode(&decoded, &options).unwrap();
//! assert_eq!(encoded, json!({"id": "7"}));
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde_json::{Number, Value};

use crate::error::Issue;
use crate::options::ParseOptions;

/// Longest rendering of a received value kept in an [`Issue`].
const MAX_RECEIVED_LEN: usize = 64;

type TransformFn = Arc<dyn Fn(Value) -> Result<Value, String> + Send + Sync>;

/// A user-supplied conversion between two schemas.
#[derive(Clone)]
pub struct Transform {
    name: String,
    wire: Box<Schema>,
    domain: Box<Schema>,
    decode: TransformFn,
    encode: TransformFn,
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("name", &self.name)
            .field("wire", &self.wire)
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

/// A bidirectional value codec.
#[derive(Debug, Clone)]
pub enum Schema {
    /// String.
    String {
        /// Minimum length in characters.
        min_length: Option<usize>,
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// Integer.
    Integer {
        /// Minimum value.
        minimum: Option<i64>,
        /// Maximum value.
        maximum: Option<i64>,
    },
    /// Number (float or integer).
    Number {
        /// Minimum value.
        minimum: Option<f64>,
        /// Maximum value.
        maximum: Option<f64>,
    },
    /// Boolean.
    Boolean,
    /// Null.
    Null,
    /// Any value, passed through unchanged.
    Any,
    /// Exactly this value.
    Literal(Value),
    /// Array.
    Array {
        /// Schema for array items.
        items: Box<Schema>,
        /// Minimum number of items.
        min_items: Option<usize>,
        /// Maximum number of items.
        max_items: Option<usize>,
    },
    /// Object with known properties. Unknown properties are dropped.
    Object {
        /// Properties in declaration order.
        properties: IndexMap<String, Schema>,
        /// Names of the required properties.
        required: IndexSet<String>,
    },
    /// The inner schema, or null.
    Nullable(Box<Schema>),
    /// The first variant that accepts the value.
    Union(Vec<Schema>),
    /// Wire string, domain integer.
    IntegerFromString,
    /// Wire string, domain number.
    NumberFromString,
    /// Wire `"true"`/`"false"`, domain boolean.
    BooleanFromString,
    /// User-supplied conversion.
    Transform(Transform),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Decode,
    Encode,
}

impl Schema {
    /// Creates a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::String {
            min_length: None,
            max_length: None,
        }
    }

    /// Creates an integer schema.
    #[must_use]
    pub fn integer() -> Self {
        Self::Integer {
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a number schema.
    #[must_use]
    pub fn number() -> Self {
        Self::Number {
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// Creates a null schema.
    #[must_use]
    pub fn null() -> Self {
        Self::Null
    }

    /// Creates an "any" schema that accepts any value.
    #[must_use]
    pub fn any() -> Self {
        Self::Any
    }

    /// Creates a literal schema.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Creates an array schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array {
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Creates an empty object schema; add properties with
    /// [`field`](Self::field) and [`optional_field`](Self::optional_field).
    #[must_use]
    pub fn object() -> Self {
        Self::Object {
            properties: IndexMap::new(),
            required: IndexSet::new(),
        }
    }

    /// Creates a union schema.
    #[must_use]
    pub fn union(variants: impl IntoIterator<Item = Schema>) -> Self {
        Self::Union(variants.into_iter().collect())
    }

    /// Creates a string-encoded integer schema.
    #[must_use]
    pub fn integer_from_string() -> Self {
        Self::IntegerFromString
    }

    /// Creates a string-encoded number schema.
    #[must_use]
    pub fn number_from_string() -> Self {
        Self::NumberFromString
    }

    /// Creates a string-encoded boolean schema.
    #[must_use]
    pub fn boolean_from_string() -> Self {
        Self::BooleanFromString
    }

    /// Creates a user-supplied conversion.
    ///
    /// Decoding runs `wire`, then `decode`, then `domain`; encoding runs the
    /// same steps backwards. `name` appears in issues when a step fails.
    pub fn transform<D, E>(
        name: impl Into<String>,
        wire: Schema,
        domain: Schema,
        decode: D,
        encode: E,
    ) -> Self
    where
        D: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
        E: Fn(Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::Transform(Transform {
            name: name.into(),
            wire: Box::new(wire),
            domain: Box::new(domain),
            decode: Arc::new(decode),
            encode: Arc::new(encode),
        })
    }

    /// Wraps this schema so that null is also accepted.
    #[must_use]
    pub fn nullable(self) -> Self {
        Self::Nullable(Box::new(self))
    }

    /// Adds a required property to an object schema.
    #[must_use]
    pub fn field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with_property(name.into(), schema, true)
    }

    /// Adds an optional property to an object schema.
    #[must_use]
    pub fn optional_field(self, name: impl Into<String>, schema: Schema) -> Self {
        self.with_property(name.into(), schema, false)
    }

    fn with_property(self, name: String, schema: Schema, is_required: bool) -> Self {
        match self {
            Self::Object {
                mut properties,
                mut required,
            } => {
                if is_required {
                    required.insert(name.clone());
                } else {
                    required.shift_remove(&name);
                }
                properties.insert(name, schema);
                Self::Object {
                    properties,
                    required,
                }
            }
            other => other,
        }
    }

    /// Sets the minimum length for string schemas.
    #[must_use]
    pub fn min_length(self, len: usize) -> Self {
        match self {
            Self::String { max_length, .. } => Self::String {
                min_length: Some(len),
                max_length,
            },
            other => other,
        }
    }

    /// Sets the maximum length for string schemas.
    #[must_use]
    pub fn max_length(self, len: usize) -> Self {
        match self {
            Self::String { min_length, .. } => Self::String {
                min_length,
                max_length: Some(len),
            },
            other => other,
        }
    }

    /// Sets the minimum value for integer schemas.
    #[must_use]
    pub fn minimum_int(self, min: i64) -> Self {
        match self {
            Self::Integer { maximum, .. } => Self::Integer {
                minimum: Some(min),
                maximum,
            },
            other => other,
        }
    }

    /// Sets the maximum value for integer schemas.
    #[must_use]
    pub fn maximum_int(self, max: i64) -> Self {
        match self {
            Self::Integer { minimum, .. } => Self::Integer {
                minimum,
                maximum: Some(max),
            },
            other => other,
        }
    }

    /// Sets the minimum value for number schemas.
    #[must_use]
    pub fn minimum(self, min: f64) -> Self {
        match self {
            Self::Number { maximum, .. } => Self::Number {
                minimum: Some(min),
                maximum,
            },
            other => other,
        }
    }

    /// Sets the maximum value for number schemas.
    #[must_use]
    pub fn maximum(self, max: f64) -> Self {
        match self {
            Self::Number { minimum, .. } => Self::Number {
                minimum,
                maximum: Some(max),
            },
            other => other,
        }
    }

    /// Sets the minimum items for array schemas.
    #[must_use]
    pub fn min_items(self, min: usize) -> Self {
        match self {
            Self::Array {
                items, max_items, ..
            } => Self::Array {
                items,
                min_items: Some(min),
                max_items,
            },
            other => other,
        }
    }

    /// Sets the maximum items for array schemas.
    #[must_use]
    pub fn max_items(self, max: usize) -> Self {
        match self {
            Self::Array {
                items, min_items, ..
            } => Self::Array {
                items,
                min_items,
                max_items: Some(max),
            },
            other => other,
        }
    }

    /// Returns true if the wire form is an array.
    ///
    /// Query and header decoding use this to decide whether a single value
    /// should be wrapped in a one-element array.
    #[must_use]
    pub fn is_array(&self) -> bool {
        match self {
            Self::Array { .. } => true,
            Self::Nullable(inner) => inner.is_array(),
            Self::Transform(t) => t.wire.is_array(),
            Self::Union(variants) => variants.iter().any(Self::is_array),
            _ => false,
        }
    }

    /// Returns true for object schemas.
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }

    /// Object properties, in declaration order.
    #[must_use]
    pub fn properties(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Self::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Required object property names.
    #[must_use]
    pub fn required(&self) -> Option<&IndexSet<String>> {
        match self {
            Self::Object { required, .. } => Some(required),
            _ => None,
        }
    }

    /// Looks up an object property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties().and_then(|p| p.get(name))
    }

    /// Returns true if the object property is required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required().is_some_and(|r| r.contains(name))
    }

    /// Returns true if the domain form accepts an absent value, i.e. an
    /// object with no required properties.
    #[must_use]
    pub fn accepts_empty(&self) -> bool {
        match self {
            Self::Object { required, .. } => required.is_empty(),
            Self::Nullable(_) | Self::Any | Self::Null => true,
            _ => false,
        }
    }

    /// Decodes a wire value into a domain value.
    pub fn decode(&self, wire: &Value, options: &ParseOptions) -> Result<Value, Vec<Issue>> {
        self.run_root(wire, Direction::Decode, options)
    }

    /// Encodes a domain value into a wire value.
    pub fn encode(&self, domain: &Value, options: &ParseOptions) -> Result<Value, Vec<Issue>> {
        self.run_root(domain, Direction::Encode, options)
    }

    fn run_root(
        &self,
        value: &Value,
        direction: Direction,
        options: &ParseOptions,
    ) -> Result<Value, Vec<Issue>> {
        let mut cx = Cx {
            direction,
            options,
            path: Vec::new(),
            issues: Vec::new(),
        };
        match self.run(value, &mut cx) {
            Some(out) if cx.issues.is_empty() => Ok(out),
            _ => Err(cx.issues),
        }
    }

    fn run(&self, value: &Value, cx: &mut Cx<'_>) -> Option<Value> {
        match self {
            Self::String {
                min_length,
                max_length,
            } => {
                let Some(s) = value.as_str() else {
                    return cx.fail(self.describe(cx.direction), value);
                };
                let len = s.chars().count();
                if let Some(min) = min_length {
                    if len < *min {
                        return cx.fail(format!("string of at least {min} characters"), value);
                    }
                }
                if let Some(max) = max_length {
                    if len > *max {
                        return cx.fail(format!("string of at most {max} characters"), value);
                    }
                }
                Some(value.clone())
            }
            Self::Integer { minimum, maximum } => {
                let Some(n) = value.as_i64() else {
                    return cx.fail("integer", value);
                };
                check_range(n, *minimum, *maximum, cx, value)?;
                Some(value.clone())
            }
            Self::Number { minimum, maximum } => {
                let Some(n) = value.as_f64() else {
                    return cx.fail("number", value);
                };
                if let Some(min) = minimum {
                    if n < *min {
                        return cx.fail(format!("number >= {min}"), value);
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        return cx.fail(format!("number <= {max}"), value);
                    }
                }
                Some(value.clone())
            }
            Self::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                _ => cx.fail("boolean", value),
            },
            Self::Null => match value {
                Value::Null => Some(Value::Null),
                _ => cx.fail("null", value),
            },
            Self::Any => Some(value.clone()),
            Self::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    cx.fail(self.describe(cx.direction), value)
                }
            }
            Self::Array {
                items,
                min_items,
                max_items,
            } => {
                let Some(array) = value.as_array() else {
                    return cx.fail("array", value);
                };
                if let Some(min) = min_items {
                    if array.len() < *min {
                        return cx.fail(format!("array of at least {min} items"), value);
                    }
                }
                if let Some(max) = max_items {
                    if array.len() > *max {
                        return cx.fail(format!("array of at most {max} items"), value);
                    }
                }
                let mut out = Vec::with_capacity(array.len());
                let mut ok = true;
                for (index, item) in array.iter().enumerate() {
                    cx.path.push(index.to_string());
                    match items.run(item, cx) {
                        Some(v) => out.push(v),
                        None => ok = false,
                    }
                    cx.path.pop();
                    if !ok && cx.options.stops_early() {
                        break;
                    }
                }
                ok.then_some(Value::Array(out))
            }
            Self::Object {
                properties,
                required,
            } => {
                let Some(object) = value.as_object() else {
                    return cx.fail("object", value);
                };
                let mut out = serde_json::Map::with_capacity(properties.len());
                let mut ok = true;
                for (name, schema) in properties {
                    let is_required = required.contains(name);
                    cx.path.push(name.clone());
                    match object.get(name) {
                        None if is_required => {
                            cx.issues.push(Issue::new(
                                cx.path.clone(),
                                schema.describe(cx.direction),
                                "undefined",
                            ));
                            ok = false;
                        }
                        None => {}
                        Some(Value::Null) if !is_required => {}
                        Some(field) => match schema.run(field, cx) {
                            Some(v) => {
                                out.insert(name.clone(), v);
                            }
                            None => ok = false,
                        },
                    }
                    cx.path.pop();
                    if !ok && cx.options.stops_early() {
                        break;
                    }
                }
                ok.then_some(Value::Object(out))
            }
            Self::Nullable(inner) => match value {
                Value::Null => Some(Value::Null),
                _ => inner.run(value, cx),
            },
            Self::Union(variants) => {
                for variant in variants {
                    let mut scratch = Cx {
                        direction: cx.direction,
                        options: cx.options,
                        path: cx.path.clone(),
                        issues: Vec::new(),
                    };
                    if let Some(out) = variant.run(value, &mut scratch) {
                        if scratch.issues.is_empty() {
                            return Some(out);
                        }
                    }
                }
                cx.fail(self.describe(cx.direction), value)
            }
            Self::IntegerFromString => match cx.direction {
                Direction::Decode => match value.as_str().map(str::parse::<i64>) {
                    Some(Ok(n)) => Some(Value::from(n)),
                    _ => cx.fail(self.describe(cx.direction), value),
                },
                Direction::Encode => match value.as_i64() {
                    Some(n) => Some(Value::String(n.to_string())),
                    None => cx.fail(self.describe(cx.direction), value),
                },
            },
            Self::NumberFromString => match cx.direction {
                Direction::Decode => match value.as_str().and_then(parse_number) {
                    Some(n) => Some(Value::Number(n)),
                    None => cx.fail(self.describe(cx.direction), value),
                },
                Direction::Encode => match value {
                    Value::Number(n) => Some(Value::String(n.to_string())),
                    _ => cx.fail(self.describe(cx.direction), value),
                },
            },
            Self::BooleanFromString => match cx.direction {
                Direction::Decode => match value.as_str() {
                    Some("true") => Some(Value::Bool(true)),
                    Some("false") => Some(Value::Bool(false)),
                    _ => cx.fail(self.describe(cx.direction), value),
                },
                Direction::Encode => match value {
                    Value::Bool(b) => Some(Value::String(b.to_string())),
                    _ => cx.fail(self.describe(cx.direction), value),
                },
            },
            Self::Transform(t) => {
                let (first, convert, last) = match cx.direction {
                    Direction::Decode => (&t.wire, &t.decode, &t.domain),
                    Direction::Encode => (&t.domain, &t.encode, &t.wire),
                };
                let intermediate = first.run(value, cx)?;
                match convert(intermediate.clone()) {
                    Ok(converted) => last.run(&converted, cx),
                    Err(reason) => cx.fail(format!("{} ({reason})", t.name), &intermediate),
                }
            }
        }
    }

    fn describe(&self, direction: Direction) -> String {
        match self {
            Self::String { .. } => "string".to_string(),
            Self::Integer { .. } => "integer".to_string(),
            Self::Number { .. } => "number".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Null => "null".to_string(),
            Self::Any => "any value".to_string(),
            Self::Literal(v) => render(v),
            Self::Array { .. } => "array".to_string(),
            Self::Object { .. } => "object".to_string(),
            Self::Nullable(inner) => format!("{} or null", inner.describe(direction)),
            Self::Union(variants) => variants
                .iter()
                .map(|v| v.describe(direction))
                .collect::<Vec<_>>()
                .join(" | "),
            Self::IntegerFromString => match direction {
                Direction::Decode => "string containing an integer".to_string(),
                Direction::Encode => "integer".to_string(),
            },
            Self::NumberFromString => match direction {
                Direction::Decode => "string containing a number".to_string(),
                Direction::Encode => "number".to_string(),
            },
            Self::BooleanFromString => match direction {
                Direction::Decode => "\"true\" or \"false\"".to_string(),
                Direction::Encode => "boolean".to_string(),
            },
            Self::Transform(t) => t.name.clone(),
        }
    }
}

struct Cx<'a> {
    direction: Direction,
    options: &'a ParseOptions,
    path: Vec<String>,
    issues: Vec<Issue>,
}

impl Cx<'_> {
    fn fail(&mut self, expected: impl Into<String>, received: &Value) -> Option<Value> {
        self.issues
            .push(Issue::new(self.path.clone(), expected, render(received)));
        None
    }
}

fn check_range(
    n: i64,
    minimum: Option<i64>,
    maximum: Option<i64>,
    cx: &mut Cx<'_>,
    value: &Value,
) -> Option<()> {
    if let Some(min) = minimum {
        if n < min {
            cx.fail(format!("integer >= {min}"), value);
            return None;
        }
    }
    if let Some(max) = maximum {
        if n > max {
            cx.fail(format!("integer <= {max}"), value);
            return None;
        }
    }
    Some(())
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(Number::from(n));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Renders a value for an issue, truncated.
pub fn render(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_RECEIVED_LEN {
        return rendered;
    }
    let truncated: String = rendered.chars().take(MAX_RECEIVED_LEN).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn all() -> ParseOptions {
        ParseOptions::all()
    }

    fn user() -> Schema {
        Schema::object()
            .field("name", Schema::string().min_length(1))
            .field("age", Schema::integer().minimum_int(0))
            .optional_field("email", Schema::string())
    }

    #[test]
    fn test_object_strips_unknown() {
        let decoded = user()
            .decode(&json!({"name": "Ann", "age": 3, "extra": 1}), &all())
            .unwrap();
        assert_eq!(decoded, json!({"name": "Ann", "age": 3}));
    }

    #[test]
    fn test_optional_null_is_absent() {
        let decoded = user()
            .decode(&json!({"name": "Ann", "age": 3, "email": null}), &all())
            .unwrap();
        assert_eq!(decoded, json!({"name": "Ann", "age": 3}));
    }

    #[test]
    fn test_collects_all_issues() {
        let issues = user()
            .decode(&json!({"name": "", "email": 5}), &all())
            .unwrap_err();
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].path, vec!["name"]);
        assert_eq!(issues[0].expected, "string of at least 1 characters");
        assert_eq!(issues[1].path, vec!["age"]);
        assert_eq!(issues[1].received, "undefined");
        assert_eq!(issues[2].path, vec!["email"]);
    }

    #[test]
    fn test_first_mode_stops() {
        let issues = user()
            .decode(&json!({"name": "", "email": 5}), &ParseOptions::first())
            .unwrap_err();
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_nested_path() {
        let schema = Schema::object().field("users", Schema::array(user()));
        let issues = schema
            .decode(&json!({"users": [{"name": "a", "age": 1}, {"name": "b", "age": "x"}]}), &all())
            .unwrap_err();
        assert_eq!(issues[0].path, vec!["users", "1", "age"]);
        assert_eq!(issues[0].to_string(), "users.1.age: expected integer, received \"x\"");
    }

    #[test]
    fn test_integer_from_string() {
        let schema = Schema::integer_from_string();
        assert_eq!(schema.decode(&json!("42"), &all()).unwrap(), json!(42));
        assert_eq!(schema.encode(&json!(42), &all()).unwrap(), json!("42"));

        let issues = schema.decode(&json!("4.2"), &all()).unwrap_err();
        assert_eq!(issues[0].expected, "string containing an integer");
        let issues = schema.encode(&json!("42"), &all()).unwrap_err();
        assert_eq!(issues[0].expected, "integer");
    }

    #[test]
    fn test_number_and_boolean_from_string() {
        let number = Schema::number_from_string();
        assert_eq!(number.decode(&json!("1.5"), &all()).unwrap(), json!(1.5));
        assert_eq!(number.decode(&json!("2"), &all()).unwrap(), json!(2));
        assert_eq!(number.encode(&json!(1.5), &all()).unwrap(), json!("1.5"));
        assert!(number.decode(&json!("NaN"), &all()).is_err());

        let boolean = Schema::boolean_from_string();
        assert_eq!(boolean.decode(&json!("true"), &all()).unwrap(), json!(true));
        assert_eq!(boolean.encode(&json!(false), &all()).unwrap(), json!("false"));
        assert!(boolean.decode(&json!("yes"), &all()).is_err());
    }

    #[test]
    fn test_union_and_literal() {
        let schema = Schema::union([Schema::literal("asc"), Schema::literal("desc")]);
        assert_eq!(schema.decode(&json!("asc"), &all()).unwrap(), json!("asc"));
        let issues = schema.decode(&json!("up"), &all()).unwrap_err();
        assert_eq!(issues[0].expected, "\"asc\" | \"desc\"");
    }

    #[test]
    fn test_nullable() {
        let schema = Schema::integer().nullable();
        assert_eq!(schema.decode(&Value::Null, &all()).unwrap(), Value::Null);
        assert_eq!(schema.decode(&json!(1), &all()).unwrap(), json!(1));
        let issues = schema.decode(&json!("1"), &all()).unwrap_err();
        assert_eq!(issues[0].expected, "integer");
    }

    #[test]
    fn test_transform() {
        let cents = Schema::transform(
            "decimal amount",
            Schema::string(),
            Schema::integer(),
            |wire| {
                let s = wire.as_str().unwrap_or_default();
                let (whole, frac) = s.split_once('.').ok_or("missing decimal point")?;
                let whole: i64 = whole.parse().map_err(|_| "bad whole part".to_string())?;
                let frac: i64 = frac.parse().map_err(|_| "bad fraction".to_string())?;
                Ok(json!(whole * 100 + frac))
            },
            |domain| {
                let n = domain.as_i64().unwrap_or_default();
                Ok(json!(format!("{}.{:02}", n / 100, n % 100)))
            },
        );

        assert_eq!(cents.decode(&json!("12.34"), &all()).unwrap(), json!(1234));
        assert_eq!(cents.encode(&json!(1234), &all()).unwrap(), json!("12.34"));

        let issues = cents.decode(&json!("12"), &all()).unwrap_err();
        assert_eq!(issues[0].expected, "decimal amount (missing decimal point)");
    }

    #[test]
    fn test_array_bounds_and_is_array() {
        let schema = Schema::array(Schema::string()).min_items(1).max_items(2);
        assert!(schema.is_array());
        assert!(schema.clone().nullable().is_array());
        assert!(schema.decode(&json!([]), &all()).is_err());
        assert!(schema.decode(&json!(["a", "b", "c"]), &all()).is_err());
        assert!(schema.decode(&json!(["a"]), &all()).is_ok());
    }

    #[test]
    fn test_received_is_truncated() {
        let long = "x".repeat(200);
        let issues = Schema::integer().decode(&json!(long), &all()).unwrap_err();
        assert!(issues[0].received.ends_with("..."));
        assert!(issues[0].received.len() < 80);
    }

    #[test]
    fn test_accessors() {
        let schema = user();
        assert!(schema.is_object());
        assert!(schema.is_required("name"));
        assert!(!schema.is_required("email"));
        assert_eq!(
            schema.properties().unwrap().keys().collect::<Vec<_>>(),
            vec!["name", "age", "email"]
        );
        assert!(!schema.accepts_empty());
        assert!(Schema::object().optional_field("q", Schema::string()).accepts_empty());
    }
}
