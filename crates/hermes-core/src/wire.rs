//! Conversions between HTTP wire shapes and schema values.
//!
//! Path parameters, query strings, and headers are strings on the wire. On
//! the way in they become a JSON object of strings (or string arrays) for a
//! schema to decode; on the way out an encoded JSON object must consist of
//! strings (or string arrays) again, otherwise the encode fails.
//!
//! Both server and client use these helpers, so the two sides agree on the
//! wire shape by construction.

use hermes_router::Params;
use http::{HeaderMap, HeaderName, HeaderValue};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::Issue;
use crate::schema::Schema;

pub use crate::schema::render;

/// Turns a raw query string into an object for `schema` to decode.
///
/// Repeated keys become arrays. A single value for a property whose wire
/// form is an array is wrapped in a one-element array; several values for a
/// scalar property are kept as an array so the schema reports them. A
/// required array property with no pairs becomes an empty array, since an
/// empty array has no pairs on the wire.
pub fn query_to_value(raw: &str, schema: Option<&Schema>) -> Result<Value, Issue> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw)
        .map_err(|e| Issue::root("url-encoded query string", format!("{raw:?} ({e})")))?;

    let mut grouped: IndexMap<String, Vec<String>> = IndexMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }

    let mut object = Map::with_capacity(grouped.len());
    for (key, mut values) in grouped {
        let wants_array = schema
            .and_then(|s| s.property(&key))
            .is_some_and(Schema::is_array);
        let value = if wants_array || values.len() > 1 {
            Value::Array(values.into_iter().map(Value::String).collect())
        } else {
            Value::String(values.pop().unwrap_or_default())
        };
        object.insert(key, value);
    }
    if let Some(schema) = schema {
        fill_required_arrays(&mut object, schema);
    }
    Ok(Value::Object(object))
}

fn fill_required_arrays(object: &mut Map<String, Value>, schema: &Schema) {
    let Some(properties) = schema.properties() else {
        return;
    };
    for (name, property) in properties {
        if property.is_array() && schema.is_required(name) && !object.contains_key(name) {
            object.insert(name.clone(), Value::Array(Vec::new()));
        }
    }
}

/// Collects the headers named by `schema` into an object.
///
/// Names are matched case-insensitively and keyed by the schema's spelling.
/// Headers the schema does not name are not included. A required array
/// header that is absent becomes an empty array.
#[must_use]
pub fn headers_to_value(headers: &HeaderMap, schema: &Schema) -> Value {
    let mut object = Map::new();
    let Some(properties) = schema.properties() else {
        return Value::Object(object);
    };
    for (name, property) in properties {
        let lower = name.to_ascii_lowercase();
        let mut values: Vec<String> = headers
            .get_all(lower.as_str())
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        if values.is_empty() {
            continue;
        }
        let value = if property.is_array() || values.len() > 1 {
            Value::Array(values.into_iter().map(Value::String).collect())
        } else {
            Value::String(values.remove(0))
        };
        object.insert(name.clone(), value);
    }
    fill_required_arrays(&mut object, schema);
    Value::Object(object)
}

/// Turns captured path parameters into an object.
#[must_use]
pub fn params_to_value(params: &Params) -> Value {
    Value::Object(
        params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect(),
    )
}

/// Flattens an encoded object into key/value pairs. Arrays repeat the key.
pub fn value_to_pairs(value: &Value) -> Result<Vec<(String, String)>, Vec<Issue>> {
    let mut pairs = Vec::new();
    let mut issues = Vec::new();
    for_each_string(value, true, &mut issues, |key, s| {
        pairs.push((key.to_string(), s.to_string()));
    });
    if issues.is_empty() {
        Ok(pairs)
    } else {
        Err(issues)
    }
}

/// Converts an encoded object into path parameter values. Arrays are not
/// allowed.
pub fn value_to_params(value: &Value) -> Result<Params, Vec<Issue>> {
    let mut params = Params::new();
    let mut issues = Vec::new();
    for_each_string(value, false, &mut issues, |key, s| params.push(key, s));
    if issues.is_empty() {
        Ok(params)
    } else {
        Err(issues)
    }
}

/// Converts an encoded object into headers. Arrays append repeated headers.
pub fn value_to_headers(value: &Value) -> Result<HeaderMap, Vec<Issue>> {
    let mut headers = HeaderMap::new();
    let mut issues = Vec::new();
    let mut invalid = Vec::new();
    for_each_string(value, true, &mut issues, |key, s| {
        match (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(s),
        ) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            (Err(_), _) => invalid.push(Issue::new(
                vec![key.to_string()],
                "valid header name",
                format!("{key:?}"),
            )),
            (_, Err(_)) => invalid.push(Issue::new(
                vec![key.to_string()],
                "valid header value",
                format!("{s:?}"),
            )),
        }
    });
    issues.extend(invalid);
    if issues.is_empty() {
        Ok(headers)
    } else {
        Err(issues)
    }
}

fn for_each_string<F>(value: &Value, allow_arrays: bool, issues: &mut Vec<Issue>, mut f: F)
where
    F: FnMut(&str, &str),
{
    let Some(object) = value.as_object() else {
        issues.push(Issue::root("object", render(value)));
        return;
    };
    for (key, field) in object {
        match field {
            Value::Null => {}
            Value::String(s) => f(key, s),
            Value::Array(items) if allow_arrays => {
                for (index, item) in items.iter().enumerate() {
                    match item {
                        Value::String(s) => f(key, s),
                        other => issues.push(Issue::new(
                            vec![key.clone(), index.to_string()],
                            "string",
                            render(other),
                        )),
                    }
                }
            }
            other => issues.push(Issue::new(
                vec![key.clone()],
                if allow_arrays {
                    "string or array of strings"
                } else {
                    "string"
                },
                render(other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags_schema() -> Schema {
        Schema::object()
            .optional_field("tag", Schema::array(Schema::string()))
            .optional_field("q", Schema::string())
    }

    #[test]
    fn test_query_single_value_coerced_to_array() {
        let value = query_to_value("tag=a&q=x", Some(&tags_schema())).unwrap();
        assert_eq!(value, json!({"tag": ["a"], "q": "x"}));
    }

    #[test]
    fn test_query_repeated_keys() {
        let value = query_to_value("tag=a&tag=b", Some(&tags_schema())).unwrap();
        assert_eq!(value, json!({"tag": ["a", "b"]}));

        let value = query_to_value("q=x&q=y", Some(&tags_schema())).unwrap();
        assert_eq!(value, json!({"q": ["x", "y"]}));
    }

    #[test]
    fn test_query_required_array_without_pairs_is_empty() {
        let schema = Schema::object()
            .field("tag", Schema::array(Schema::string()))
            .optional_field("label", Schema::array(Schema::string()));
        let value = query_to_value("", Some(&schema)).unwrap();
        assert_eq!(value, json!({"tag": []}));

        let value = query_to_value("tag=a", Some(&schema)).unwrap();
        assert_eq!(value, json!({"tag": ["a"]}));
    }

    #[test]
    fn test_headers_required_array_without_values_is_empty() {
        let schema = Schema::object()
            .field("x-tags", Schema::array(Schema::string()))
            .optional_field("x-labels", Schema::array(Schema::string()));
        let value = headers_to_value(&HeaderMap::new(), &schema);
        assert_eq!(value, json!({"x-tags": []}));
    }

    #[test]
    fn test_query_decodes_percent_and_plus() {
        let value = query_to_value("q=hello+world%21", None).unwrap();
        assert_eq!(value, json!({"q": "hello world!"}));
    }

    #[test]
    fn test_headers_to_value_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-token", HeaderValue::from_static("abc"));
        headers.insert("x-other", HeaderValue::from_static("ignored"));
        let schema = Schema::object().field("X-Request-Token", Schema::string());

        let value = headers_to_value(&headers, &schema);
        assert_eq!(value, json!({"X-Request-Token": "abc"}));
    }

    #[test]
    fn test_value_to_pairs_repeats_arrays() {
        let pairs = value_to_pairs(&json!({"tag": ["a", "b"], "q": "x", "skip": null})).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "x".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_value_to_params_rejects_non_strings() {
        let issues = value_to_params(&json!({"id": 7})).unwrap_err();
        assert_eq!(issues[0].path, vec!["id"]);
        assert_eq!(issues[0].expected, "string");

        let issues = value_to_params(&json!({"id": ["a"]})).unwrap_err();
        assert_eq!(issues[0].expected, "string");
    }

    #[test]
    fn test_value_to_headers() {
        let headers = value_to_headers(&json!({"etag": "v1", "vary": ["a", "b"]})).unwrap();
        assert_eq!(headers.get("etag").unwrap(), "v1");
        assert_eq!(headers.get_all("vary").iter().count(), 2);

        let issues = value_to_headers(&json!({"bad name": "x"})).unwrap_err();
        assert_eq!(issues[0].expected, "valid header name");
    }
}
