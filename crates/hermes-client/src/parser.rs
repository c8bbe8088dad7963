//! Client response parser.
//!
//! The mirror of the server response encoder:
//!
//! 1. A status of 300 or above is a [`ServerSideError`] carrying the JSON
//!    body, or the raw text when the body is not JSON.
//! 2. A success status the endpoint does not declare is a client-side
//!    [`ClientSideError::UnexpectedStatus`].
//! 3. The body representation is picked by `Content-Type`, falling back to
//!    the first declared one, then decoded through the body schema.
//! 4. Full-response endpoints also decode headers and yield a
//!    `{status, body, headers}` reply; the others yield the bare body.

use bytes::Bytes;
use hermes_core::wire;
use hermes_core::{negotiate, Endpoint, ParseOptions, ResponseSpec, Slot};
use http::header::CONTENT_TYPE;
use http::Response;
use serde_json::{json, Value};

use crate::error::{ClientError, ClientSideError, ServerSideError};

/// Decodes responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser {
    options: ParseOptions,
}

impl ResponseParser {
    /// Creates a parser with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Decodes `response` for `endpoint`.
    pub fn parse(
        &self,
        endpoint: &Endpoint,
        response: &Response<Bytes>,
    ) -> Result<Value, ClientError> {
        let operation_id = endpoint.operation_id();
        let status = response.status();

        if status.as_u16() >= 300 {
            tracing::warn!(operation_id, status = status.as_u16(), "server reported failure");
            return Err(ServerSideError {
                operation_id: operation_id.to_string(),
                status,
                body: raw_body(response.body()),
            }
            .into());
        }

        let Some(spec) = endpoint.response(status) else {
            return Err(ClientSideError::UnexpectedStatus {
                operation_id: operation_id.to_string(),
                status: status.as_u16(),
                allowed: endpoint.statuses(),
            }
            .into());
        };

        let body = self.decode_body(operation_id, spec, response)?;
        if !endpoint.is_full_response() {
            return Ok(body);
        }

        let headers = match spec.headers().schema() {
            Some(schema) => {
                let raw = wire::headers_to_value(response.headers(), schema);
                schema.decode(&raw, &self.options).map_err(|issues| {
                    ClientSideError::decode(operation_id, "invalid headers").with_issues(issues)
                })?
            }
            None => Value::Null,
        };

        Ok(json!({
            "status": status.as_u16(),
            "body": body,
            "headers": headers,
        }))
    }

    fn decode_body(
        &self,
        operation_id: &str,
        spec: &ResponseSpec,
        response: &Response<Bytes>,
    ) -> Result<Value, ClientSideError> {
        let schema = match spec.body() {
            Slot::Ignored => return Ok(Value::Null),
            Slot::Multipart => {
                return Err(ClientSideError::decode(
                    operation_id,
                    "multipart responses are not supported",
                ))
            }
            Slot::Codec(schema) => schema,
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let representation = negotiate(spec.representations(), content_type).ok_or_else(|| {
            ClientSideError::decode(operation_id, "response declares no representation")
        })?;

        let text = std::str::from_utf8(response.body())
            .map_err(|e| ClientSideError::decode(operation_id, format!("body is not UTF-8: {e}")))?;
        let parsed = representation.parse(text).map_err(|e| {
            ClientSideError::decode(
                operation_id,
                format!("cannot parse {}: {e}", representation.content_type()),
            )
        })?;

        let decoded = schema.decode(&parsed, &self.options).map_err(|issues| {
            ClientSideError::decode(operation_id, "invalid body").with_issues(issues)
        })?;
        tracing::debug!(operation_id, status = spec.status().as_u16(), "response decoded");
        Ok(decoded)
    }
}

fn raw_body(body: &Bytes) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Representation, Schema};
    use http::StatusCode;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> Response<Bytes> {
        let mut builder = Response::builder().status(status);
        if let Some(ct) = content_type {
            builder = builder.header(CONTENT_TYPE, ct);
        }
        builder.body(Bytes::from(body.to_string())).unwrap()
    }

    fn text_or_json() -> Endpoint {
        Endpoint::get("greet", "/greet")
            .response(
                ResponseSpec::new(StatusCode::OK)
                    .with_body(Schema::string())
                    .with_representations(vec![
                        Representation::plain_text(),
                        Representation::json(),
                    ]),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_negotiates_by_content_type() {
        let parser = ResponseParser::default();
        let endpoint = text_or_json();

        let value = parser
            .parse(&endpoint, &response(200, Some("text/plain; charset=utf-8"), "hi"))
            .unwrap();
        assert_eq!(value, json!("hi"));

        let value = parser
            .parse(&endpoint, &response(200, Some("application/json"), r#""hi""#))
            .unwrap();
        assert_eq!(value, json!("hi"));

        let value = parser
            .parse(&endpoint, &response(200, Some("application/xml"), "raw"))
            .unwrap();
        assert_eq!(value, json!("raw"));
    }

    #[test]
    fn test_server_side_failure_keeps_body() {
        let parser = ResponseParser::default();
        let endpoint = text_or_json();

        let err = parser
            .parse(&endpoint, &response(404, None, r#"{"reason":"gone"}"#))
            .unwrap_err();
        match err {
            ClientError::Server(e) => {
                assert_eq!(e.status, StatusCode::NOT_FOUND);
                assert_eq!(e.body, json!({"reason": "gone"}));
            }
            ClientError::Client(e) => panic!("expected server-side error, got {e}"),
        }

        let err = parser
            .parse(&endpoint, &response(502, None, "bad gateway"))
            .unwrap_err();
        let ClientError::Server(e) = err else {
            panic!("expected server-side error");
        };
        assert_eq!(e.body, json!("bad gateway"));
    }

    #[test]
    fn test_unknown_status_lists_allowed() {
        let parser = ResponseParser::default();
        let endpoint = text_or_json();

        let err = parser
            .parse(&endpoint, &response(201, None, ""))
            .unwrap_err();
        assert!(err.is_client_side());
        match err {
            ClientError::Client(ClientSideError::UnexpectedStatus { allowed, status, .. }) => {
                assert_eq!(status, 201);
                assert_eq!(allowed, vec![200]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_full_response_decodes_headers() {
        let endpoint = Endpoint::post("create", "/items")
            .response(
                ResponseSpec::new(StatusCode::CREATED)
                    .with_body(Schema::object().field("id", Schema::integer()))
                    .with_headers(Schema::object().field("Location", Schema::string())),
            )
            .response(ResponseSpec::new(StatusCode::NO_CONTENT))
            .build()
            .unwrap();

        let mut wire = response(201, Some("application/json"), r#"{"id":7}"#);
        wire.headers_mut()
            .insert("location", "/items/7".parse().unwrap());
        let value = ResponseParser::default().parse(&endpoint, &wire).unwrap();
        assert_eq!(
            value,
            json!({"status": 201, "body": {"id": 7}, "headers": {"Location": "/items/7"}})
        );

        let value = ResponseParser::default()
            .parse(&endpoint, &response(204, None, ""))
            .unwrap();
        assert_eq!(value, json!({"status": 204, "body": null, "headers": null}));
    }

    #[test]
    fn test_invalid_body_is_client_side() {
        let endpoint = Endpoint::get("count", "/count")
            .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::integer()))
            .build()
            .unwrap();
        let err = ResponseParser::default()
            .parse(&endpoint, &response(200, Some("application/json"), r#""seven""#))
            .unwrap_err();
        assert!(err.is_client_side());
        assert!(!err.is_retryable());
    }
}
