//! Server response encoder.
//!
//! Turns a handler's output into a wire response:
//!
//! 1. Split the output into status, body, and headers. Endpoints with one
//!    response and no headers return a bare body; the others return a
//!    [`Reply`](hermes_core::Reply) triple.
//! 2. Look up the [`ResponseSpec`](hermes_core::ResponseSpec) for the status.
//!    An undeclared status is a [`ResponseEncodingError`], never a silent 200.
//! 3. Encode the body through its schema and stringify it with the first
//!    declared representation.
//! 4. Encode the headers through their schema and add `content-type`.

use bytes::Bytes;
use hermes_core::wire;
use hermes_core::{Endpoint, ErrorEnvelope, HttpError, ParseOptions, Slot};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use serde_json::Value;

use crate::error::ResponseEncodingError;

/// Encodes handler output into responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder {
    options: ParseOptions,
}

impl ResponseEncoder {
    /// Creates an encoder with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Encodes a handler's output for `endpoint`.
    ///
    /// Failures are logged at error level before they are returned.
    pub fn encode(
        &self,
        endpoint: &Endpoint,
        output: Value,
    ) -> Result<Response<Bytes>, ResponseEncodingError> {
        self.try_encode(endpoint, output).map_err(|e| {
            tracing::error!(
                operation_id = %e.operation_id,
                issues = ?e.issues,
                "{}",
                e.message
            );
            e
        })
    }

    fn try_encode(
        &self,
        endpoint: &Endpoint,
        output: Value,
    ) -> Result<Response<Bytes>, ResponseEncodingError> {
        let operation_id = endpoint.operation_id();
        let fail = |message: String| ResponseEncodingError::new(operation_id, message);

        let (status, body, headers) = split(endpoint, output).map_err(fail)?;

        let spec = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| endpoint.response(s))
            .ok_or_else(|| {
                fail(format!(
                    "status {status} is not declared (declared: {:?})",
                    endpoint.statuses()
                ))
            })?;

        let mut response = Response::new(Bytes::new());
        *response.status_mut() = spec.status();

        match spec.body() {
            Slot::Ignored => {
                if !body.is_null() {
                    return Err(fail(format!("status {status} declares no body")));
                }
            }
            Slot::Codec(schema) => {
                let encoded = schema.encode(&body, &self.options).map_err(|issues| {
                    fail(format!("body for status {status} does not match its schema"))
                        .with_issues(issues)
                })?;
                let representation = spec
                    .representations()
                    .first()
                    .ok_or_else(|| fail(format!("status {status} has no representation")))?;
                let text = representation
                    .stringify(&encoded)
                    .map_err(|e| fail(format!("cannot stringify body: {e}")))?;
                let content_type = HeaderValue::from_str(representation.content_type())
                    .map_err(|_| fail("invalid content type".to_string()))?;
                response.headers_mut().insert(CONTENT_TYPE, content_type);
                *response.body_mut() = Bytes::from(text);
            }
            Slot::Multipart => {
                return Err(fail("multipart bodies cannot be encoded".to_string()));
            }
        }

        match spec.headers().schema() {
            Some(schema) => {
                let headers = if headers.is_null() {
                    Value::Object(serde_json::Map::new())
                } else {
                    headers
                };
                let encoded = schema.encode(&headers, &self.options).map_err(|issues| {
                    fail(format!("headers for status {status} do not match their schema"))
                        .with_issues(issues)
                })?;
                let map = wire::value_to_headers(&encoded).map_err(|issues| {
                    fail("headers are not string-valued".to_string()).with_issues(issues)
                })?;
                for (name, value) in &map {
                    response.headers_mut().append(name, value.clone());
                }
            }
            None => {
                if !is_empty(&headers) {
                    return Err(fail(format!("status {status} declares no headers")));
                }
            }
        }

        tracing::debug!(operation_id, status, "response encoded");
        Ok(response)
    }
}

fn split(endpoint: &Endpoint, output: Value) -> Result<(u16, Value, Value), String> {
    let sole = match endpoint.responses() {
        [only] => Some(only.status().as_u16()),
        _ => None,
    };

    if !endpoint.is_full_response() {
        let status = sole.ok_or_else(|| "endpoint has no sole response".to_string())?;
        return Ok((status, output, Value::Null));
    }

    let Value::Object(mut reply) = output else {
        return Err("expected a {status, body, headers} reply".to_string());
    };
    let status = match reply.get("status") {
        Some(value) => value
            .as_u64()
            .and_then(|s| u16::try_from(s).ok())
            .ok_or_else(|| format!("invalid status {value}"))?,
        None => sole.ok_or_else(|| "reply has no status".to_string())?,
    };
    let body = reply.remove("body").unwrap_or(Value::Null);
    let headers = reply.remove("headers").unwrap_or(Value::Null);
    Ok((status, body, headers))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Renders an envelope as a JSON response.
#[must_use]
pub fn envelope_response(status: StatusCode, envelope: &ErrorEnvelope) -> Response<Bytes> {
    json_response(
        status,
        serde_json::to_vec(envelope).unwrap_or_default(),
    )
}

/// Renders a handler's [`HttpError`] as a JSON response.
#[must_use]
pub fn http_error_response(error: &HttpError) -> Response<Bytes> {
    json_response(error.status, serde_json::to_vec(&error.body).unwrap_or_default())
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response<Bytes> {
    let mut response = Response::new(Bytes::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
