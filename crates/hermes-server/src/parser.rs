//! Server request parser.
//!
//! Decodes an inbound request against its endpoint, slot by slot:
//!
//! ```text
//!   path captures ──► path schema ──┐
//!   query string  ──► query schema ─┤
//!   headers       ──► header schema ├──► {path, query, headers, body} ──► security ──► ParsedRequest
//!   body bytes    ──► representation┘
//!                      + body schema
//! ```
//!
//! Slots are decoded in the order path, query, headers, body. With
//! [`ErrorReporting::All`](hermes_core::ErrorReporting::All) every failing
//! slot is reported; with `First` parsing stops at the first one. Security
//! runs only once every slot has decoded.

use std::sync::Arc;

use bytes::Bytes;
use hermes_core::wire::{self, render};
use hermes_core::{negotiate, Endpoint, Issue, Location, ParseOptions, Slot, ValidationError};
use hermes_router::Params;
use hermes_security::{ApiKeyIn, BoxedCredential, RequestHead, SchemeKind};
use http::header::CONTENT_TYPE;
use http::request::Parts;
use serde_json::{Map, Value};

use crate::config::DEFAULT_MAX_MULTIPART_FIELDS;
use crate::error::RequestError;
use crate::multipart;

/// A request that satisfied its endpoint's contract.
pub struct ParsedRequest {
    /// Decoded slots as `{path, query, headers, body}`. Ignored slots are
    /// absent.
    pub input: Value,
    /// The credential produced by the endpoint's security.
    pub credential: BoxedCredential,
}

impl std::fmt::Debug for ParsedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedRequest")
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

/// Decodes inbound requests.
#[derive(Debug, Clone, Copy)]
pub struct RequestParser {
    options: ParseOptions,
    max_multipart_fields: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new(ParseOptions::default())
    }
}

impl RequestParser {
    /// Creates a parser with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            max_multipart_fields: DEFAULT_MAX_MULTIPART_FIELDS,
        }
    }

    /// Sets the multipart field limit.
    #[must_use]
    pub fn with_max_multipart_fields(mut self, max: usize) -> Self {
        self.max_multipart_fields = max;
        self
    }

    /// Returns the parse options.
    #[must_use]
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Decodes every slot, then runs security.
    pub async fn parse(
        &self,
        endpoint: &Endpoint,
        parts: &Parts,
        params: &Params,
        body: Bytes,
    ) -> Result<ParsedRequest, RequestError> {
        let input = self.decode_slots(endpoint, parts, params, body).await?;

        let head = Arc::new(RequestHead::from_parts(parts));
        let credential = endpoint.security().extract(head).await.map_err(|e| {
            tracing::warn!(
                operation_id = endpoint.operation_id(),
                scheme = %e.scheme,
                "security extraction failed"
            );
            RequestError::Security(e)
        })?;

        Ok(ParsedRequest { input, credential })
    }

    /// Decodes the four request slots into `{path, query, headers, body}`.
    pub async fn decode_slots(
        &self,
        endpoint: &Endpoint,
        parts: &Parts,
        params: &Params,
        body: Bytes,
    ) -> Result<Value, RequestError> {
        let mut input = Map::new();
        let mut errors = Vec::new();

        let path = endpoint
            .path_params()
            .schema()
            .map(|schema| self.decode(Location::Path, schema, &wire::params_to_value(params)));
        if let Some(result) = path {
            self.collect(&mut input, &mut errors, Location::Path, result);
            if self.should_stop(&errors) {
                return Err(RequestError::Validation(errors));
            }
        }

        if let Some(schema) = endpoint.query().schema() {
            let raw = parts.uri.query().unwrap_or_default();
            let result = wire::query_to_value(raw, Some(schema))
                .map_err(|issue| ValidationError::new(Location::Query, vec![issue]))
                .and_then(|value| self.decode(Location::Query, schema, &value));
            self.collect(&mut input, &mut errors, Location::Query, result);
            if self.should_stop(&errors) {
                return Err(RequestError::Validation(errors));
            }
        } else if let Some(error) = unexpected_query(endpoint, parts.uri.query()) {
            errors.push(error);
            if self.should_stop(&errors) {
                return Err(RequestError::Validation(errors));
            }
        }

        if let Some(schema) = endpoint.headers().schema() {
            let value = wire::headers_to_value(&parts.headers, schema);
            let result = self.decode(Location::Headers, schema, &value);
            self.collect(&mut input, &mut errors, Location::Headers, result);
            if self.should_stop(&errors) {
                return Err(RequestError::Validation(errors));
            }
        }

        match self.decode_body(endpoint, parts, body).await {
            Ok(Some(value)) => {
                input.insert(Location::Body.as_str().to_string(), value);
            }
            Ok(None) => {}
            Err(error) => errors.push(error),
        }

        if errors.is_empty() {
            tracing::debug!(operation_id = endpoint.operation_id(), "request decoded");
            Ok(Value::Object(input))
        } else {
            tracing::warn!(
                operation_id = endpoint.operation_id(),
                locations = ?errors.iter().map(|e| e.location).collect::<Vec<_>>(),
                "request validation failed"
            );
            Err(RequestError::Validation(errors))
        }
    }

    async fn decode_body(
        &self,
        endpoint: &Endpoint,
        parts: &Parts,
        body: Bytes,
    ) -> Result<Option<Value>, ValidationError> {
        let content_type = parts
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let body_error = |issue: Issue| ValidationError::new(Location::Body, vec![issue]);

        match endpoint.body() {
            Slot::Ignored => {
                if body.is_empty() {
                    Ok(None)
                } else {
                    let text = String::from_utf8_lossy(&body).into_owned();
                    Err(body_error(Issue::root("empty body", render(&Value::String(text)))))
                }
            }
            Slot::Multipart => {
                multipart::read_form(content_type, body, self.max_multipart_fields)
                    .await
                    .map(Some)
                    .map_err(body_error)
            }
            Slot::Codec(schema) => {
                if body.is_empty() && schema.accepts_empty() {
                    return Ok(None);
                }
                let Some(representation) =
                    negotiate(endpoint.request_representations(), content_type)
                else {
                    return Err(body_error(Issue::root("declared representation", "none")));
                };
                let text = std::str::from_utf8(&body)
                    .map_err(|e| body_error(Issue::root("UTF-8 text", e.to_string())))?;
                let parsed = representation.parse(text).map_err(|e| {
                    body_error(Issue::root(
                        representation.content_type().to_string(),
                        e,
                    ))
                })?;
                self.decode(Location::Body, schema, &parsed).map(Some)
            }
        }
    }

    fn decode(
        &self,
        location: Location,
        schema: &hermes_core::Schema,
        value: &Value,
    ) -> Result<Value, ValidationError> {
        schema
            .decode(value, &self.options)
            .map_err(|issues| ValidationError::new(location, issues))
    }

    fn collect(
        &self,
        input: &mut Map<String, Value>,
        errors: &mut Vec<ValidationError>,
        location: Location,
        result: Result<Value, ValidationError>,
    ) {
        match result {
            Ok(value) => {
                input.insert(location.as_str().to_string(), value);
            }
            Err(error) => errors.push(error),
        }
    }

    fn should_stop(&self, errors: &[ValidationError]) -> bool {
        self.options.stops_early() && !errors.is_empty()
    }
}

/// Checks the query string of an endpoint with an ignored query slot.
///
/// Only parameters read by the endpoint's query API-key schemes may appear.
/// Custom schemes can read anything, so their presence disables the check.
fn unexpected_query(endpoint: &Endpoint, raw: Option<&str>) -> Option<ValidationError> {
    let raw = raw.filter(|q| !q.is_empty())?;
    let security = endpoint.security();
    if security
        .schemes()
        .any(|doc| matches!(doc.kind, SchemeKind::Custom { .. }))
    {
        return None;
    }

    let claimed: Vec<&str> = security
        .schemes()
        .filter_map(|doc| match &doc.kind {
            SchemeKind::ApiKey {
                key,
                location: ApiKeyIn::Query,
            } => Some(key.as_str()),
            _ => None,
        })
        .collect();

    let issues = match wire::query_to_value(raw, None) {
        Ok(Value::Object(object)) => object
            .iter()
            .filter(|(key, _)| !claimed.contains(&key.as_str()))
            .map(|(key, value)| {
                Issue::new(vec![key.clone()], "no query parameter", render(value))
            })
            .collect(),
        Ok(_) => Vec::new(),
        Err(issue) => vec![issue],
    };
    (!issues.is_empty()).then(|| ValidationError::new(Location::Query, issues))
}
