//! Client request encoder.
//!
//! The mirror of the server request parser. The input has the same
//! `{path, query, headers, body}` shape a server handler receives:
//!
//! 1. Each slot is encoded through its schema. Missing path, query, and
//!    header slots encode as empty objects.
//! 2. Path values are substituted into the template; absent optional
//!    parameters drop their segment.
//! 3. Query values become pairs, repeating the key for arrays.
//! 4. The body is stringified with the first request representation, or
//!    written as a form for multipart endpoints.
//! 5. Each supplied credential is injected by its scheme.

use bytes::Bytes;
use hermes_core::wire;
use hermes_core::{Endpoint, Location, ParseOptions, Schema, Slot};
use hermes_router::Params;
use hermes_security::Credentials;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Request};
use serde_json::{Map, Value};

use crate::error::ClientSideError;
use crate::multipart;

/// Encodes typed input into requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestEncoder {
    options: ParseOptions,
}

impl RequestEncoder {
    /// Creates an encoder with the given options.
    #[must_use]
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Encodes `input` for `endpoint`, injecting `credentials`.
    ///
    /// A credential for a scheme the endpoint does not declare is an error.
    pub fn encode(
        &self,
        endpoint: &Endpoint,
        input: &Value,
        credentials: &Credentials,
    ) -> Result<Request<Bytes>, ClientSideError> {
        let operation_id = endpoint.operation_id();
        let slot_input = |location: Location| input.get(location.as_str());

        let params = match endpoint.path_params().schema() {
            Some(schema) => {
                let encoded = self.encode_object(
                    operation_id,
                    Location::Path,
                    schema,
                    slot_input(Location::Path),
                )?;
                wire::value_to_params(&encoded).map_err(|issues| {
                    ClientSideError::encode(operation_id, "path values must be strings")
                        .with_issues(issues)
                })?
            }
            None => Params::new(),
        };
        let path = endpoint
            .template()
            .substitute(&params)
            .map_err(|e| ClientSideError::encode(operation_id, e.to_string()))?;

        let mut query = match endpoint.query().schema() {
            Some(schema) => {
                let encoded = self.encode_object(
                    operation_id,
                    Location::Query,
                    schema,
                    slot_input(Location::Query),
                )?;
                wire::value_to_pairs(&encoded).map_err(|issues| {
                    ClientSideError::encode(operation_id, "query values must be strings")
                        .with_issues(issues)
                })?
            }
            None => Vec::new(),
        };

        let mut headers = match endpoint.headers().schema() {
            Some(schema) => {
                let encoded = self.encode_object(
                    operation_id,
                    Location::Headers,
                    schema,
                    slot_input(Location::Headers),
                )?;
                wire::value_to_headers(&encoded).map_err(|issues| {
                    ClientSideError::encode(operation_id, "header values must be strings")
                        .with_issues(issues)
                })?
            }
            None => HeaderMap::new(),
        };

        let body = self.encode_body(endpoint, slot_input(Location::Body), &mut headers)?;

        for (scheme, credential) in credentials.iter() {
            let doc = endpoint.security().scheme(scheme).ok_or_else(|| {
                ClientSideError::encode(
                    operation_id,
                    format!("security scheme '{scheme}' is not declared"),
                )
            })?;
            doc.inject(credential, &mut headers, &mut query)
                .map_err(|e| ClientSideError::encode(operation_id, e.to_string()))?;
        }

        let uri = if query.is_empty() {
            path
        } else {
            let encoded = serde_urlencoded::to_string(&query)
                .map_err(|e| ClientSideError::encode(operation_id, e.to_string()))?;
            format!("{path}?{encoded}")
        };

        let mut request = Request::builder()
            .method(endpoint.method().clone())
            .uri(uri.as_str())
            .body(body)
            .map_err(|e| ClientSideError::encode(operation_id, e.to_string()))?;
        *request.headers_mut() = headers;

        tracing::debug!(operation_id, %uri, "request encoded");
        Ok(request)
    }

    fn encode_object(
        &self,
        operation_id: &str,
        location: Location,
        schema: &Schema,
        value: Option<&Value>,
    ) -> Result<Value, ClientSideError> {
        let value = match value {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(value) => value.clone(),
        };
        schema.encode(&value, &self.options).map_err(|issues| {
            ClientSideError::encode(operation_id, format!("invalid {location}")).with_issues(issues)
        })
    }

    fn encode_body(
        &self,
        endpoint: &Endpoint,
        value: Option<&Value>,
        headers: &mut HeaderMap,
    ) -> Result<Bytes, ClientSideError> {
        let operation_id = endpoint.operation_id();
        let mut set_content_type = |content_type: &str| {
            HeaderValue::from_str(content_type)
                .map(|v| {
                    headers.insert(CONTENT_TYPE, v);
                })
                .map_err(|_| ClientSideError::encode(operation_id, "invalid content type"))
        };

        match endpoint.body() {
            Slot::Ignored => match value {
                None | Some(Value::Null) => Ok(Bytes::new()),
                Some(_) => Err(ClientSideError::encode(
                    operation_id,
                    "endpoint declares no request body",
                )),
            },
            Slot::Multipart => {
                let form = value.unwrap_or(&Value::Null);
                let form = multipart::write_form(form).map_err(|issue| {
                    ClientSideError::encode(operation_id, "invalid form").with_issues(vec![issue])
                })?;
                set_content_type(&form.content_type)?;
                Ok(Bytes::from(form.body))
            }
            Slot::Codec(schema) => {
                let Some(value) = value else {
                    if schema.accepts_empty() {
                        return Ok(Bytes::new());
                    }
                    return Err(ClientSideError::encode(operation_id, "missing request body"));
                };
                let encoded = schema.encode(value, &self.options).map_err(|issues| {
                    ClientSideError::encode(operation_id, "invalid body").with_issues(issues)
                })?;
                let representation = endpoint
                    .request_representations()
                    .first()
                    .ok_or_else(|| {
                        ClientSideError::encode(operation_id, "no request representation")
                    })?;
                let text = representation
                    .stringify(&encoded)
                    .map_err(|e| ClientSideError::encode(operation_id, e))?;
                set_content_type(representation.content_type())?;
                Ok(Bytes::from(text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::Representation;
    use hermes_security::{ApiKeyIn, Credential, Security};
    use http::Method;
    use serde_json::json;

    fn encoder() -> RequestEncoder {
        RequestEncoder::default()
    }

    #[test]
    fn test_optional_segment_omitted() {
        let endpoint = Endpoint::get("getStuff", "/stuff/:param/:another?")
            .path(
                Schema::object()
                    .field("param", Schema::string())
                    .optional_field("another", Schema::string()),
            )
            .build()
            .unwrap();

        let request = encoder()
            .encode(&endpoint, &json!({"path": {"param": "value"}}), &Credentials::new())
            .unwrap();
        assert_eq!(request.uri(), "/stuff/value");

        let request = encoder()
            .encode(
                &endpoint,
                &json!({"path": {"param": "a b", "another": "c"}}),
                &Credentials::new(),
            )
            .unwrap();
        assert_eq!(request.uri(), "/stuff/a%20b/c");
        assert_eq!(request.method(), Method::GET);
    }

    #[test]
    fn test_query_arrays_repeat_keys() {
        let endpoint = Endpoint::get("search", "/search")
            .query(
                Schema::object()
                    .field("tag", Schema::array(Schema::string()))
                    .optional_field("page", Schema::integer_from_string()),
            )
            .build()
            .unwrap();

        let request = encoder()
            .encode(
                &endpoint,
                &json!({"query": {"tag": ["a", "b"], "page": 2}}),
                &Credentials::new(),
            )
            .unwrap();
        assert_eq!(request.uri(), "/search?page=2&tag=a&tag=b");
    }

    #[test]
    fn test_body_uses_first_representation() {
        let endpoint = Endpoint::post("echo", "/echo")
            .body(Schema::string())
            .request_representations(vec![Representation::plain_text(), Representation::json()])
            .build()
            .unwrap();

        let request = encoder()
            .encode(&endpoint, &json!({"body": "hello"}), &Credentials::new())
            .unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(request.body().as_ref(), b"hello");
    }

    #[test]
    fn test_invalid_body_is_client_side() {
        let endpoint = Endpoint::post("create", "/users")
            .body(Schema::object().field("name", Schema::string()))
            .build()
            .unwrap();

        let err = encoder()
            .encode(&endpoint, &json!({"body": {"name": 7}}), &Credentials::new())
            .unwrap_err();
        assert!(matches!(err, ClientSideError::Encode { .. }));
        assert_eq!(err.issues()[0].path, vec!["name".to_string()]);

        let err = encoder()
            .encode(&endpoint, &json!({}), &Credentials::new())
            .unwrap_err();
        assert!(err.to_string().contains("missing request body"));
    }

    #[test]
    fn test_credentials_injected_per_scheme() {
        let endpoint = Endpoint::get("me", "/me")
            .security(
                Security::bearer("bearerAuth")
                    .and(Security::api_key("keyAuth", "api_key", ApiKeyIn::Query)),
            )
            .build()
            .unwrap();

        let mut credentials = Credentials::new();
        credentials.set("bearerAuth", Credential::bearer("t0k"));
        credentials.set("keyAuth", Credential::api_key("k"));
        let request = encoder().encode(&endpoint, &json!({}), &credentials).unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer t0k");
        assert_eq!(request.uri(), "/me?api_key=k");

        let mut unknown = Credentials::new();
        unknown.set("basicAuth", Credential::basic("a", "b"));
        let err = encoder().encode(&endpoint, &json!({}), &unknown).unwrap_err();
        assert!(err.to_string().contains("'basicAuth' is not declared"));
    }

    #[test]
    fn test_headers_encoded() {
        let endpoint = Endpoint::get("traced", "/traced")
            .headers(Schema::object().field("x-trace", Schema::string()))
            .build()
            .unwrap();

        let request = encoder()
            .encode(&endpoint, &json!({"headers": {"x-trace": "abc"}}), &Credentials::new())
            .unwrap();
        assert_eq!(request.headers()["x-trace"], "abc");
    }
}
