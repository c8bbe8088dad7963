//! Endpoint declarations.
//!
//! An [`Endpoint`] is one HTTP operation's full declaration: identity
//! (operation id, method, path template), four request codec slots, the
//! status-keyed response set, security, and descriptive metadata. It is
//! immutable once built; [`EndpointBuilder::build`] checks it for internal
//! consistency and reports every problem as a [`ContractError`].

use std::collections::HashSet;

use hermes_router::PathTemplate;
use hermes_security::AnySecurity;
use http::{Method, StatusCode};

use crate::error::{ContractError, Location};
use crate::representation::Representation;
use crate::response::ResponseSpec;
use crate::schema::Schema;
use crate::slot::Slot;

/// An immutable endpoint declaration.
///
/// # Example
///
/// ```
/// use hermes_core::{Endpoint, ResponseSpec, Schema};
/// use http::StatusCode;
///
/// let endpoint = Endpoint::get("getStuff", "/stuff/:param/:another?")
///     .path(
///         Schema::object()
///             .field("param", Schema::string())
///             .optional_field("another", Schema::string()),
///     )
///     .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(endpoint.operation_id(), "getStuff");
/// assert!(!endpoint.is_full_response());
/// ```
#[derive(Debug, Clone)]
pub struct Endpoint {
    operation_id: String,
    method: Method,
    template: PathTemplate,
    body: Slot,
    path: Slot,
    query: Slot,
    headers: Slot,
    request_representations: Vec<Representation>,
    responses: Vec<ResponseSpec>,
    security: AnySecurity,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
}

impl Endpoint {
    /// Creates a builder for any method.
    #[must_use]
    pub fn builder(
        method: Method,
        operation_id: impl Into<String>,
        path: impl Into<String>,
    ) -> EndpointBuilder {
        EndpointBuilder::new(method, operation_id, path)
    }

    /// Creates a `GET` endpoint builder.
    #[must_use]
    pub fn get(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::GET, operation_id, path)
    }

    /// Creates a `POST` endpoint builder.
    #[must_use]
    pub fn post(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::POST, operation_id, path)
    }

    /// Creates a `PUT` endpoint builder.
    #[must_use]
    pub fn put(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::PUT, operation_id, path)
    }

    /// Creates a `PATCH` endpoint builder.
    #[must_use]
    pub fn patch(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::PATCH, operation_id, path)
    }

    /// Creates a `DELETE` endpoint builder.
    #[must_use]
    pub fn delete(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::DELETE, operation_id, path)
    }

    /// Creates a `HEAD` endpoint builder.
    #[must_use]
    pub fn head(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::HEAD, operation_id, path)
    }

    /// Creates an `OPTIONS` endpoint builder.
    #[must_use]
    pub fn options(operation_id: impl Into<String>, path: impl Into<String>) -> EndpointBuilder {
        Self::builder(Method::OPTIONS, operation_id, path)
    }

    /// Returns the operation ID.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the path template as written.
    #[must_use]
    pub fn path(&self) -> &str {
        self.template.as_str()
    }

    /// Returns the compiled path template.
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Returns the request body slot.
    #[must_use]
    pub fn body(&self) -> &Slot {
        &self.body
    }

    /// Returns the path parameter slot.
    #[must_use]
    pub fn path_params(&self) -> &Slot {
        &self.path
    }

    /// Returns the query slot.
    #[must_use]
    pub fn query(&self) -> &Slot {
        &self.query
    }

    /// Returns the request header slot.
    #[must_use]
    pub fn headers(&self) -> &Slot {
        &self.headers
    }

    /// Returns the slot for a request location.
    #[must_use]
    pub fn slot(&self, location: Location) -> &Slot {
        match location {
            Location::Body => &self.body,
            Location::Path => &self.path,
            Location::Query => &self.query,
            Location::Headers => &self.headers,
        }
    }

    /// Returns the request body representations.
    #[must_use]
    pub fn request_representations(&self) -> &[Representation] {
        &self.request_representations
    }

    /// Returns the declared responses, in declaration order.
    #[must_use]
    pub fn responses(&self) -> &[ResponseSpec] {
        &self.responses
    }

    /// Looks up the response declared for a status.
    #[must_use]
    pub fn response(&self, status: StatusCode) -> Option<&ResponseSpec> {
        self.responses.iter().find(|r| r.status() == status)
    }

    /// Returns the declared statuses, in declaration order.
    #[must_use]
    pub fn statuses(&self) -> Vec<u16> {
        self.responses.iter().map(|r| r.status().as_u16()).collect()
    }

    /// Returns the security requirement.
    #[must_use]
    pub fn security(&self) -> &AnySecurity {
        &self.security
    }

    /// Returns the summary.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns true if the endpoint is deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Returns true if handlers and callers exchange a
    /// `{status, body, headers}` triple instead of a bare body.
    ///
    /// That is the case when more than one response is declared or any
    /// response declares headers.
    #[must_use]
    pub fn is_full_response(&self) -> bool {
        self.responses.len() > 1 || self.responses.iter().any(ResponseSpec::has_headers)
    }

    /// Returns true if a caller must supply input.
    ///
    /// False when every request slot is ignored or accepts an empty value.
    #[must_use]
    pub fn requires_input(&self) -> bool {
        [&self.body, &self.path, &self.query, &self.headers]
            .iter()
            .any(|slot| match slot {
                Slot::Ignored => false,
                Slot::Multipart => true,
                Slot::Codec(schema) => !schema.accepts_empty(),
            })
    }
}

/// Builder for [`Endpoint`].
#[derive(Debug)]
pub struct EndpointBuilder {
    operation_id: String,
    method: Method,
    path: String,
    body: Slot,
    path_schema: Slot,
    query: Slot,
    headers: Slot,
    request_representations: Vec<Representation>,
    responses: Vec<ResponseSpec>,
    security: AnySecurity,
    summary: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    deprecated: bool,
}

impl EndpointBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, operation_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            method,
            path: path.into(),
            body: Slot::Ignored,
            path_schema: Slot::Ignored,
            query: Slot::Ignored,
            headers: Slot::Ignored,
            request_representations: vec![Representation::json()],
            responses: Vec::new(),
            security: AnySecurity::none(),
            summary: None,
            description: None,
            tags: Vec::new(),
            deprecated: false,
        }
    }

    /// Sets the request body schema.
    #[must_use]
    pub fn body(mut self, schema: Schema) -> Self {
        self.body = Slot::Codec(schema);
        self
    }

    /// Declares a `multipart/form-data` request body.
    #[must_use]
    pub fn multipart(mut self) -> Self {
        self.body = Slot::Multipart;
        self
    }

    /// Sets the path parameter schema. Must be an object whose fields match
    /// the template's parameters.
    #[must_use]
    pub fn path(mut self, schema: Schema) -> Self {
        self.path_schema = Slot::Codec(schema);
        self
    }

    /// Sets the query schema. Must be an object.
    #[must_use]
    pub fn query(mut self, schema: Schema) -> Self {
        self.query = Slot::Codec(schema);
        self
    }

    /// Sets the request header schema. Must be an object.
    #[must_use]
    pub fn headers(mut self, schema: Schema) -> Self {
        self.headers = Slot::Codec(schema);
        self
    }

    /// Replaces the request body representations.
    #[must_use]
    pub fn request_representations(mut self, representations: Vec<Representation>) -> Self {
        self.request_representations = representations;
        self
    }

    /// Adds a response. Without any, a bare `200` with an ignored body is
    /// declared.
    #[must_use]
    pub fn response(mut self, response: ResponseSpec) -> Self {
        self.responses.push(response);
        self
    }

    /// Sets the security requirement.
    #[must_use]
    pub fn security(mut self, security: impl Into<AnySecurity>) -> Self {
        self.security = security.into();
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the endpoint as deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Builds the endpoint.
    pub fn build(self) -> Result<Endpoint, ContractError> {
        let operation_id = self.operation_id;
        if operation_id.is_empty() || operation_id.chars().any(char::is_whitespace) {
            return Err(ContractError::InvalidOperationId { operation_id });
        }

        let template = match PathTemplate::parse(&self.path) {
            Ok(template) => template,
            Err(source) => {
                return Err(ContractError::Template {
                    operation_id,
                    source,
                })
            }
        };

        for (location, slot) in [
            (Location::Path, &self.path_schema),
            (Location::Query, &self.query),
            (Location::Headers, &self.headers),
        ] {
            if let Slot::Codec(schema) = slot {
                if !schema.is_object() {
                    return Err(ContractError::NonObjectSlot {
                        operation_id,
                        location,
                    });
                }
            }
        }

        check_path_fields(&operation_id, &template, self.path_schema.schema())?;

        if self.request_representations.is_empty() {
            return Err(ContractError::NoRepresentations {
                operation_id,
                context: "request body".to_string(),
            });
        }

        let responses = if self.responses.is_empty() {
            vec![ResponseSpec::default()]
        } else {
            self.responses
        };
        let mut seen = HashSet::new();
        for response in &responses {
            let status = response.status().as_u16();
            if !seen.insert(status) {
                return Err(ContractError::DuplicateStatus {
                    operation_id,
                    status,
                });
            }
            if response.representations().is_empty() {
                return Err(ContractError::NoRepresentations {
                    operation_id,
                    context: format!("response {status}"),
                });
            }
            if let Some(schema) = response.headers().schema() {
                if !schema.is_object() {
                    return Err(ContractError::NonObjectSlot {
                        operation_id,
                        location: Location::Headers,
                    });
                }
            }
        }

        Ok(Endpoint {
            operation_id,
            method: self.method,
            template,
            body: self.body,
            path: self.path_schema,
            query: self.query,
            headers: self.headers,
            request_representations: self.request_representations,
            responses,
            security: self.security,
            summary: self.summary,
            description: self.description,
            tags: self.tags,
            deprecated: self.deprecated,
        })
    }
}

fn check_path_fields(
    operation_id: &str,
    template: &PathTemplate,
    schema: Option<&Schema>,
) -> Result<(), ContractError> {
    for (name, optional) in template.params() {
        let Some(schema) = schema.filter(|s| s.property(name).is_some()) else {
            return Err(ContractError::UnmatchedPathParameter {
                operation_id: operation_id.to_string(),
                name: name.to_string(),
            });
        };
        if schema.is_required(name) == optional {
            return Err(ContractError::PathOptionalityMismatch {
                operation_id: operation_id.to_string(),
                name: name.to_string(),
                template_optional: optional,
            });
        }
    }

    let declared: HashSet<&str> = template.params().map(|(name, _)| name).collect();
    if let Some(properties) = schema.and_then(Schema::properties) {
        if let Some(unused) = properties.keys().find(|k| !declared.contains(k.as_str())) {
            return Err(ContractError::UnusedPathField {
                operation_id: operation_id.to_string(),
                name: unused.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_security::Security;

    fn stuff_path() -> Schema {
        Schema::object()
            .field("param", Schema::string())
            .optional_field("another", Schema::string())
    }

    #[test]
    fn test_build_defaults() {
        let endpoint = Endpoint::get("health", "/health").build().unwrap();
        assert_eq!(endpoint.method(), &Method::GET);
        assert_eq!(endpoint.path(), "/health");
        assert_eq!(endpoint.statuses(), vec![200]);
        assert!(endpoint.body().is_ignored());
        assert!(endpoint.security().is_none());
        assert!(!endpoint.is_full_response());
        assert!(!endpoint.requires_input());
    }

    #[test]
    fn test_optional_path_parameter() {
        let endpoint = Endpoint::get("getStuff", "/stuff/:param/:another?")
            .path(stuff_path())
            .build()
            .unwrap();
        assert_eq!(endpoint.template().optional_params(), vec!["another"]);
        assert!(endpoint.requires_input());
    }

    #[test]
    fn test_rejects_unmatched_parameter() {
        let err = Endpoint::get("getUser", "/users/:id").build().unwrap_err();
        assert!(matches!(err, ContractError::UnmatchedPathParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_rejects_unused_field() {
        let err = Endpoint::get("getUser", "/users/:id")
            .path(
                Schema::object()
                    .field("id", Schema::string())
                    .field("extra", Schema::string()),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ContractError::UnusedPathField { ref name, .. } if name == "extra"));
    }

    #[test]
    fn test_rejects_optionality_mismatch() {
        let err = Endpoint::get("getStuff", "/stuff/:param/:another?")
            .path(
                Schema::object()
                    .field("param", Schema::string())
                    .field("another", Schema::string()),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::PathOptionalityMismatch {
                template_optional: true,
                ..
            }
        ));

        let err = Endpoint::get("getUser", "/users/:id")
            .path(Schema::object().optional_field("id", Schema::string()))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::PathOptionalityMismatch {
                template_optional: false,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_bad_template() {
        let err = Endpoint::get("bad", "/a/:x?/b").build().unwrap_err();
        assert!(matches!(err, ContractError::Template { .. }));
    }

    #[test]
    fn test_rejects_non_object_query() {
        let err = Endpoint::get("search", "/search")
            .query(Schema::string())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::NonObjectSlot {
                location: Location::Query,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_duplicate_status() {
        let err = Endpoint::get("getUser", "/users")
            .response(ResponseSpec::new(StatusCode::OK))
            .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContractError::DuplicateStatus { status: 200, .. }));
    }

    #[test]
    fn test_rejects_empty_representations() {
        let err = Endpoint::post("upload", "/upload")
            .request_representations(Vec::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, ContractError::NoRepresentations { .. }));

        let err = Endpoint::get("download", "/download")
            .response(ResponseSpec::new(StatusCode::OK).with_representations(Vec::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ContractError::NoRepresentations { ref context, .. } if context == "response 200"));
    }

    #[test]
    fn test_rejects_invalid_operation_id() {
        let err = Endpoint::get("get user", "/users").build().unwrap_err();
        assert!(matches!(err, ContractError::InvalidOperationId { .. }));
    }

    #[test]
    fn test_full_response() {
        let two = Endpoint::get("getUser", "/users")
            .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
            .response(ResponseSpec::new(StatusCode::NOT_FOUND))
            .build()
            .unwrap();
        assert!(two.is_full_response());
        assert!(two.response(StatusCode::NOT_FOUND).is_some());
        assert!(two.response(StatusCode::CREATED).is_none());

        let with_headers = Endpoint::get("getUser", "/users")
            .response(
                ResponseSpec::new(StatusCode::OK)
                    .with_headers(Schema::object().field("etag", Schema::string())),
            )
            .build()
            .unwrap();
        assert!(with_headers.is_full_response());
    }

    #[test]
    fn test_metadata_and_security() {
        let endpoint = Endpoint::delete("deleteUser", "/users/:id")
            .path(Schema::object().field("id", Schema::integer_from_string()))
            .security(Security::bearer("bearerAuth"))
            .summary("Delete a user")
            .description("Removes the user permanently")
            .tag("users")
            .deprecated()
            .build()
            .unwrap();
        assert_eq!(endpoint.summary(), Some("Delete a user"));
        assert_eq!(endpoint.tags(), &["users".to_string()]);
        assert!(endpoint.is_deprecated());
        assert!(endpoint.security().yields::<String>());
        assert_eq!(
            endpoint.security().requirements(),
            &[vec!["bearerAuth".to_string()]]
        );
    }
}
