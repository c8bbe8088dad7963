//! Request dispatch.
//!
//! An [`App`] binds a registry to its handlers and serves requests:
//!
//! ```text
//! request ─► route ─► RequestParser ─► handler ─► ResponseEncoder ─► response
//!              │            │              │
//!           404/405      400/401     HttpError / 500
//! ```
//!
//! Every response carries the request ID in the configured header.

use std::any::type_name;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use hermes_core::{Api, ContractError, Endpoint, ErrorCategory, ErrorEnvelope};
use hermes_router::Router;
use http::header::ALLOW;
use http::{HeaderName, HeaderValue, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::encoder::{envelope_response, http_error_response, ResponseEncoder};
use crate::handler::{HandlerError, HandlerRegistry, InvokeError};
use crate::parser::RequestParser;
use crate::request_id::RequestId;

/// A registry with a handler for every operation.
///
/// Cloning is cheap.
///
/// # Example
///
/// ```rust
/// use bytes::Bytes;
/// use hermes_core::{Api, Endpoint, ResponseSpec, Schema};
/// use hermes_server::{App, HandlerError};
/// use http::{Request, StatusCode};
/// use serde_json::Value;
///
/// # tokio_test::block_on(async {
/// let api = Api::new("Example")
///     .add_endpoint(
///         Endpoint::get("hello", "/hello")
///             .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
///
/// let app = App::builder(api)
///     .handle("hello", |_: Value, _: ()| async { Ok::<_, HandlerError>("hi") })
///     .build()
///     .unwrap();
///
/// let request = Request::get("/hello").body(Bytes::new()).unwrap();
/// let response = app.handle(request).await;
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body().as_ref(), br#""hi""#);
/// # });
/// ```
#[derive(Clone)]
pub struct App {
    inner: Arc<Inner>,
}

struct Inner {
    api: Api,
    router: Router,
    handlers: HandlerRegistry,
    parser: RequestParser,
    encoder: ResponseEncoder,
    config: ServerConfig,
    request_id_header: HeaderName,
}

impl App {
    /// Starts building an app over `api`.
    #[must_use]
    pub fn builder(api: Api) -> AppBuilder {
        AppBuilder::new(api)
    }

    /// Returns the registry.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.inner.api
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.inner.router
    }

    /// Serves one request.
    pub async fn handle(&self, request: Request<Bytes>) -> Response<Bytes> {
        let inner = &self.inner;
        let request_id = RequestId::from_headers(request.headers(), inner.config.request_id_header());
        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path(),
            operation_id = tracing::field::Empty,
        );

        async move {
            let id = request_id.to_string();
            let mut response = self.dispatch(request, &id).await;
            if let Ok(value) = HeaderValue::from_str(&id) {
                response
                    .headers_mut()
                    .insert(inner.request_id_header.clone(), value);
            }
            tracing::info!(status = response.status().as_u16(), "request completed");
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, request: Request<Bytes>, request_id: &str) -> Response<Bytes> {
        let inner = &self.inner;
        let (parts, body) = request.into_parts();

        if body.len() > inner.config.max_body_size() {
            tracing::warn!(size = body.len(), "request body too large");
            let envelope = ErrorEnvelope::new(
                ErrorCategory::Validation,
                format!(
                    "request body exceeds {} bytes",
                    inner.config.max_body_size()
                ),
            )
            .with_request_id(Some(request_id));
            return envelope_response(StatusCode::PAYLOAD_TOO_LARGE, &envelope);
        }

        let path = parts.uri.path();
        let Some(route) = inner.router.match_route(&parts.method, path) else {
            return not_routed(&inner.router, &parts.method, path, request_id);
        };
        tracing::Span::current().record("operation_id", route.operation_id);

        let Some(endpoint) = inner.api.endpoint(route.operation_id) else {
            return internal_error(request_id);
        };

        let parsed = match inner
            .parser
            .parse(endpoint, &parts, &route.params, body)
            .await
        {
            Ok(parsed) => parsed,
            Err(e) => return envelope_response(e.status(), &e.to_envelope(Some(request_id))),
        };

        let Some(result) = inner
            .handlers
            .invoke(route.operation_id, parsed.input, parsed.credential)
            .await
        else {
            return internal_error(request_id);
        };

        match result {
            Ok(output) => self.encode(endpoint, output, request_id),
            Err(InvokeError::Handler(HandlerError::Http(e))) => {
                tracing::debug!(status = e.status.as_u16(), "handler short-circuited");
                http_error_response(&e)
            }
            Err(InvokeError::Handler(HandlerError::Internal(e))) => {
                tracing::error!(error = %e, "handler failed");
                internal_error(request_id)
            }
            Err(e) => {
                tracing::error!(error = %e, "handler does not match its contract");
                let envelope = ErrorEnvelope::new(
                    ErrorCategory::ContractViolation,
                    "handler does not match the declared contract",
                )
                .with_request_id(Some(request_id));
                envelope_response(StatusCode::INTERNAL_SERVER_ERROR, &envelope)
            }
        }
    }

    fn encode(
        &self,
        endpoint: &Endpoint,
        output: serde_json::Value,
        request_id: &str,
    ) -> Response<Bytes> {
        match self.inner.encoder.encode(endpoint, output) {
            Ok(response) => response,
            Err(e) => envelope_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &e.to_envelope(Some(request_id)),
            ),
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("api", &self.inner.api.title())
            .field("handlers", &self.inner.handlers)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

fn not_routed(
    router: &Router,
    method: &http::Method,
    path: &str,
    request_id: &str,
) -> Response<Bytes> {
    match router.allowed_methods(path) {
        Some(allowed) if !allowed.is_empty() => {
            tracing::debug!(%method, "method not allowed");
            let list = allowed
                .iter()
                .map(http::Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let envelope = ErrorEnvelope::new(
                ErrorCategory::MethodNotAllowed,
                format!("method {method} is not allowed for {path}"),
            )
            .with_details(serde_json::json!({ "allowed": allowed.iter().map(http::Method::as_str).collect::<Vec<_>>() }))
            .with_request_id(Some(request_id));
            let mut response = envelope_response(StatusCode::METHOD_NOT_ALLOWED, &envelope);
            if let Ok(value) = HeaderValue::from_str(&list) {
                response.headers_mut().insert(ALLOW, value);
            }
            response
        }
        _ => {
            tracing::debug!("no route");
            let envelope =
                ErrorEnvelope::new(ErrorCategory::NotFound, format!("no route for {path}"))
                    .with_request_id(Some(request_id));
            envelope_response(StatusCode::NOT_FOUND, &envelope)
        }
    }
}

fn internal_error(request_id: &str) -> Response<Bytes> {
    let envelope = ErrorEnvelope::new(ErrorCategory::Internal, "internal server error")
        .with_request_id(Some(request_id));
    envelope_response(StatusCode::INTERNAL_SERVER_ERROR, &envelope)
}

/// Builder for [`App`].
///
/// Attachment problems are collected and reported by [`AppBuilder::build`].
pub struct AppBuilder {
    api: Api,
    handlers: HandlerRegistry,
    config: ServerConfig,
    errors: Vec<ContractError>,
}

impl AppBuilder {
    /// Creates a builder over `api`.
    #[must_use]
    pub fn new(api: Api) -> Self {
        Self {
            api,
            handlers: HandlerRegistry::new(),
            config: ServerConfig::default(),
            errors: Vec::new(),
        }
    }

    /// Attaches a handler to an operation.
    ///
    /// The handler's credential type must be the one the endpoint's security
    /// yields.
    #[must_use]
    pub fn handle<I, C, O, F, Fut>(mut self, operation_id: impl Into<String>, handler: F) -> Self
    where
        I: DeserializeOwned + Send + 'static,
        C: Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    {
        let operation_id = operation_id.into();
        let Some(endpoint) = self.api.endpoint(&operation_id) else {
            self.errors
                .push(ContractError::UnknownOperation { operation_id });
            return self;
        };

        let security = endpoint.security();
        if !security.yields::<C>() {
            self.errors.push(ContractError::CredentialMismatch {
                operation_id,
                expected: security.credential_type_name(),
                found: type_name::<C>(),
            });
            return self;
        }

        if let Err(e) = self.handlers.register(operation_id, handler) {
            self.errors.push(e);
        }
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the app.
    ///
    /// Fails with the first attachment problem, a route conflict, or an
    /// operation without a handler.
    pub fn build(self) -> Result<App, ContractError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        let mut router = Router::new();
        for endpoint in self.api.endpoints() {
            router.route(
                endpoint.method().clone(),
                endpoint.template(),
                endpoint.operation_id(),
            )?;
            if !self.handlers.contains(endpoint.operation_id()) {
                return Err(ContractError::MissingHandler {
                    operation_id: endpoint.operation_id().to_string(),
                });
            }
        }

        let request_id_header = HeaderName::from_bytes(self.config.request_id_header().as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-request-id"));
        let options = self.config.parse_options();

        tracing::info!(
            api = self.api.title(),
            operations = router.len(),
            "app built"
        );

        Ok(App {
            inner: Arc::new(Inner {
                router,
                handlers: self.handlers,
                parser: RequestParser::new(options)
                    .with_max_multipart_fields(self.config.max_multipart_fields()),
                encoder: ResponseEncoder::new(options),
                config: self.config,
                request_id_header,
                api: self.api,
            }),
        })
    }
}

impl std::fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBuilder")
            .field("api", &self.api.title())
            .field("handlers", &self.handlers)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
