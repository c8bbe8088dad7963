//! hyper integration.
//!
//! [`HermesService`] adapts an [`App`] to hyper's `Service` trait. It
//! collects the body up to the configured limit and delegates to
//! [`App::handle`]. Accepting connections is left to the caller:
//!
//! ```rust,ignore
//! let service = HermesService::new(app);
//! hyper::server::conn::http1::Builder::new()
//!     .serve_connection(io, service)
//!     .await?;
//! ```

use std::convert::Infallible;
use std::error::Error as StdError;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use hermes_core::{ErrorCategory, ErrorEnvelope};
use http::{Request, Response, StatusCode};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::Service;

use crate::app::App;
use crate::encoder::envelope_response;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// A hyper `Service` serving an [`App`].
#[derive(Debug, Clone)]
pub struct HermesService {
    app: App,
}

impl HermesService {
    /// Wraps an app.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Returns the app.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }
}

impl From<App> for HermesService {
    fn from(app: App) -> Self {
        Self::new(app)
    }
}

impl<B> Service<Request<B>> for HermesService
where
    B: Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn call(&self, request: Request<B>) -> Self::Future {
        let app = self.app.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let limit = app.config().max_body_size();

            let bytes = match Limited::new(body, limit).collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    let (status, message) = if e.downcast_ref::<LengthLimitError>().is_some() {
                        (
                            StatusCode::PAYLOAD_TOO_LARGE,
                            format!("request body exceeds {limit} bytes"),
                        )
                    } else {
                        (StatusCode::BAD_REQUEST, format!("failed to read request body: {e}"))
                    };
                    tracing::warn!(%status, "{message}");
                    let envelope = ErrorEnvelope::new(ErrorCategory::Validation, message);
                    return Ok(envelope_response(status, &envelope).map(Full::new));
                }
            };

            let response = app.handle(Request::from_parts(parts, bytes)).await;
            Ok(response.map(Full::new))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{Api, Endpoint, ResponseSpec, Schema};
    use serde_json::Value;

    use crate::config::ServerConfig;
    use crate::handler::HandlerError;

    fn service(limit: usize) -> HermesService {
        let api = Api::new("Test")
            .add_endpoint(
                Endpoint::post("echo", "/echo")
                    .body(Schema::string())
                    .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let app = App::builder(api)
            .handle("echo", |input: Value, _: ()| async move {
                Ok::<_, HandlerError>(input["body"].clone())
            })
            .config(ServerConfig::builder().max_body_size(limit).build())
            .build()
            .unwrap();
        HermesService::new(app)
    }

    #[tokio::test]
    async fn test_service_delegates_to_app() {
        let request = Request::post("/echo")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(r#""ping""#)))
            .unwrap();
        let response = service(1024).call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), br#""ping""#);
    }

    #[tokio::test]
    async fn test_service_enforces_limit() {
        let request = Request::post("/echo")
            .body(Full::new(Bytes::from(r#""a long body""#)))
            .unwrap();
        let response = service(4).call(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
