//! A transport that serves requests with an in-process [`App`].

use async_trait::async_trait;
use bytes::Bytes;
use hermes_client::{Transport, TransportError};
use hermes_server::App;
use http::{Request, Response};

/// Routes client requests straight into [`App::handle`].
///
/// No socket is opened; the request the encoder produced is exactly the
/// request the parser sees.
#[derive(Debug, Clone)]
pub struct InMemoryTransport {
    app: App,
}

impl InMemoryTransport {
    /// Wraps an app.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Returns the wrapped app.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        Ok(self.app.handle(request).await)
    }
}
