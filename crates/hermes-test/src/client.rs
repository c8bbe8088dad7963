//! In-memory clients for an [`App`].

use bytes::Bytes;
use hermes_client::{Client, ClientConfig};
use hermes_server::App;
use http::Method;
use serde::Serialize;

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;
use crate::transport::InMemoryTransport;

/// Sends raw or contract-encoded requests to an app without a socket.
///
/// # Example
///
/// ```rust
/// use hermes_core::{Api, Endpoint, ResponseSpec, Schema};
/// use hermes_server::{App, HandlerError};
/// use hermes_test::TestClient;
/// use http::StatusCode;
/// use serde_json::Value;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let api = Api::new("Example")
///     .add_endpoint(
///         Endpoint::get("hello", "/hello")
///             .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::string()))
///             .build()
///             .unwrap(),
///     )
///     .unwrap();
/// let app = App::builder(api)
///     .handle("hello", |_: Value, _: ()| async { Ok::<_, HandlerError>("hi") })
///     .build()
///     .unwrap();
///
/// let client = TestClient::new(app);
/// client
///     .get("/hello")
///     .send()
///     .await
///     .unwrap()
///     .assert_status(StatusCode::OK);
///
/// let greeting: String = client.contract().call("hello").send().await.unwrap();
/// assert_eq!(greeting, "hi");
/// # }
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    app: App,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps an app.
    pub fn new(app: App) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every raw request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the app.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Returns a contract client over the app's registry.
    #[must_use]
    pub fn contract(&self) -> Client {
        self.contract_with_config(ClientConfig::default())
    }

    /// Returns a contract client with a configuration.
    #[must_use]
    pub fn contract_with_config(&self, config: ClientConfig) -> Client {
        let transport = InMemoryTransport::new(self.app.clone());
        Client::with_config(self.app.api().clone(), transport, config)
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        let mut request = TestRequest::new(method, uri);
        for (name, value) in &self.default_headers {
            request = request.header(name, value);
        }
        TestClientRequest {
            client: self,
            request,
        }
    }
}

/// A raw request bound to a [`TestClient`].
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    request: TestRequest,
}

impl TestClientRequest<'_> {
    /// Appends a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets `Content-Type`.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.request = self.request.content_type(content_type);
        self
    }

    /// Sets `Accept`.
    pub fn accept(mut self, accept: impl AsRef<str>) -> Self {
        self.request = self.request.accept(accept);
        self
    }

    /// Sets a bearer `Authorization` header.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.request = self.request.bearer_token(token);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.json(value);
        self
    }

    /// Sets a form-urlencoded body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.form(value);
        self
    }

    /// Sends the request through the app.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        let request = self.request.build()?;
        Ok(self.client.app.handle(request).await.into())
    }
}
