//! The contract client.

use std::fmt;
use std::sync::Arc;

use hermes_core::{Api, Endpoint};
use hermes_security::{Credential, Credentials};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::Instrument;

use crate::config::ClientConfig;
use crate::encoder::RequestEncoder;
use crate::error::{ClientError, ClientSideError};
use crate::parser::ResponseParser;
use crate::transport::Transport;

/// Calls the operations of an [`Api`] over a [`Transport`].
///
/// Cloning is cheap; clones share the API and transport.
///
/// # Example
///
/// ```rust,no_run
/// use hermes_client::{Client, ReqwestTransport};
/// use hermes_core::{Api, Endpoint, ResponseSpec, Schema};
/// use http::StatusCode;
/// use serde_json::json;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let api = Api::new("Users").add_endpoint(
///     Endpoint::get("getUser", "/users/:id")
///         .path(Schema::object().field("id", Schema::string()))
///         .response(ResponseSpec::new(StatusCode::OK).with_body(Schema::any()))
///         .build()?,
/// )?;
///
/// let client = Client::new(api, ReqwestTransport::new("http://localhost:8080")?);
/// let user: serde_json::Value = client
///     .call("getUser")
///     .input(&json!({"path": {"id": "42"}}))
///     .bearer("bearerAuth", "token")
///     .send()
///     .await?;
/// # let _ = user;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    api: Api,
    transport: Arc<dyn Transport>,
    encoder: RequestEncoder,
    parser: ResponseParser,
    config: ClientConfig,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api", &self.inner.api.title())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client with the default configuration.
    pub fn new(api: Api, transport: impl Transport) -> Self {
        Self::with_config(api, transport, ClientConfig::default())
    }

    /// Creates a client with the given configuration.
    pub fn with_config(api: Api, transport: impl Transport, config: ClientConfig) -> Self {
        let options = config.parse_options();
        Self {
            inner: Arc::new(Inner {
                api,
                transport: Arc::new(transport),
                encoder: RequestEncoder::new(options),
                parser: ResponseParser::new(options),
                config,
            }),
        }
    }

    /// Returns the API.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.inner.api
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Starts a call to `operation_id`.
    #[must_use]
    pub fn call(&self, operation_id: impl Into<String>) -> Call<'_> {
        Call {
            client: self,
            operation_id: operation_id.into(),
            input: Ok(None),
            credentials: Credentials::new(),
        }
    }
}

/// One outbound call, built up before it is sent.
///
/// Input is optional when the endpoint requires none. Credentials are set
/// per scheme name; schemes without one are not sent.
#[must_use = "a call does nothing until sent"]
pub struct Call<'a> {
    client: &'a Client,
    operation_id: String,
    input: Result<Option<Value>, serde_json::Error>,
    credentials: Credentials,
}

impl fmt::Debug for Call<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("operation_id", &self.operation_id)
            .finish_non_exhaustive()
    }
}

impl Call<'_> {
    /// Sets the input: a value serializing to `{path, query, headers, body}`.
    pub fn input<I: Serialize + ?Sized>(mut self, input: &I) -> Self {
        self.input = serde_json::to_value(input).map(Some);
        self
    }

    /// Sets the credential for a scheme.
    pub fn credential(mut self, scheme: impl Into<String>, credential: Credential) -> Self {
        self.credentials.set(scheme, credential);
        self
    }

    /// Sets a bearer token.
    pub fn bearer(self, scheme: impl Into<String>, token: impl Into<String>) -> Self {
        self.credential(scheme, Credential::bearer(token))
    }

    /// Sets basic credentials.
    pub fn basic(
        self,
        scheme: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credential(scheme, Credential::basic(user, password))
    }

    /// Sets an API key.
    pub fn api_key(self, scheme: impl Into<String>, key: impl Into<String>) -> Self {
        self.credential(scheme, Credential::api_key(key))
    }

    /// Sends the call and deserializes the decoded output.
    ///
    /// Full-response endpoints decode into a [`Reply`](hermes_core::Reply).
    pub async fn send<O: DeserializeOwned>(self) -> Result<O, ClientError> {
        let operation_id = self.operation_id.clone();
        let value = self.send_value().await?;
        serde_json::from_value(value).map_err(|e| {
            ClientSideError::decode(&operation_id, format!("output does not deserialize: {e}"))
                .into()
        })
    }

    /// Sends the call and returns the decoded output as JSON.
    pub async fn send_value(self) -> Result<Value, ClientError> {
        let Call {
            client,
            operation_id,
            input,
            credentials,
        } = self;
        let inner = &client.inner;
        let endpoint: &Endpoint = inner.api.endpoint(&operation_id).ok_or_else(|| {
            ClientSideError::UnknownOperation {
                operation_id: operation_id.clone(),
            }
        })?;

        let input = match input.map_err(|e| ClientSideError::encode(&operation_id, e.to_string()))? {
            Some(input) => input,
            None if endpoint.requires_input() => {
                return Err(ClientSideError::encode(&operation_id, "input is required").into());
            }
            None => Value::Object(Map::new()),
        };

        let span = tracing::info_span!(
            "hermes_call",
            operation_id = %operation_id,
            method = %endpoint.method(),
            status = tracing::field::Empty,
        );

        async {
            let request = inner.encoder.encode(endpoint, &input, &credentials)?;
            let response = inner.transport.send(request).await.map_err(|e| {
                tracing::warn!(error = %e, "transport failed");
                ClientError::from(e)
            })?;
            tracing::Span::current().record("status", response.status().as_u16());
            inner.parser.parse(endpoint, &response)
        }
        .instrument(span)
        .await
    }
}
