//! Security scheme documentation and client-side credential injection.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http::header::{AUTHORIZATION, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::error::SecurityError;

/// Where an API key travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyIn {
    /// A request header.
    Header,
    /// A query string parameter.
    Query,
    /// A cookie.
    Cookie,
}

/// The mechanism a scheme uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SchemeKind {
    /// `Authorization: Basic ...`
    HttpBasic,
    /// `Authorization: Bearer ...`
    HttpBearer {
        /// Optional hint about the token format, e.g. `JWT`.
        #[serde(skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
    /// A named key in a header, query parameter, or cookie.
    ApiKey {
        /// Header, parameter, or cookie name.
        key: String,
        /// Location of the key.
        location: ApiKeyIn,
    },
    /// Application-defined extraction.
    Custom {
        /// Free-form mechanism label.
        label: String,
    },
}

/// Documentation record for one named scheme.
///
/// The same record drives server-side extraction error messages, client-side
/// injection, and documentation export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeDoc {
    /// Scheme name, unique within a security value.
    pub name: String,
    /// Scheme mechanism.
    pub kind: SchemeKind,
    /// Optional human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemeDoc {
    /// Creates a scheme record.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: SchemeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
        }
    }

    /// Creates a custom scheme record.
    #[must_use]
    pub fn custom(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            SchemeKind::Custom {
                label: label.into(),
            },
        )
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Writes a credential into an outbound request.
    ///
    /// Basic and bearer credentials go to `Authorization`; API keys go to the
    /// declared header, query parameter, or `Cookie` header. A raw
    /// [`Credential::Header`] is accepted by every scheme, which is how custom
    /// schemes are driven from a client.
    pub fn inject(
        &self,
        credential: &Credential,
        headers: &mut HeaderMap,
        query: &mut Vec<(String, String)>,
    ) -> Result<(), SecurityError> {
        match (&self.kind, credential) {
            (SchemeKind::HttpBasic, Credential::Basic { user, password }) => {
                let encoded = STANDARD.encode(format!("{user}:{password}"));
                self.set_header(headers, AUTHORIZATION, &format!("Basic {encoded}"))
            }
            (SchemeKind::HttpBearer { .. }, Credential::Bearer(token)) => {
                self.set_header(headers, AUTHORIZATION, &format!("Bearer {token}"))
            }
            (SchemeKind::ApiKey { key, location }, Credential::ApiKey(value)) => match location {
                ApiKeyIn::Header => {
                    let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                        SecurityError::new(&self.name, format!("invalid header name '{key}'"))
                    })?;
                    self.set_header(headers, name, value)
                }
                ApiKeyIn::Query => {
                    query.push((key.clone(), value.clone()));
                    Ok(())
                }
                ApiKeyIn::Cookie => {
                    let pair = format!("{key}={value}");
                    let cookie = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                        Some(existing) => format!("{existing}; {pair}"),
                        None => pair,
                    };
                    self.set_header(headers, COOKIE, &cookie)
                }
            },
            (_, Credential::Header { name, value }) => {
                let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    SecurityError::new(&self.name, format!("invalid header name '{name}'"))
                })?;
                self.set_header(headers, name, value)
            }
            (kind, credential) => Err(SecurityError::new(
                &self.name,
                format!(
                    "{} credential cannot be used with a {} scheme",
                    credential.kind_name(),
                    kind_name(kind)
                ),
            )),
        }
    }

    fn set_header(
        &self,
        headers: &mut HeaderMap,
        name: HeaderName,
        value: &str,
    ) -> Result<(), SecurityError> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| SecurityError::new(&self.name, "credential is not a valid header value"))?;
        headers.insert(name, value);
        Ok(())
    }
}

fn kind_name(kind: &SchemeKind) -> &'static str {
    match kind {
        SchemeKind::HttpBasic => "basic",
        SchemeKind::HttpBearer { .. } => "bearer",
        SchemeKind::ApiKey { .. } => "api key",
        SchemeKind::Custom { .. } => "custom",
    }
}
