//! Credential values.

use indexmap::IndexMap;

/// Decoded `Authorization: Basic` credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BasicCredentials {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

/// A credential a client supplies for one scheme of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// User name and password for an HTTP basic scheme.
    Basic {
        /// User name.
        user: String,
        /// Password.
        password: String,
    },
    /// Token for an HTTP bearer scheme.
    Bearer(String),
    /// Key for an API-key scheme.
    ApiKey(String),
    /// A raw header, for custom schemes.
    Header {
        /// Header name.
        name: String,
        /// Header value.
        value: String,
    },
}

impl Credential {
    /// Basic credentials.
    #[must_use]
    pub fn basic(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            user: user.into(),
            password: password.into(),
        }
    }

    /// A bearer token.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// An API key.
    #[must_use]
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// A raw header.
    #[must_use]
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer(_) => "bearer",
            Self::ApiKey(_) => "api key",
            Self::Header { .. } => "header",
        }
    }
}

/// Credentials for one outbound call, keyed by scheme name.
///
/// Schemes without a credential are simply not injected; the server decides
/// whether that satisfies the endpoint's requirements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    inner: IndexMap<String, Credential>,
}

impl Credentials {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential for a scheme, replacing any previous one.
    pub fn set(&mut self, scheme: impl Into<String>, credential: Credential) {
        self.inner.insert(scheme.into(), credential);
    }

    /// Returns the credential for a scheme.
    #[must_use]
    pub fn get(&self, scheme: &str) -> Option<&Credential> {
        self.inner.get(scheme)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Credential)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if no credential is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
