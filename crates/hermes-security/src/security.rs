//! The security value and its combinators.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future::{self, BoxFuture, FutureExt};
use http::header::AUTHORIZATION;
use indexmap::IndexMap;

use crate::credential::BasicCredentials;
use crate::error::SecurityError;
use crate::request::RequestHead;
use crate::scheme::{ApiKeyIn, SchemeDoc, SchemeKind};

type ExtractFn<T> =
    dyn Fn(Arc<RequestHead>) -> BoxFuture<'static, Result<T, SecurityError>> + Send + Sync;

/// A credential extraction effect paired with its documentation.
///
/// `Security<T>` extracts a `T` from a request head, or fails with a
/// [`SecurityError`]. Values are built from primitives ([`Security::basic`],
/// [`Security::bearer`], [`Security::api_key`], [`Security::custom`]) and
/// composed with [`map`](Security::map), [`map_effect`](Security::map_effect),
/// [`and`](Security::and), [`or`](Security::or), [`as_some`](Security::as_some)
/// and [`as_value`](Security::as_value).
///
/// Composition keeps the documentation in step with behavior: every
/// combinator carries scheme records through unchanged, and `requirements`
/// follows the OpenAPI shape (a list of alternatives, each a set of schemes
/// that must all be satisfied).
///
/// # Example
///
/// ```rust
/// use hermes_security::{ApiKeyIn, Security};
///
/// let security = Security::bearer("bearerAuth")
///     .as_some()
///     .or(Security::api_key("keyAuth", "x-api-key", ApiKeyIn::Header).map(|_| None));
///
/// assert_eq!(
///     security.requirements(),
///     &[vec!["bearerAuth".to_string()], vec!["keyAuth".to_string()]]
/// );
/// ```
pub struct Security<T> {
    extract: Arc<ExtractFn<T>>,
    schemes: IndexMap<String, SchemeDoc>,
    requirements: Vec<Vec<String>>,
}

impl<T> Clone for Security<T> {
    fn clone(&self) -> Self {
        Self {
            extract: Arc::clone(&self.extract),
            schemes: self.schemes.clone(),
            requirements: self.requirements.clone(),
        }
    }
}

impl<T> fmt::Debug for Security<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Security")
            .field("schemes", &self.schemes.keys().collect::<Vec<_>>())
            .field("requirements", &self.requirements)
            .finish_non_exhaustive()
    }
}

impl Security<()> {
    /// No security: always succeeds with `()`.
    ///
    /// Its requirement list is `[[]]`, the identity for [`and`](Security::and).
    #[must_use]
    pub fn none() -> Self {
        Self {
            extract: Arc::new(|_| future::ready(Ok(())).boxed()),
            schemes: IndexMap::new(),
            requirements: vec![Vec::new()],
        }
    }
}

impl Security<BasicCredentials> {
    /// HTTP basic authentication.
    #[must_use]
    pub fn basic(name: impl Into<String>) -> Self {
        let doc = SchemeDoc::new(name, SchemeKind::HttpBasic);
        let scheme = doc.name.clone();
        Self::custom(doc, move |head| {
            future::ready(decode_basic(&scheme, &head))
        })
    }
}

impl Security<String> {
    /// HTTP bearer authentication. Yields the raw token.
    #[must_use]
    pub fn bearer(name: impl Into<String>) -> Self {
        Self::bearer_scheme(name, None)
    }

    /// HTTP bearer authentication with a documented token format.
    #[must_use]
    pub fn bearer_with_format(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self::bearer_scheme(name, Some(format.into()))
    }

    fn bearer_scheme(name: impl Into<String>, bearer_format: Option<String>) -> Self {
        let doc = SchemeDoc::new(name, SchemeKind::HttpBearer { bearer_format });
        let scheme = doc.name.clone();
        Self::custom(doc, move |head| {
            future::ready(
                authorization(&scheme, &head, "Bearer").and_then(|token| {
                    if token.is_empty() {
                        Err(SecurityError::new(&scheme, "empty bearer token"))
                    } else {
                        Ok(token.to_string())
                    }
                }),
            )
        })
    }

    /// API key read from a header, query parameter, or cookie. Yields the key.
    #[must_use]
    pub fn api_key(name: impl Into<String>, key: impl Into<String>, location: ApiKeyIn) -> Self {
        let key = key.into();
        let doc = SchemeDoc::new(
            name,
            SchemeKind::ApiKey {
                key: key.clone(),
                location,
            },
        );
        let scheme = doc.name.clone();
        Self::custom(doc, move |head| {
            let value = match location {
                ApiKeyIn::Header => head.header(&key).map(ToString::to_string),
                ApiKeyIn::Query => head.query_param(&key),
                ApiKeyIn::Cookie => head.cookie(&key),
            };
            let result = value.filter(|v| !v.is_empty()).ok_or_else(|| {
                let place = match location {
                    ApiKeyIn::Header => "header",
                    ApiKeyIn::Query => "query parameter",
                    ApiKeyIn::Cookie => "cookie",
                };
                SecurityError::missing(&scheme, &format!("api key {place} '{key}'"))
            });
            future::ready(result)
        })
    }
}

impl<T: Send + 'static> Security<T> {
    /// A single scheme with an application-defined extraction step.
    pub fn custom<F, Fut>(doc: SchemeDoc, extract: F) -> Self
    where
        F: Fn(Arc<RequestHead>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, SecurityError>> + Send + 'static,
    {
        let name = doc.name.clone();
        let mut schemes = IndexMap::new();
        schemes.insert(name.clone(), doc);
        Self {
            extract: Arc::new(move |head| extract(head).boxed()),
            schemes,
            requirements: vec![vec![name]],
        }
    }

    /// Runs the extraction against a request head.
    pub fn extract(&self, head: Arc<RequestHead>) -> BoxFuture<'static, Result<T, SecurityError>> {
        (self.extract)(head)
    }

    /// Transforms the extracted credential.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Security<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let extract = self.extract;
        let f = Arc::new(f);
        Security {
            extract: Arc::new(move |head| {
                let f = Arc::clone(&f);
                extract(head).map(move |result| result.map(|value| f(value))).boxed()
            }),
            schemes: self.schemes,
            requirements: self.requirements,
        }
    }

    /// Transforms the extracted credential with a step that may suspend or fail,
    /// such as loading a user record for an authenticated name.
    #[must_use]
    pub fn map_effect<U, F, Fut>(self, f: F) -> Security<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<U, SecurityError>> + Send + 'static,
    {
        let extract = self.extract;
        let f = Arc::new(f);
        Security {
            extract: Arc::new(move |head| {
                let f = Arc::clone(&f);
                let pending = extract(head);
                async move {
                    let value = pending.await?;
                    f(value).await
                }
                .boxed()
            }),
            schemes: self.schemes,
            requirements: self.requirements,
        }
    }

    /// Both must succeed. Yields the pair.
    ///
    /// Both sides run concurrently to completion. When both fail, the
    /// **left** failure is reported.
    #[must_use]
    pub fn and<U: Send + 'static>(self, other: Security<U>) -> Security<(T, U)> {
        let (left, right) = (self.extract, other.extract);
        Security {
            extract: Arc::new(move |head| {
                let pending = future::join(left(Arc::clone(&head)), right(head));
                async move {
                    match pending.await {
                        (Ok(a), Ok(b)) => Ok((a, b)),
                        (Err(err), _) | (Ok(_), Err(err)) => Err(err),
                    }
                }
                .boxed()
            }),
            schemes: merge_schemes(self.schemes, other.schemes),
            requirements: product(&self.requirements, &other.requirements),
        }
    }

    /// Left first, falling back to right on failure.
    ///
    /// When both fail, the **right** failure is reported. Which side
    /// succeeded is not observable unless the branches are tagged, e.g. with
    /// [`as_some`](Security::as_some) or [`as_value`](Security::as_value).
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let (left, right) = (self.extract, other.extract);
        Self {
            extract: Arc::new(move |head| {
                let right = Arc::clone(&right);
                let first = left(Arc::clone(&head));
                async move {
                    match first.await {
                        Ok(value) => Ok(value),
                        Err(err) => {
                            tracing::debug!(scheme = %err.scheme, "security alternative failed, trying next");
                            right(head).await
                        }
                    }
                }
                .boxed()
            }),
            schemes: merge_schemes(self.schemes, other.schemes),
            requirements: concat(self.requirements, other.requirements),
        }
    }

    /// Wraps the credential in `Some`.
    #[must_use]
    pub fn as_some(self) -> Security<Option<T>> {
        self.map(Some)
    }

    /// Replaces the credential with a constant.
    #[must_use]
    pub fn as_value<U>(self, value: U) -> Security<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }
}

impl<T> Security<T> {
    /// Scheme records, in declaration order.
    pub fn schemes(&self) -> impl Iterator<Item = &SchemeDoc> {
        self.schemes.values()
    }

    /// Looks up a scheme record by name.
    #[must_use]
    pub fn scheme(&self, name: &str) -> Option<&SchemeDoc> {
        self.schemes.get(name)
    }

    /// Alternative requirement sets, OpenAPI style.
    #[must_use]
    pub fn requirements(&self) -> &[Vec<String>] {
        &self.requirements
    }

    /// Returns true if no scheme is involved.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.schemes.is_empty()
    }
}

fn merge_schemes(
    mut left: IndexMap<String, SchemeDoc>,
    right: IndexMap<String, SchemeDoc>,
) -> IndexMap<String, SchemeDoc> {
    for (name, doc) in right {
        left.entry(name).or_insert(doc);
    }
    left
}

fn product(left: &[Vec<String>], right: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut out: Vec<Vec<String>> = Vec::with_capacity(left.len() * right.len());
    for a in left {
        for b in right {
            let mut set = a.clone();
            for name in b {
                if !set.contains(name) {
                    set.push(name.clone());
                }
            }
            if !out.contains(&set) {
                out.push(set);
            }
        }
    }
    out
}

fn concat(mut left: Vec<Vec<String>>, right: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for set in right {
        if !left.contains(&set) {
            left.push(set);
        }
    }
    left
}

fn authorization<'a>(
    scheme: &str,
    head: &'a RequestHead,
    expected: &str,
) -> Result<&'a str, SecurityError> {
    let value = head
        .header(AUTHORIZATION.as_str())
        .ok_or_else(|| SecurityError::missing(scheme, "authorization header"))?;
    match value.split_once(' ') {
        Some((kind, rest)) if kind.eq_ignore_ascii_case(expected) => Ok(rest.trim()),
        _ => Err(SecurityError::new(
            scheme,
            format!("expected {expected} authorization"),
        )),
    }
}

fn decode_basic(scheme: &str, head: &RequestHead) -> Result<BasicCredentials, SecurityError> {
    let encoded = authorization(scheme, head, "Basic")?;
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| SecurityError::new(scheme, "basic credentials are not valid base64"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| SecurityError::new(scheme, "basic credentials are not valid UTF-8"))?;
    let (user, password) = decoded
        .split_once(':')
        .ok_or_else(|| SecurityError::new(scheme, "basic credentials lack a ':' separator"))?;
    Ok(BasicCredentials {
        user: user.to_string(),
        password: password.to_string(),
    })
}
