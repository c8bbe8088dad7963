//! Type-erased security for storage in endpoint declarations.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::SecurityError;
use crate::request::RequestHead;
use crate::scheme::SchemeDoc;
use crate::security::Security;

/// An extracted credential with its type erased.
pub type BoxedCredential = Box<dyn Any + Send>;

/// A [`Security`] whose credential type has been erased.
///
/// Endpoints store this so that heterogeneous security values fit in one
/// registry. The original credential type is remembered, so a handler can be
/// checked against it when it is attached rather than when a request arrives.
#[derive(Clone)]
pub struct AnySecurity {
    inner: Security<BoxedCredential>,
    type_id: TypeId,
    type_name: &'static str,
}

impl AnySecurity {
    /// Erases a security value.
    #[must_use]
    pub fn new<T: Send + 'static>(security: Security<T>) -> Self {
        Self {
            inner: security.map(|value| Box::new(value) as BoxedCredential),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// No security; the credential is `()`.
    #[must_use]
    pub fn none() -> Self {
        Self::new(Security::none())
    }

    /// Returns the credential's type ID.
    #[must_use]
    pub fn credential_type(&self) -> TypeId {
        self.type_id
    }

    /// Returns the credential's type name, for diagnostics.
    #[must_use]
    pub fn credential_type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true if the credential is a `T`.
    #[must_use]
    pub fn yields<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Runs the extraction.
    pub fn extract(
        &self,
        head: Arc<RequestHead>,
    ) -> BoxFuture<'static, Result<BoxedCredential, SecurityError>> {
        self.inner.extract(head)
    }

    /// Scheme records, in declaration order.
    pub fn schemes(&self) -> impl Iterator<Item = &SchemeDoc> {
        self.inner.schemes()
    }

    /// Looks up a scheme record by name.
    #[must_use]
    pub fn scheme(&self, name: &str) -> Option<&SchemeDoc> {
        self.inner.scheme(name)
    }

    /// Alternative requirement sets, OpenAPI style.
    #[must_use]
    pub fn requirements(&self) -> &[Vec<String>] {
        self.inner.requirements()
    }

    /// Returns true if no scheme is involved.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.inner.is_none()
    }
}

impl Default for AnySecurity {
    fn default() -> Self {
        Self::none()
    }
}

impl<T: Send + 'static> Security<T> {
    /// Erases the credential type for storage in an endpoint.
    #[must_use]
    pub fn erase(self) -> AnySecurity {
        AnySecurity::new(self)
    }
}

impl<T: Send + 'static> From<Security<T>> for AnySecurity {
    fn from(security: Security<T>) -> Self {
        Self::new(security)
    }
}

impl fmt::Debug for AnySecurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnySecurity")
            .field("credential", &self.type_name)
            .field("requirements", &self.inner.requirements())
            .finish_non_exhaustive()
    }
}
