//! HTTP method-based routing.
//!
//! A [`MethodRouter`] sits at every route boundary of the tree and maps HTTP
//! methods to the operation bound at that path shape.

use http::Method;

/// A route bound to one method at one path shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Operation identifier.
    pub operation_id: String,
    /// Parameter names for the positional captures, in path order.
    pub param_names: Vec<String>,
}

/// Maps HTTP methods to route entries for a single path shape.
///
/// # Example
///
/// ```rust
/// use hermes_router::{MethodRouter, RouteEntry};
/// use http::Method;
///
/// let mut router = MethodRouter::new();
/// router
///     .insert(Method::GET, RouteEntry { operation_id: "listUsers".into(), param_names: vec![] })
///     .unwrap();
///
/// assert_eq!(router.get_operation(&Method::GET), Some("listUsers"));
/// assert_eq!(router.get_operation(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MethodRouter {
    entries: Vec<(Method, RouteEntry)>,
}

impl MethodRouter {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a method. Returns the operation already bound on conflict.
    pub fn insert(&mut self, method: Method, entry: RouteEntry) -> Result<(), String> {
        if let Some(existing) = self.get(&method) {
            return Err(existing.operation_id.clone());
        }
        self.entries.push((method, entry));
        Ok(())
    }

    /// Returns the entry bound to a method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&RouteEntry> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, entry)| entry)
    }

    /// Returns the operation ID bound to a method.
    #[must_use]
    pub fn get_operation(&self, method: &Method) -> Option<&str> {
        self.get(method).map(|entry| entry.operation_id.as_str())
    }

    /// Returns every bound method, in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Returns true if no method is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
