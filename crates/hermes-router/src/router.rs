//! High-level router API.

use http::Method;

use crate::error::RouterError;
use crate::method_router::{MethodRouter, RouteEntry};
use crate::node::Node;
use crate::params::Params;
use crate::template::PathTemplate;
use crate::RouteMatch;

/// A radix tree router over path templates.
///
/// Each template is registered once per variant, so `/stuff/:param/:another?`
/// answers both `/stuff/x` and `/stuff/x/y`.
///
/// # Example
///
/// ```rust
/// use hermes_router::{PathTemplate, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// let template = PathTemplate::parse("/users/:id").unwrap();
/// router.route(Method::GET, &template, "getUser").unwrap();
///
/// let route_match = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(route_match.operation_id, "getUser");
/// assert_eq!(route_match.params.get("id"), Some("123"));
/// ```
///
/// # Route Priority
///
/// Static segments win over parameter segments, so `/users/me` matches
/// before `/users/:id` for the path `/users/me`.
#[derive(Debug, Clone)]
pub struct Router {
    root: Node,
    route_count: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Binds `method` + `template` to an operation.
    ///
    /// Fails if any variant of the template is already bound for the method.
    pub fn route(
        &mut self,
        method: Method,
        template: &PathTemplate,
        operation_id: impl Into<String>,
    ) -> Result<(), RouterError> {
        let operation_id = operation_id.into();
        for variant in template.variants() {
            let param_names = variant
                .iter()
                .filter_map(|s| s.param_name().map(ToString::to_string))
                .collect();
            let entry = RouteEntry {
                operation_id: operation_id.clone(),
                param_names,
            };
            self.root
                .insert(variant)
                .insert(method.clone(), entry)
                .map_err(|existing| RouterError::Conflict {
                    method: method.to_string(),
                    path: template.as_str().to_string(),
                    existing,
                })?;
        }
        self.route_count += 1;
        Ok(())
    }

    /// Matches a method and path.
    ///
    /// Captured values are percent-decoded and named after the matched
    /// route's template.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let (methods, captures) = self.root.match_path(path)?;
        let entry = methods.get(method)?;
        let params = entry
            .param_names
            .iter()
            .cloned()
            .zip(captures.into_iter().map(|raw| decode(&raw)))
            .collect::<Params>();
        Some(RouteMatch::new(&entry.operation_id, params))
    }

    /// Returns the methods bound at a path, or `None` if no route matches the
    /// path at all. Used to tell 404 from 405.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Option<Vec<Method>> {
        self.root
            .match_path(path)
            .map(|(methods, _)| methods.allowed_methods())
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
