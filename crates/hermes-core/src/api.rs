//! The contract registry.
//!
//! [`Api`] and [`ApiGroup`] are immutable values. Every `add_*` call returns a
//! new value that shares unchanged endpoints and groups with the old one, or
//! a [`ContractError`] if the addition would break an invariant. Operation ids
//! are unique across the whole registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::endpoint::Endpoint;
use crate::error::ContractError;

/// Name of the implicit group holding ungrouped endpoints.
pub const DEFAULT_GROUP: &str = "default";

/// A named, ordered set of endpoints.
#[derive(Debug, Clone)]
pub struct ApiGroup {
    name: String,
    description: Option<String>,
    endpoints: Vec<Arc<Endpoint>>,
}

impl ApiGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            endpoints: Vec::new(),
        }
    }

    /// Returns a copy with a description.
    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self.clone()
        }
    }

    /// Returns a copy with one more endpoint.
    pub fn add_endpoint(&self, endpoint: Endpoint) -> Result<Self, ContractError> {
        if self.endpoint(endpoint.operation_id()).is_some() {
            return Err(ContractError::DuplicateOperationId {
                operation_id: endpoint.operation_id().to_string(),
            });
        }
        let mut endpoints = self.endpoints.clone();
        endpoints.push(Arc::new(endpoint));
        Ok(Self {
            endpoints,
            ..self.clone()
        })
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the endpoints, in declaration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().map(AsRef::as_ref)
    }

    /// Looks up an endpoint by operation id.
    #[must_use]
    pub fn endpoint(&self, operation_id: &str) -> Option<&Endpoint> {
        self.endpoints()
            .find(|e| e.operation_id() == operation_id)
    }

    /// Returns the number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if the group has no endpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// An immutable registry of endpoints, organized in groups.
///
/// # Example
///
/// ```
/// use hermes_core::{Api, ApiGroup, ContractError, Endpoint};
///
/// # fn main() -> Result<(), ContractError> {
/// let users = ApiGroup::new("users")
///     .add_endpoint(Endpoint::get("listUsers", "/users").build()?)?;
///
/// let api = Api::new("Example")
///     .with_version("1.0.0")
///     .add_group(users)?
///     .add_endpoint(Endpoint::get("health", "/health").build()?)?;
///
/// assert_eq!(api.endpoints().count(), 2);
/// assert!(api.endpoint("listUsers").is_some());
///
/// let dup = api.add_endpoint(Endpoint::get("health", "/healthz").build()?);
/// assert!(matches!(dup, Err(ContractError::DuplicateOperationId { .. })));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Api {
    title: String,
    version: String,
    description: Option<String>,
    groups: Vec<Arc<ApiGroup>>,
    index: Arc<HashMap<String, Arc<Endpoint>>>,
}

impl Api {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: "0.1.0".to_string(),
            description: None,
            groups: Vec::new(),
            index: Arc::new(HashMap::new()),
        }
    }

    /// Returns a copy with a version.
    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with a description.
    #[must_use]
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self.clone()
        }
    }

    /// Returns a copy with an endpoint added to the default group.
    pub fn add_endpoint(&self, endpoint: Endpoint) -> Result<Self, ContractError> {
        self.ensure_unique(endpoint.operation_id())?;

        let mut groups = self.groups.clone();
        let position = groups.iter().position(|g| g.name() == DEFAULT_GROUP);
        let default = match position {
            Some(i) => groups[i].add_endpoint(endpoint)?,
            None => ApiGroup::new(DEFAULT_GROUP).add_endpoint(endpoint)?,
        };
        let added = default.endpoints.last().map(Arc::clone);
        match position {
            Some(i) => groups[i] = Arc::new(default),
            None => groups.push(Arc::new(default)),
        }

        let mut index = (*self.index).clone();
        if let Some(endpoint) = added {
            index.insert(endpoint.operation_id().to_string(), endpoint);
        }
        Ok(Self {
            groups,
            index: Arc::new(index),
            ..self.clone()
        })
    }

    /// Returns a copy with a group added.
    pub fn add_group(&self, group: ApiGroup) -> Result<Self, ContractError> {
        if self.groups.iter().any(|g| g.name() == group.name()) {
            return Err(ContractError::DuplicateGroup {
                name: group.name().to_string(),
            });
        }

        let mut index = (*self.index).clone();
        for endpoint in &group.endpoints {
            let id = endpoint.operation_id();
            if index.contains_key(id) {
                return Err(ContractError::DuplicateOperationId {
                    operation_id: id.to_string(),
                });
            }
            index.insert(id.to_string(), Arc::clone(endpoint));
        }

        let mut groups = self.groups.clone();
        groups.push(Arc::new(group));
        Ok(Self {
            groups,
            index: Arc::new(index),
            ..self.clone()
        })
    }

    fn ensure_unique(&self, operation_id: &str) -> Result<(), ContractError> {
        if self.index.contains_key(operation_id) {
            return Err(ContractError::DuplicateOperationId {
                operation_id: operation_id.to_string(),
            });
        }
        Ok(())
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the groups, in declaration order.
    pub fn groups(&self) -> impl Iterator<Item = &ApiGroup> {
        self.groups.iter().map(AsRef::as_ref)
    }

    /// Returns every endpoint, flattened in group then declaration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.groups.iter().flat_map(|g| g.endpoints())
    }

    /// Looks up an endpoint by operation id.
    #[must_use]
    pub fn endpoint(&self, operation_id: &str) -> Option<&Endpoint> {
        self.index.get(operation_id).map(AsRef::as_ref)
    }

    /// Returns a shared handle to an endpoint.
    #[must_use]
    pub fn endpoint_arc(&self, operation_id: &str) -> Option<Arc<Endpoint>> {
        self.index.get(operation_id).map(Arc::clone)
    }

    /// Returns the number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the registry has no endpoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
