//! Handler registration and dispatch.
//!
//! Handlers are typed async functions `(input, credential) -> output`:
//!
//! - **input** deserializes from the decoded `{path, query, headers, body}`
//! - **credential** is whatever the endpoint's security yields
//! - **output** is the bare body, or a [`Reply`](hermes_core::Reply) for
//!   full-response endpoints
//!
//! # Example
//!
//! ```rust
//! use hermes_server::{HandlerError, HandlerRegistry};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct GetUser {
//!     path: UserPath,
//! }
//!
//! #[derive(Deserialize)]
//! struct UserPath {
//!     id: i64,
//! }
//!
//! #[derive(Serialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! async fn get_user(input: GetUser, _: ()) -> Result<User, HandlerError> {
//!     Ok(User { id: input.path.id, name: "ada".into() })
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("getUser", get_user).unwrap();
//! assert!(registry.contains("getUser"));
//! ```

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use hermes_core::{ContractError, HttpError};
use hermes_security::BoxedCredential;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// A type-erased handler function.
pub type ErasedHandler =
    Arc<dyn Fn(Value, BoxedCredential) -> BoxFuture<'static, Result<Value, InvokeError>> + Send + Sync>;

/// What a handler may fail with.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Answer with this status and JSON body, bypassing the response encoder.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Unexpected failure; answered with 500.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Wraps any error as an internal failure.
    pub fn internal<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal(anyhow::Error::new(error))
    }
}

/// Error returned when invoking a handler fails.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The decoded input does not deserialize into the handler's input type.
    #[error("handler input does not match the contract: {0}")]
    Input(#[source] serde_json::Error),

    /// The handler's output does not serialize.
    #[error("handler output cannot be serialized: {0}")]
    Output(#[source] serde_json::Error),

    /// The credential is not of the handler's credential type.
    #[error("credential is not a {expected}")]
    Credential {
        /// Type the handler takes.
        expected: &'static str,
    },

    /// The handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

#[derive(Clone)]
struct Registered {
    handler: ErasedHandler,
    credential_type: TypeId,
    credential_type_name: &'static str,
}

/// Registry for operation handlers.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Registered>,
}

impl HandlerRegistry {
    /// Creates a new empty handler registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler for an operation.
    ///
    /// Fails if the operation already has one.
    pub fn register<I, C, O, F, Fut>(
        &mut self,
        operation_id: impl Into<String>,
        handler: F,
    ) -> Result<(), ContractError>
    where
        I: DeserializeOwned + Send + 'static,
        C: Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I, C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    {
        let operation_id = operation_id.into();
        if self.handlers.contains_key(&operation_id) {
            return Err(ContractError::DuplicateHandler { operation_id });
        }

        let handler = Arc::new(handler);
        let erased: ErasedHandler = Arc::new(move |input: Value, credential: BoxedCredential| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let input: I = serde_json::from_value(input).map_err(InvokeError::Input)?;
                let credential = credential
                    .downcast::<C>()
                    .map_err(|_| InvokeError::Credential {
                        expected: type_name::<C>(),
                    })?;
                let output = handler(input, *credential).await?;
                serde_json::to_value(output).map_err(InvokeError::Output)
            })
        });

        self.handlers.insert(
            operation_id,
            Registered {
                handler: erased,
                credential_type: TypeId::of::<C>(),
                credential_type_name: type_name::<C>(),
            },
        );
        Ok(())
    }

    /// Looks up a handler by operation ID.
    #[must_use]
    pub fn get(&self, operation_id: &str) -> Option<&ErasedHandler> {
        self.handlers.get(operation_id).map(|r| &r.handler)
    }

    /// Returns the credential type a handler takes, with its name.
    #[must_use]
    pub fn credential_type(&self, operation_id: &str) -> Option<(TypeId, &'static str)> {
        self.handlers
            .get(operation_id)
            .map(|r| (r.credential_type, r.credential_type_name))
    }

    /// Checks if a handler is registered for an operation.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns an iterator over registered operation IDs.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Invokes the handler for an operation.
    ///
    /// Returns `None` if no handler is registered.
    pub async fn invoke(
        &self,
        operation_id: &str,
        input: Value,
        credential: BoxedCredential,
    ) -> Option<Result<Value, InvokeError>> {
        let handler = self.get(operation_id)?;
        Some(handler(input, credential).await)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
