//! Client error types.
//!
//! Every failure of a call is tagged with the side that caused it:
//!
//! | Variant | Meaning | Retryable |
//! |---------|---------|-----------|
//! | [`ClientError::Client`] with [`ClientSideError::Transport`] | the request never got a response | yes |
//! | other [`ClientError::Client`] | encoding, decoding, or an undeclared status | no |
//! | [`ClientError::Server`] | the server answered with a status of 300 or above | no |

use hermes_core::{ErrorEnvelope, Issue};
use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::transport::TransportError;

/// A fault on this side of the wire.
#[derive(Debug, Error)]
pub enum ClientSideError {
    /// The operation ID is not part of the client's API.
    #[error("unknown operation '{operation_id}'")]
    UnknownOperation {
        /// The requested operation ID.
        operation_id: String,
    },

    /// The input could not be encoded into a request.
    #[error("cannot encode request for '{operation_id}': {message}")]
    Encode {
        /// The operation being called.
        operation_id: String,
        /// What went wrong.
        message: String,
        /// Schema issues, if any.
        issues: Vec<Issue>,
    },

    /// The response could not be decoded.
    #[error("cannot decode response for '{operation_id}': {message}")]
    Decode {
        /// The operation being called.
        operation_id: String,
        /// What went wrong.
        message: String,
        /// Schema issues, if any.
        issues: Vec<Issue>,
    },

    /// The server answered with a success status the endpoint does not declare.
    #[error("status {status} is not declared for '{operation_id}' (allowed: {allowed:?})")]
    UnexpectedStatus {
        /// The operation being called.
        operation_id: String,
        /// The received status.
        status: u16,
        /// The declared statuses.
        allowed: Vec<u16>,
    },

    /// The transport failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClientSideError {
    pub(crate) fn encode(operation_id: &str, message: impl Into<String>) -> Self {
        Self::Encode {
            operation_id: operation_id.to_string(),
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub(crate) fn decode(operation_id: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation_id: operation_id.to_string(),
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub(crate) fn with_issues(mut self, new_issues: Vec<Issue>) -> Self {
        match &mut self {
            Self::Encode { issues, .. } | Self::Decode { issues, .. } => *issues = new_issues,
            _ => {}
        }
        self
    }

    /// Returns the schema issues carried by encode and decode failures.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Encode { issues, .. } | Self::Decode { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// The server answered with a status of 300 or above.
#[derive(Debug, Clone, Error)]
#[error("server responded {status} to '{operation_id}'")]
pub struct ServerSideError {
    /// The operation being called.
    pub operation_id: String,
    /// The remote status.
    pub status: StatusCode,
    /// The response body: parsed JSON when possible, otherwise the raw text.
    pub body: Value,
}

impl ServerSideError {
    /// Interprets the body as a Hermes error envelope.
    #[must_use]
    pub fn envelope(&self) -> Option<ErrorEnvelope> {
        serde_json::from_value(self.body.clone()).ok()
    }
}

/// A failed call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A fault on this side of the wire.
    #[error(transparent)]
    Client(#[from] ClientSideError),

    /// The server reported a failure.
    #[error(transparent)]
    Server(#[from] ServerSideError),
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        Self::Client(ClientSideError::Transport(error))
    }
}

impl ClientError {
    /// Returns true for faults on this side of the wire.
    #[must_use]
    pub fn is_client_side(&self) -> bool {
        matches!(self, Self::Client(_))
    }

    /// Returns true when the server answered with a failure status.
    #[must_use]
    pub fn is_server_side(&self) -> bool {
        matches!(self, Self::Server(_))
    }

    /// Returns true only for transport faults, where no response arrived.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Client(ClientSideError::Transport(_)))
    }

    /// Returns the remote status of a server-side fault.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Server(e) => Some(e.status),
            Self::Client(_) => None,
        }
    }
}
