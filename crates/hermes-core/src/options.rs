//! Parse options shared by server and client codecs.

use serde::{Deserialize, Serialize};

/// How many issues a decode or encode collects before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorReporting {
    /// Stop at the first issue. On the server, later slots are not decoded.
    First,
    /// Collect every issue in every slot.
    #[default]
    All,
}

/// Options threaded through every schema decode and encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Issue collection mode.
    pub errors: ErrorReporting,
}

impl ParseOptions {
    /// Stops at the first issue.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            errors: ErrorReporting::First,
        }
    }

    /// Collects every issue.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            errors: ErrorReporting::All,
        }
    }

    /// Returns true in first-issue mode.
    #[must_use]
    pub const fn stops_early(&self) -> bool {
        matches!(self.errors, ErrorReporting::First)
    }
}
