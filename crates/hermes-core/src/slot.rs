//! Codec slots.

use crate::schema::Schema;

/// One codec position in a request or response.
///
/// `Ignored` is an explicit marker, not an absent schema: an ignored body must
/// arrive empty, while ignored path, query, and header slots are skipped.
#[derive(Debug, Clone, Default)]
pub enum Slot {
    /// Nothing is decoded or encoded.
    #[default]
    Ignored,
    /// Decoded and encoded through a schema.
    Codec(Schema),
    /// `multipart/form-data`; only valid for request bodies.
    Multipart,
}

impl Slot {
    /// Returns true for the ignored marker.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Returns true for the multipart marker.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart)
    }

    /// Returns the schema of a codec slot.
    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        match self {
            Self::Codec(schema) => Some(schema),
            Self::Ignored | Self::Multipart => None,
        }
    }
}

impl From<Schema> for Slot {
    fn from(schema: Schema) -> Self {
        Self::Codec(schema)
    }
}
