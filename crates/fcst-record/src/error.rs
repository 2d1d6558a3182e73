//! Error types for schemas, records and the record store

use crate::field::FieldName;
use crate::record::RecordKey;

/// Errors raised while building an [`EntitySchema`](crate::EntitySchema)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Field declared twice
    #[error("duplicate field '{0}'")]
    DuplicateField(FieldName),

    /// A search field, group member, metric or default column names a field
    /// the schema does not declare
    #[error("{context} references unknown field '{field}'")]
    UnknownField {
        /// Where the reference appeared
        context: &'static str,
        /// The missing field
        field: FieldName,
    },

    /// A field was placed in more than one column group
    #[error("field '{field}' belongs to both '{first}' and '{second}' column groups")]
    FieldInMultipleGroups {
        /// The shared field
        field: FieldName,
        /// Group that claimed it first
        first: String,
        /// Group that claimed it again
        second: String,
    },

    /// More than two partial-match fields
    #[error("at most two partial-match fields are allowed, got {0}")]
    TooManyPartialFields(usize),
}

/// Errors raised by record construction and store mutations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    /// Insert of a key already in the store
    #[error("record '{0}' already exists")]
    DuplicateKey(RecordKey),

    /// Patch or delete of a key not in the store
    #[error("record '{0}' not found")]
    NotFound(RecordKey),

    /// Field not declared by the entity schema
    #[error("unknown field '{field}' for entity '{entity}'")]
    UnknownField {
        /// Entity name
        entity: String,
        /// Offending field
        field: FieldName,
    },

    /// The key field cannot be patched
    #[error("key field '{0}' is immutable")]
    KeyFieldImmutable(FieldName),

    /// Value does not fit the field's kind
    #[error("field '{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Field being written
        field: FieldName,
        /// Schema value kind
        expected: &'static str,
        /// Supplied value kind
        actual: &'static str,
    },

    /// Record without a usable key value
    #[error("record has no value for key field '{0}'")]
    MissingKey(FieldName),

    /// JSON payload was not an object
    #[error("record payload must be a JSON object")]
    NotAnObject,
}

impl RecordError {
    /// Whether the error stems from user input rather than program state
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateKey(_) | Self::TypeMismatch { .. } | Self::MissingKey(_)
        )
    }
}
