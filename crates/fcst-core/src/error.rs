//! Error types for the Forecast Desk workbench
//!
//! Each crate keeps its own error enum; [`DeskError`] collects them at the
//! workbench boundary.

use fcst_edit::{CommitError, EditError};
use fcst_grid::PaginationError;
use fcst_record::{RecordError, SchemaError};
use std::path::PathBuf;

/// Main workbench error type
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    /// Entity schema is inconsistent
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Record or store operation failed
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Page size change refused
    #[error("pagination error: {0}")]
    Pagination(#[from] PaginationError),

    /// Cell edit refused
    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    /// Persistence collaborator failed
    #[error("commit error: {0}")]
    Commit(#[from] CommitError),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// List, export or import collaborator failed
    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// No built-in schema with this name
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    /// The entity does not support quick entry
    #[error("entity '{0}' does not support quick entry")]
    NotQuickEntry(String),

    /// Quick entry without a product code
    #[error("quick entry needs a non-blank code")]
    BlankCode,
}

impl DeskError {
    /// Whether the error stems from user input rather than program state
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::Record(e) => e.is_user_error(),
            Self::Edit(e) => e.is_user_error(),
            Self::Pagination(_) | Self::BlankCode => true,
            _ => false,
        }
    }

    /// Whether retrying the operation later could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Commit(e) => e.is_retryable(),
            Self::Collaborator(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File content did not parse
    #[error("invalid {format} configuration: {message}")]
    Parse {
        /// `toml` or `yaml`
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// Extension is neither TOML nor YAML
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    /// Values are inconsistent
    #[error("{0}")]
    Invalid(String),
}

/// Errors reported by list, export and import collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Service could not be reached
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Service refused the request
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Payload could not be read or produced
    #[error("bad payload: {0}")]
    Format(String),
}

impl CollaboratorError {
    /// Whether retrying the same request later could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
