//! Edit errors

use fcst_record::{FieldName, RecordError};

/// Errors raised by [`CellEditController`](crate::CellEditController)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    /// The field is identity or derived
    #[error("field '{0}' is not editable")]
    NotEditable(FieldName),

    /// Numeric input could not be parsed or is not finite
    #[error("'{input}' is not a valid number for field '{field}'")]
    InvalidNumber {
        /// Target field
        field: FieldName,
        /// Input as received
        input: String,
    },

    /// Store rejected the patch
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Debounced mode needs a tokio runtime to run its timers
    #[error("debounced editing requires a tokio runtime")]
    NoRuntime,

    /// Edit configuration is unusable
    #[error("invalid edit configuration: {0}")]
    InvalidConfig(String),
}

impl EditError {
    /// Whether the error stems from user input
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        match self {
            Self::NotEditable(_) | Self::InvalidNumber { .. } => true,
            Self::Record(e) => e.is_user_error(),
            Self::NoRuntime | Self::InvalidConfig(_) => false,
        }
    }
}
