//! Error types for record access.

use thiserror::Error;

/// Result type for record operations
pub type Result<T> = std::result::Result<T, RecordError>;

/// Errors that can occur while reading activity records
#[derive(Error, Debug)]
pub enum RecordError {
    /// A date string could not be parsed
    #[error("Invalid date: {value}")]
    InvalidDate { value: String },

    /// Start of the range lies after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: String, end: String },

    /// A stored document does not match its record schema
    #[error("Invalid document in '{collection}': {reason}")]
    InvalidDocument { collection: String, reason: String },

    /// The store could not be reached or refused the query
    #[error("Record store unavailable: {reason}")]
    Unavailable { reason: String },

    /// Fixture JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// MongoDB driver error
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

impl RecordError {
    /// Create an invalid date error
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Create an invalid document error
    pub fn invalid_document(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Create an unavailable store error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// True for errors caused by caller input rather than the store
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidDate { .. } | Self::InvalidRange { .. })
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDate { .. } => "REC001",
            Self::InvalidRange { .. } => "REC002",
            Self::InvalidDocument { .. } => "REC003",
            Self::Unavailable { .. } => "REC004",
            Self::Json(_) => "REC005",
            Self::Io(_) => "REC006",
            #[cfg(feature = "mongodb")]
            Self::Database(_) => "REC007",
        }
    }
}
