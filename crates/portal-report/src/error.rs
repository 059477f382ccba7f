//! Error types for report compilation and upload.

use portal_pptx::PptxError;
use portal_records::RecordError;
use thiserror::Error;

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

/// Errors that abort a report request
#[derive(Error, Debug)]
pub enum ReportError {
    /// Request input is missing or unusable
    #[error("{reason}")]
    Validation { reason: String },

    /// A record-store query failed
    #[error("Failed to fetch {collection}: {source}")]
    Fetch {
        collection: &'static str,
        #[source]
        source: RecordError,
    },

    /// A record could not be rendered into the deck
    #[error("Cannot render {collection} record: {reason}")]
    Synthesis {
        collection: &'static str,
        reason: String,
    },

    /// Deck serialization failed
    #[error("Failed to serialize deck: {0}")]
    Pptx(#[from] PptxError),
}

impl ReportError {
    /// Create a validation error
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a fetch error for a collection
    pub fn fetch(collection: &'static str, source: RecordError) -> Self {
        Self::Fetch { collection, source }
    }

    /// Create a synthesis error
    pub fn synthesis(collection: &'static str, reason: impl Into<String>) -> Self {
        Self::Synthesis {
            collection,
            reason: reason.into(),
        }
    }

    /// True when the caller can fix the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "RPT001",
            Self::Fetch { .. } => "RPT002",
            Self::Synthesis { .. } => "RPT003",
            Self::Pptx(_) => "RPT004",
        }
    }
}

/// Errors from the cloud drive. Never fatal to a report.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Service-account credentials are absent or unreadable
    #[error("Drive credentials unavailable: {reason}")]
    Credentials { reason: String },

    /// Token grant was refused
    #[error("Drive authorization failed: {reason}")]
    Authorization { reason: String },

    /// The Drive API answered with an error status
    #[error("Drive API error {status}: {message}")]
    Api {
        status: u16,
        reason: Option<String>,
        message: String,
    },

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Signing the grant assertion failed
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Response or key JSON could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    /// Create a credentials error
    pub fn credentials(reason: impl Into<String>) -> Self {
        Self::Credentials {
            reason: reason.into(),
        }
    }

    /// Whether the failure is the storage quota being exhausted
    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::Api {
                reason, message, ..
            } => {
                reason
                    .as_deref()
                    .is_some_and(|r| r.eq_ignore_ascii_case("storageQuotaExceeded"))
                    || message.to_ascii_lowercase().contains("quota")
            }
            _ => false,
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Credentials { .. } => "UPL001",
            Self::Authorization { .. } => "UPL002",
            Self::Api { .. } => "UPL003",
            Self::Http(_) => "UPL004",
            Self::Jwt(_) => "UPL005",
            Self::Json(_) => "UPL006",
        }
    }
}
