//! Error types for the HTTP service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_records::RecordError;
use portal_report::ReportError;
use serde::Serialize;
use thiserror::Error;

/// Error reported to HTTP callers as a JSON envelope
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to generate report")]
    Internal { details: String },
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            tracing::error!(code = err.code(), error = %err, "Report generation failed");
            Self::Internal {
                details: err.to_string(),
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self {
            Self::Internal { details } => Some(details.as_str()),
            _ => None,
        };
        let envelope = ErrorEnvelope {
            success: false,
            error: self.to_string(),
            details,
        };

        (self.status(), Json(envelope)).into_response()
    }
}

/// Errors that stop the service from starting
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Record store error: {0}")]
    Store(#[from] RecordError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for service setup
pub type Result<T> = std::result::Result<T, ServerError>;

impl ServerError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigRead { .. } => "SRV001",
            Self::ConfigParse(_) => "SRV002",
            Self::Config(_) => "SRV003",
            Self::Store(_) => "SRV004",
            Self::Io(_) => "SRV005",
        }
    }
}
