//! HTTP handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use portal_pptx::constants::PPTX_MIME_TYPE;
use portal_report::{parse_range, GeneratedReport, UploadOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

pub const X_REPORT_SUMMARY: &str = "x-report-summary";
pub const X_DATE_RANGE: &str = "x-date-range";
pub const X_DRIVE_UPLOAD: &str = "x-drive-upload";
pub const X_DRIVE_FILE_ID: &str = "x-drive-file-id";
pub const X_DRIVE_VIEW_LINK: &str = "x-drive-view-link";
pub const X_DRIVE_DOWNLOAD_LINK: &str = "x-drive-download-link";
pub const X_DRIVE_ERROR: &str = "x-drive-error";

/// Body of `POST /reports/generate-slides`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Session first, then the body. Nothing touches the store before both pass.
pub async fn generate_slides(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    if state.sessions.verify(&headers).await.is_none() {
        info!("Rejected report request without session");
        return Err(ApiError::Unauthorized);
    }

    // An unreadable body counts as missing dates
    let request: GenerateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let range = parse_range(request.start_date.as_deref(), request.end_date.as_deref())?;

    info!(start = %range.start(), end = %range.end(), "Generating report");
    let report = state.compiler.generate(&range).await?;

    Ok(report_response(&request, report))
}

/// Deck bytes as an attachment, metadata in headers
fn report_response(request: &GenerateRequest, report: GeneratedReport) -> Response {
    let date_range = json!({
        "startDate": request.start_date,
        "endDate": request.end_date,
    });

    let mut headers = vec![
        (CONTENT_TYPE, PPTX_MIME_TYPE.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.file_name),
        ),
        (HeaderName::from_static(X_REPORT_SUMMARY), report.summary.to_header_json()),
        (HeaderName::from_static(X_DATE_RANGE), date_range.to_string()),
        (HeaderName::from_static(X_DRIVE_UPLOAD), report.upload.status().to_string()),
    ];

    match &report.upload {
        UploadOutcome::Success(result) => {
            headers.push((HeaderName::from_static(X_DRIVE_FILE_ID), result.file_id.clone()));
            headers.push((HeaderName::from_static(X_DRIVE_VIEW_LINK), result.web_view_link.clone()));
            headers.push((
                HeaderName::from_static(X_DRIVE_DOWNLOAD_LINK),
                result.web_content_link.clone(),
            ));
        }
        UploadOutcome::Failed { error } => {
            headers.push((HeaderName::from_static(X_DRIVE_ERROR), error.clone()));
        }
    }

    let mut response = (StatusCode::OK, report.bytes).into_response();
    let map = response.headers_mut();
    for (name, value) in headers {
        map.insert(name, header_value(&value));
    }
    response
}

/// Header-safe value: control characters become spaces
fn header_value(text: &str) -> HeaderValue {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    HeaderValue::from_str(&cleaned)
        .or_else(|_| HeaderValue::from_bytes(cleaned.as_bytes()))
        .unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value_strips_newlines() {
        let value = header_value("quota\r\nexceeded");
        assert_eq!(value.to_str().unwrap(), "quota  exceeded");
    }

    #[test]
    fn test_header_value_keeps_utf8() {
        let value = header_value("₹ 12,00,000");
        assert_eq!(value.as_bytes(), "₹ 12,00,000".as_bytes());
    }

    #[test]
    fn test_request_accepts_partial_body() {
        let request: GenerateRequest = serde_json::from_str(r#"{"endDate": "2024-03-31"}"#).unwrap();
        assert!(request.start_date.is_none());
        assert_eq!(request.end_date.as_deref(), Some("2024-03-31"));
    }
}
