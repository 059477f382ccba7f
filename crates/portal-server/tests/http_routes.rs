//! HTTP Route Tests
//!
//! Exercise the router in-process with `tower::ServiceExt::oneshot`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use portal_pptx::DeckOutline;
use portal_records::{
    DateRange, Lecture, MemoryRecordStore, OrganizedEvent, Project, Publication, RecordStore,
};
use portal_report::{
    DriveClient, DriveFile, DriveSettings, NewFile, ReportCompiler, ReportConfig, UploadError,
    QUOTA_EXCEEDED_MESSAGE, UPLOAD_DISABLED_MESSAGE,
};
use portal_server::{router, AppState, TokenSessionVerifier};
use tower::ServiceExt;

const TOKEN: &str = "test-session";

const FIXTURE: &str = r#"{
    "publications": [
        {"title": "Paper A", "facultyInvolved": [{"name": "A. Rao"}], "category": "Journal",
         "date": "2024-03-05", "published": true},
        {"title": "Paper B", "facultyInvolved": [{"name": "B. Sen"}], "category": "Conference",
         "date": "2024-03-18", "doi": "10.1145/1", "published": true}
    ]
}"#;

/// Memory store that counts queries
struct CountingStore {
    inner: MemoryRecordStore,
    queries: AtomicUsize,
}

impl CountingStore {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryRecordStore::from_json_str(FIXTURE).unwrap(),
            queries: AtomicUsize::new(0),
        })
    }

    fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn find_publications(&self, range: &DateRange) -> portal_records::Result<Vec<Publication>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_publications(range).await
    }

    async fn find_projects(&self, range: &DateRange) -> portal_records::Result<Vec<Project>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_projects(range).await
    }

    async fn find_lectures(&self, range: &DateRange) -> portal_records::Result<Vec<Lecture>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_lectures(range).await
    }

    async fn find_workshops(&self, range: &DateRange) -> portal_records::Result<Vec<OrganizedEvent>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_workshops(range).await
    }
}

/// Drive that always reports an exhausted quota
struct QuotaDrive;

#[async_trait]
impl DriveClient for QuotaDrive {
    async fn create_file(&self, _: NewFile<'_>) -> Result<DriveFile, UploadError> {
        Err(UploadError::Api {
            status: 403,
            reason: Some("storageQuotaExceeded".into()),
            message: "Service Accounts do not have storage quota. Raw API text.".into(),
        })
    }

    async fn share_with_anyone(&self, _: &str, _: bool) -> Result<(), UploadError> {
        Ok(())
    }
}

/// Drive that accepts uploads but refuses sharing
struct UnshareableDrive;

#[async_trait]
impl DriveClient for UnshareableDrive {
    async fn create_file(&self, file: NewFile<'_>) -> Result<DriveFile, UploadError> {
        Ok(DriveFile {
            id: "1AbC".into(),
            name: Some(file.name.to_string()),
            web_view_link: Some("https://drive.google.com/file/d/1AbC/view".into()),
            web_content_link: Some("https://drive.google.com/uc?id=1AbC".into()),
        })
    }

    async fn share_with_anyone(&self, _: &str, _: bool) -> Result<(), UploadError> {
        Err(UploadError::Api {
            status: 403,
            reason: Some("insufficientFilePermissions".into()),
            message: "Sharing is restricted".into(),
        })
    }
}

fn app(store: Arc<CountingStore>, compiler: impl FnOnce(ReportCompiler) -> ReportCompiler) -> Router {
    let compiler = compiler(ReportCompiler::new(store, ReportConfig::default()));
    let sessions = Arc::new(TokenSessionVerifier::new([TOKEN]));
    router(AppState::new(compiler, sessions))
}

fn generate(body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/reports/generate-slides")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a axum::response::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

const MARCH: &str = r#"{"startDate": "2024-03-01", "endDate": "2024-03-31"}"#;

#[tokio::test]
async fn test_missing_start_date_is_400_without_queries() {
    let store = CountingStore::new();
    let response = app(store.clone(), |c| c)
        .oneshot(generate(r#"{"endDate": "2024-03-31"}"#, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"success": false, "error": "Start date and end date are required"})
    );
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_unreadable_body_is_400() {
    let store = CountingStore::new();
    let response = app(store.clone(), |c| c)
        .oneshot(generate("not json", Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_reversed_range_is_400() {
    let store = CountingStore::new();
    let response = app(store.clone(), |c| c)
        .oneshot(generate(r#"{"startDate": "2024-04-01", "endDate": "2024-03-01"}"#, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid date range");
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_unauthenticated_is_401_without_queries() {
    let store = CountingStore::new();

    for token in [None, Some("wrong")] {
        let response = app(store.clone(), |c| c)
            .oneshot(generate(MARCH, token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(header_str(&response, header::CONTENT_TYPE.as_str())
            .unwrap()
            .starts_with("application/json"));
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"success": false, "error": "Authentication required"})
        );
    }
    assert_eq!(store.queries(), 0);
}

#[tokio::test]
async fn test_session_cookie_accepted() {
    let store = CountingStore::new();
    let request = Request::builder()
        .method("POST")
        .uri("/reports/generate-slides")
        .header(header::COOKIE, format!("session={}", TOKEN))
        .body(Body::from(MARCH))
        .unwrap();

    let response = app(store.clone(), |c| c.with_drive_settings(DriveSettings::disabled()))
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(store.queries(), 4);
}

#[tokio::test]
async fn test_quota_error_still_returns_deck() {
    let store = CountingStore::new();
    let response = app(store, |c| c.with_drive(Arc::new(QuotaDrive)))
        .oneshot(generate(MARCH, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, "content-type"),
        Some("application/vnd.openxmlformats-officedocument.presentationml.presentation")
    );
    assert_eq!(
        header_str(&response, "content-disposition"),
        Some("attachment; filename=\"CSE_Report_2024-03-01_to_2024-03-31.pptx\"")
    );
    assert_eq!(header_str(&response, "x-drive-upload"), Some("failed"));
    assert_eq!(header_str(&response, "x-drive-error"), Some(QUOTA_EXCEEDED_MESSAGE));
    assert!(header_str(&response, "x-drive-file-id").is_none());

    let summary: serde_json::Value =
        serde_json::from_str(header_str(&response, "x-report-summary").unwrap()).unwrap();
    assert_eq!(
        summary,
        serde_json::json!({"publications": 2, "projects": 0, "lectures": 0, "workshops": 0, "totalItems": 2})
    );
    let range: serde_json::Value =
        serde_json::from_str(header_str(&response, "x-date-range").unwrap()).unwrap();
    assert_eq!(range["startDate"], "2024-03-01");

    let bytes = body_bytes(response).await;
    let outline = DeckOutline::from_bytes(&bytes).unwrap();
    assert_eq!(outline.len(), 3);
}

#[tokio::test]
async fn test_disabled_upload_header() {
    let store = CountingStore::new();
    let response = app(store, |c| c.with_drive_settings(DriveSettings::disabled()))
        .oneshot(generate(MARCH, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "x-drive-error"), Some(UPLOAD_DISABLED_MESSAGE));
}

#[tokio::test]
async fn test_share_failure_reports_success_links() {
    let store = CountingStore::new();
    let response = app(store, |c| c.with_drive(Arc::new(UnshareableDrive)))
        .oneshot(generate(MARCH, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, "x-drive-upload"), Some("success"));
    assert_eq!(header_str(&response, "x-drive-file-id"), Some("1AbC"));
    assert_eq!(
        header_str(&response, "x-drive-view-link"),
        Some("https://drive.google.com/file/d/1AbC/view")
    );
    assert_eq!(
        header_str(&response, "x-drive-download-link"),
        Some("https://drive.google.com/uc?id=1AbC")
    );
    assert!(header_str(&response, "x-drive-error").is_none());
}

#[tokio::test]
async fn test_synthesis_failure_is_500_envelope() {
    let store = Arc::new(CountingStore {
        inner: MemoryRecordStore::from_json_str(
            r#"{"publications": [{"title": "Orphan", "date": "2024-03-02", "published": true}]}"#,
        )
        .unwrap(),
        queries: AtomicUsize::new(0),
    });
    let response = app(store, |c| c.with_drive_settings(DriveSettings::disabled()))
        .oneshot(generate(MARCH, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to generate report");
    assert!(body["details"].as_str().unwrap().contains("faculty list is missing"));
}

#[tokio::test]
async fn test_health() {
    let response = app(CountingStore::new(), |c| c)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "portal-server");
}
