//! Google Drive v3 client authenticated as a service account.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::UploadError;
use crate::upload::{DriveClient, DriveFile, NewFile};

const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_API_BASE: &str = "https://www.googleapis.com";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const MULTIPART_BOUNDARY: &str = "portal_report_boundary_7c3f9a";
const FILE_FIELDS: &str = "id,name,webViewLink,webContentLink";

/// Assertion lifetime in seconds
const ASSERTION_TTL: i64 = 3600;

/// Tokens are refreshed this long before the endpoint says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The parts of a service-account key file the client needs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Parse key JSON as downloaded from the cloud console
    pub fn from_json(json: &str) -> Result<Self, UploadError> {
        let key: Self = serde_json::from_str(json)?;
        if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
            return Err(UploadError::credentials(
                "service account key lacks client_email or private_key",
            ));
        }
        Ok(key)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| UploadError::credentials(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

#[derive(Debug, Serialize)]
struct GrantClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_TTL as u64
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(value: String, expires_in: Duration, now: Instant) -> Self {
        Self {
            value,
            refresh_at: now + expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorReason {
    #[serde(default)]
    reason: Option<String>,
}

/// Drive client authorized with a JWT-bearer token.
///
/// The token is cached until shortly before it expires, so one upload
/// (create then share) performs a single token exchange.
#[derive(Debug, Clone)]
pub struct GoogleDriveClient {
    http: reqwest::Client,
    key: ServiceAccountKey,
    api_base: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl GoogleDriveClient {
    pub fn new(key: ServiceAccountKey) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            http,
            key,
            api_base: DEFAULT_API_BASE.to_string(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    /// Point the client at another API host (used by tests)
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    /// Signed grant assertion for the token endpoint
    pub fn grant_assertion(&self) -> Result<String, UploadError> {
        let now = Utc::now().timestamp();
        let claims = GrantClaims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_TTL,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    /// Cached token, or a new one from the token endpoint once it nears expiry
    async fn access_token(&self) -> Result<String, UploadError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Instant::now())) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn fetch_token(&self) -> Result<CachedToken, UploadError> {
        let assertion = self.grant_assertion()?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UploadError::Authorization {
                reason: format!("token endpoint returned {}: {}", status.as_u16(), body.trim()),
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        debug!(expires_in = token.expires_in, "Obtained drive access token");
        Ok(CachedToken::new(
            token.access_token,
            Duration::from_secs(token.expires_in),
            Instant::now(),
        ))
    }

    async fn check(response: reqwest::Response) -> Result<String, UploadError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(api_error(status.as_u16(), &body))
        }
    }
}

/// Decode Drive's error envelope, keeping the first reason
fn api_error(status: u16, body: &str) -> UploadError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => UploadError::Api {
            status,
            reason: parsed.error.errors.into_iter().find_map(|e| e.reason),
            message: parsed.error.message,
        },
        Err(_) => UploadError::Api {
            status,
            reason: None,
            message: body.trim().to_string(),
        },
    }
}

/// `multipart/related` body: JSON metadata, then the file bytes
fn multipart_body(metadata: &serde_json::Value, mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {mime}\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            meta = metadata,
            mime = mime_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

fn file_metadata(file: &NewFile<'_>) -> serde_json::Value {
    let mut metadata = json!({
        "name": file.name,
        "mimeType": file.mime_type,
    });
    if let Some(parent) = file.parent {
        metadata["parents"] = json!([parent]);
    }
    metadata
}

#[async_trait]
impl DriveClient for GoogleDriveClient {
    async fn create_file(&self, file: NewFile<'_>) -> Result<DriveFile, UploadError> {
        let token = self.access_token().await?;
        let url = format!("{}/upload/drive/v3/files", self.api_base);

        let mut query = vec![("uploadType", "multipart"), ("fields", FILE_FIELDS)];
        if file.parent.is_some() {
            query.push(("supportsAllDrives", "true"));
        }

        let body = multipart_body(&file_metadata(&file), file.mime_type, file.content);
        debug!(name = file.name, bytes = file.content.len(), "Creating drive file");

        let response = self
            .http
            .post(url)
            .query(&query)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(body)
            .send()
            .await?;

        let body = Self::check(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn share_with_anyone(&self, file_id: &str, all_drives: bool) -> Result<(), UploadError> {
        let token = self.access_token().await?;
        let url = format!("{}/drive/v3/files/{}/permissions", self.api_base, file_id);

        let mut request = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({"role": "reader", "type": "anyone"}));
        if all_drives {
            request = request.query(&[("supportsAllDrives", "true")]);
        }

        Self::check(request.send().await?).await?;
        Ok(())
    }
}
