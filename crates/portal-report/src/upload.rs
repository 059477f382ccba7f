//! Best-effort upload of the finished deck to a cloud drive.
//!
//! The upload never decides whether a report succeeds. Every failure is
//! folded into an [`UploadOutcome::Failed`] with a message meant for people.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::UploadError;

/// Fixed message when uploads are switched off
pub const UPLOAD_DISABLED_MESSAGE: &str = "Google Drive upload temporarily disabled";

/// Shown instead of the raw API text when the drive is out of space
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Google Drive storage quota exceeded. Service accounts have no storage \
     of their own; set GOOGLE_SHARED_DRIVE_ID to upload into a shared drive.";

/// Drive behaviour, resolved once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveSettings {
    /// Skip the upload entirely
    #[serde(default)]
    pub disabled: bool,

    /// Shared drive to upload into; also turns on all-drives support
    #[serde(default)]
    pub shared_drive_id: Option<String>,
}

impl DriveSettings {
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            shared_drive_id: None,
        }
    }

    pub fn with_shared_drive(mut self, id: impl Into<String>) -> Self {
        self.shared_drive_id = Some(id.into());
        self
    }

    fn shared_drive(&self) -> Option<&str> {
        self.shared_drive_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// File to create on the drive
#[derive(Debug, Clone, Copy)]
pub struct NewFile<'a> {
    pub name: &'a str,
    pub mime_type: &'a str,
    pub parent: Option<&'a str>,
    pub content: &'a [u8],
}

/// Drive's view of a created file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
}

/// Cloud drive operations used by the report upload
#[async_trait]
pub trait DriveClient: Send + Sync {
    /// Create a file. `parent` is a shared drive or folder id.
    async fn create_file(&self, file: NewFile<'_>) -> Result<DriveFile, UploadError>;

    /// Grant read access to anyone holding the link
    async fn share_with_anyone(&self, file_id: &str, all_drives: bool) -> Result<(), UploadError>;
}

/// Links to an uploaded report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub file_id: String,
    pub web_view_link: String,
    pub web_content_link: String,
    pub file_name: String,
}

/// What happened to the upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Success(UploadResult),
    Failed { error: String },
}

impl UploadOutcome {
    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed { error: error.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `success` or `failed`
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            Self::Success(_) => None,
        }
    }
}

/// User-facing text for an upload error
pub fn describe_upload_error(err: &UploadError) -> String {
    if err.is_quota_exceeded() {
        QUOTA_EXCEEDED_MESSAGE.to_string()
    } else {
        format!("Google Drive upload failed: {}", err)
    }
}

/// Upload the deck and share it. Never fails; the outcome says what happened.
pub async fn upload_report(
    drive: Option<&dyn DriveClient>,
    settings: &DriveSettings,
    file_name: &str,
    mime_type: &str,
    content: &[u8],
) -> UploadOutcome {
    if settings.disabled {
        info!("Drive upload disabled");
        return UploadOutcome::failed(UPLOAD_DISABLED_MESSAGE);
    }

    let Some(drive) = drive else {
        let err = UploadError::credentials("no service account configured");
        warn!(error = %err, "Drive upload skipped");
        return UploadOutcome::failed(describe_upload_error(&err));
    };

    let parent = settings.shared_drive();
    let file = NewFile {
        name: file_name,
        mime_type,
        parent,
        content,
    };

    let created = match drive.create_file(file).await {
        Ok(created) => created,
        Err(err) => {
            warn!(code = err.code(), error = %err, "Drive upload failed");
            return UploadOutcome::failed(describe_upload_error(&err));
        }
    };

    share_best_effort(drive, &created.id, parent.is_some()).await;

    info!(file_id = %created.id, file_name, "Uploaded report to drive");
    UploadOutcome::Success(UploadResult {
        web_view_link: created.web_view_link.unwrap_or_default(),
        web_content_link: created.web_content_link.unwrap_or_default(),
        file_name: created.name.unwrap_or_else(|| file_name.to_string()),
        file_id: created.id,
    })
}

/// Link sharing runs only after a successful create; its failure is logged
async fn share_best_effort(drive: &dyn DriveClient, file_id: &str, all_drives: bool) {
    if let Err(err) = drive.share_with_anyone(file_id, all_drives).await {
        warn!(file_id, code = err.code(), error = %err, "Could not share uploaded report");
    }
}
