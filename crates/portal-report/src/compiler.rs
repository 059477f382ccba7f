//! The report pipeline: fetch, build, serialize, upload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use portal_pptx::constants::PPTX_MIME_TYPE;
use portal_pptx::PptxWriter;
use portal_records::{DateRange, RecordStore};
use tracing::{info, instrument};

use crate::builder::build_deck;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::fetch::fetch_records;
use crate::summary::ReportSummary;
use crate::upload::{upload_report, DriveClient, DriveSettings, UploadOutcome};

pub const MISSING_DATES_MESSAGE: &str = "Start date and end date are required";
pub const INVALID_RANGE_MESSAGE: &str = "Invalid date range";

/// Validate raw request dates. Blank counts as missing.
pub fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
    let start = start.map(str::trim).filter(|s| !s.is_empty());
    let end = end.map(str::trim).filter(|s| !s.is_empty());

    match (start, end) {
        (Some(start), Some(end)) => {
            DateRange::parse(start, end).map_err(|_| ReportError::validation(INVALID_RANGE_MESSAGE))
        }
        _ => Err(ReportError::validation(MISSING_DATES_MESSAGE)),
    }
}

/// `<Dept>_Report_<start>_to_<end>.pptx`
pub fn report_file_name(short_name: &str, range: &DateRange) -> String {
    let prefix: String = short_name
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() || matches!(c, '"' | '/' | '\\') { '_' } else { c })
        .collect();

    format!(
        "{}_Report_{}_to_{}.pptx",
        prefix,
        range.start().format("%Y-%m-%d"),
        range.end().format("%Y-%m-%d")
    )
}

/// A serialized report before upload
#[derive(Debug, Clone)]
pub struct CompiledReport {
    pub bytes: Vec<u8>,
    pub summary: ReportSummary,
    pub file_name: String,
}

/// A serialized report and what happened to its upload
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub bytes: Vec<u8>,
    pub summary: ReportSummary,
    pub file_name: String,
    pub upload: UploadOutcome,
}

/// Compiles activity reports. Holds only read-only shared state, so one
/// instance serves any number of concurrent requests.
#[derive(Clone)]
pub struct ReportCompiler {
    store: Arc<dyn RecordStore>,
    drive: Option<Arc<dyn DriveClient>>,
    config: Arc<ReportConfig>,
    drive_settings: DriveSettings,
    timestamp: Option<DateTime<Utc>>,
}

impl ReportCompiler {
    pub fn new(store: Arc<dyn RecordStore>, config: ReportConfig) -> Self {
        Self {
            store,
            drive: None,
            config: Arc::new(config),
            drive_settings: DriveSettings::default(),
            timestamp: None,
        }
    }

    pub fn with_drive(mut self, drive: Arc<dyn DriveClient>) -> Self {
        self.drive = Some(drive);
        self
    }

    pub fn with_drive_settings(mut self, settings: DriveSettings) -> Self {
        self.drive_settings = settings;
        self
    }

    /// Pin the package timestamp; output bytes then depend only on the records
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn drive_settings(&self) -> &DriveSettings {
        &self.drive_settings
    }

    /// Fetch, build and serialize. No upload.
    #[instrument(skip(self), fields(start = %range.start(), end = %range.end()))]
    pub async fn compile(&self, range: &DateRange) -> Result<CompiledReport> {
        let records = fetch_records(self.store.as_ref(), range).await?;
        let built = build_deck(&self.config, range, &records)?;

        let mut writer = PptxWriter::from_deck(self.config.deck.clone(), &built.deck);
        if let Some(timestamp) = self.timestamp {
            writer = writer.with_timestamp(timestamp);
        }
        let bytes = writer.generate()?;

        info!(
            slides = built.deck.len(),
            bytes = bytes.len(),
            total_items = built.summary.total_items,
            skipped = built.summary.skipped,
            "Compiled report"
        );

        Ok(CompiledReport {
            bytes,
            summary: built.summary,
            file_name: report_file_name(&self.config.department.short_name, range),
        })
    }

    /// Compile and then attempt the upload. Upload problems only show up in
    /// the outcome.
    pub async fn generate(&self, range: &DateRange) -> Result<GeneratedReport> {
        let compiled = self.compile(range).await?;

        let upload = upload_report(
            self.drive.as_deref(),
            &self.drive_settings,
            &compiled.file_name,
            PPTX_MIME_TYPE,
            &compiled.bytes,
        )
        .await;
        info!(upload = upload.status(), file_name = %compiled.file_name, "Report ready");

        Ok(GeneratedReport {
            bytes: compiled.bytes,
            summary: compiled.summary,
            file_name: compiled.file_name,
            upload,
        })
    }
}

impl std::fmt::Debug for ReportCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportCompiler")
            .field("backend", &self.store.backend_tag())
            .field("drive", &self.drive.is_some())
            .field("drive_settings", &self.drive_settings)
            .finish()
    }
}
