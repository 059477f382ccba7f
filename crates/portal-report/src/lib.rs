//! # portal-report
//!
//! Compiles a department activity report for a date range.
//!
//! The pipeline runs in order:
//!
//! 1. [`fetch_records`] queries publications, projects, lectures and
//!    workshops concurrently; the first failure aborts the report
//! 2. [`build_deck`] lays the records out as slides
//! 3. the deck is serialized to PPTX bytes
//! 4. [`upload_report`] tries to put the file on Google Drive
//!
//! The bytes are always returned. Upload problems only appear in the
//! [`UploadOutcome`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use portal_records::MemoryRecordStore;
//! use portal_report::{parse_range, ReportCompiler, ReportConfig};
//!
//! let store = Arc::new(MemoryRecordStore::from_json_file("records.json")?);
//! let compiler = ReportCompiler::new(store, ReportConfig::default());
//!
//! let range = parse_range(Some("2024-01-01"), Some("2024-03-31"))?;
//! let report = compiler.generate(&range).await?;
//! std::fs::write(&report.file_name, &report.bytes)?;
//! ```

pub mod builder;
pub mod citation;
pub mod compiler;
pub mod config;
pub mod drive;
pub mod error;
pub mod fetch;
pub mod period;
pub mod summary;
pub mod upload;

// Re-exports
pub use builder::{build_deck, BuiltDeck, CONTINUED_SUFFIX, ITEMS_PER_SLIDE};
pub use compiler::{
    parse_range, report_file_name, CompiledReport, GeneratedReport, ReportCompiler,
    INVALID_RANGE_MESSAGE, MISSING_DATES_MESSAGE,
};
pub use config::{DepartmentConfig, MalformedRecordPolicy, ReportConfig};
pub use drive::{GoogleDriveClient, ServiceAccountKey};
pub use error::{ReportError, Result, UploadError};
pub use fetch::{fetch_records, ReportRecords};
pub use period::report_subtitle;
pub use summary::ReportSummary;
pub use upload::{
    upload_report, DriveClient, DriveFile, DriveSettings, NewFile, UploadOutcome, UploadResult,
    QUOTA_EXCEEDED_MESSAGE, UPLOAD_DISABLED_MESSAGE,
};
