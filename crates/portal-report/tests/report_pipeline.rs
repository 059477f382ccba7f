//! Report Pipeline Tests
//!
//! Drives the compiler end to end against an in-memory record store and
//! reads the generated decks back through the outline reader.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use portal_pptx::DeckOutline;
use portal_records::{
    DateRange, Lecture, MemoryRecordStore, OrganizedEvent, Project, Publication, RecordError,
    RecordStore,
};
use portal_report::{
    DriveClient, DriveFile, DriveSettings, MalformedRecordPolicy, NewFile, ReportCompiler,
    ReportConfig, ReportSummary, UploadError, UploadOutcome, QUOTA_EXCEEDED_MESSAGE,
    UPLOAD_DISABLED_MESSAGE,
};

fn publication(n: usize, day: u32) -> serde_json::Value {
    serde_json::json!({
        "title": format!("Paper {}", n),
        "facultyInvolved": [{"name": "A. Rao"}],
        "category": "Journal",
        "journal_name": "IEEE Access",
        "date": format!("2024-03-{:02}", day),
        "doi": format!("10.1109/ACCESS.2024.{}", n),
        "published": true
    })
}

fn store_with(publications: Vec<serde_json::Value>) -> MemoryRecordStore {
    let fixture = serde_json::json!({
        "publications": publications,
        "projects": [
            {"title": "Draft Project", "facultyInvolved": [{"name": "B"}], "industry": "DST",
             "amount": "5,00,000", "date": "2024-03-10", "published": false}
        ],
        "lecturesDelivered": [
            {"title": "Old Talk", "facultyInvolved": [{"name": "C"}], "institution": "IIT",
             "date": "2023-12-10", "published": true}
        ],
        "organizedEvents": [
            {"title": "Conf", "category": "Conferences", "facultyInvolved": [{"name": "D"}],
             "venue": "Hall", "date": "2024-03-12", "published": true}
        ]
    });
    MemoryRecordStore::from_json_str(&fixture.to_string()).unwrap()
}

fn march() -> DateRange {
    DateRange::parse("2024-03-01", "2024-03-31").unwrap()
}

fn compiler(store: MemoryRecordStore) -> ReportCompiler {
    ReportCompiler::new(Arc::new(store), ReportConfig::default())
        .with_drive_settings(DriveSettings::disabled())
}

#[tokio::test]
async fn test_two_publications_make_three_slides() {
    let store = store_with(vec![publication(1, 3), publication(2, 20)]);
    let report = compiler(store).generate(&march()).await.unwrap();

    assert_eq!(
        report.summary,
        ReportSummary {
            publications: 2,
            projects: 0,
            lectures: 0,
            workshops: 0,
            total_items: 2,
            skipped: 0,
        }
    );

    let outline = DeckOutline::from_bytes(&report.bytes).unwrap();
    assert_eq!(outline.titles(), vec!["CSE Activity Report", "Publications", "Ongoing Activities"]);
    assert_eq!(outline.slides[0].subtitle.as_deref(), Some("March 2024"));
    assert_eq!(outline.slides[1].paragraphs.len(), 2);
    assert_eq!(
        outline.slides[1].paragraphs[0],
        "A. Rao. \"Paper 1\". IEEE Access (2024). DOI: 10.1109/ACCESS.2024.1."
    );
    assert_eq!(report.file_name, "CSE_Report_2024-03-01_to_2024-03-31.pptx");
}

#[tokio::test]
async fn test_five_publications_paginate() {
    let store = store_with((1..=5).map(|n| publication(n, n as u32)).collect());
    let report = compiler(store).compile(&march()).await.unwrap();

    let outline = DeckOutline::from_bytes(&report.bytes).unwrap();
    assert_eq!(
        outline.titles(),
        vec![
            "CSE Activity Report",
            "Publications",
            "Publications (continued)",
            "Ongoing Activities"
        ]
    );
    assert_eq!(outline.slides[1].paragraphs.len(), 4);
    assert_eq!(outline.slides[2].paragraphs, vec!["A. Rao. \"Paper 5\". IEEE Access (2024). DOI: 10.1109/ACCESS.2024.5."]);
}

#[tokio::test]
async fn test_projects_table_has_header_plus_rows() {
    let fixture = serde_json::json!({
        "projects": (1..=7).map(|n| serde_json::json!({
            "title": format!("Project {}", n),
            "facultyInvolved": [{"name": "A. Rao"}, {"name": "B. Sen"}],
            "industry": "SERB",
            "amount": 1_000_000 + n,
            "date": "2024-02-15",
            "published": true
        })).collect::<Vec<_>>()
    });
    let store = MemoryRecordStore::from_json_str(&fixture.to_string()).unwrap();
    let range = DateRange::parse("2024-01-01", "2024-03-31").unwrap();

    let report = compiler(store).compile(&range).await.unwrap();
    let outline = DeckOutline::from_bytes(&report.bytes).unwrap();

    assert_eq!(outline.slides[0].subtitle.as_deref(), Some("January, March & March 2024"));
    let tables: Vec<_> = outline.slides.iter().flat_map(|s| s.tables.iter()).collect();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].len(), 8);
    assert_eq!(tables[0][0], vec!["Title", "Duration", "Funding Agency", "Amount", "Coordinators"]);
    assert_eq!(tables[0][1], vec!["Project 1", "2024", "SERB", "₹ 1000001", "A. Rao, B. Sen"]);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_content() {
    let store = Arc::new(store_with((1..=6).map(|n| publication(n, n as u32)).collect()));
    let compiler = ReportCompiler::new(store, ReportConfig::default());

    let first = compiler.compile(&march()).await.unwrap();
    let second = compiler.compile(&march()).await.unwrap();

    assert_eq!(first.summary, second.summary);
    assert_eq!(
        DeckOutline::from_bytes(&first.bytes).unwrap(),
        DeckOutline::from_bytes(&second.bytes).unwrap()
    );
}

#[tokio::test]
async fn test_pinned_timestamp_gives_identical_bytes() {
    let store = Arc::new(store_with(vec![publication(1, 1)]));
    let compiler = ReportCompiler::new(store, ReportConfig::default())
        .with_timestamp(Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap());

    let first = compiler.compile(&march()).await.unwrap();
    let second = compiler.compile(&march()).await.unwrap();
    assert_eq!(first.bytes, second.bytes);
}

/// Drive that refuses every upload for lack of quota
struct QuotaExhaustedDrive {
    creates: AtomicUsize,
}

#[async_trait]
impl DriveClient for QuotaExhaustedDrive {
    async fn create_file(&self, _: NewFile<'_>) -> Result<DriveFile, UploadError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Err(UploadError::Api {
            status: 403,
            reason: Some("storageQuotaExceeded".into()),
            message: "Service Accounts do not have storage quota.".into(),
        })
    }

    async fn share_with_anyone(&self, _: &str, _: bool) -> Result<(), UploadError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_upload_disabled_matches_enabled_content() {
    let store = Arc::new(store_with(vec![publication(1, 2), publication(2, 4)]));
    let drive = Arc::new(QuotaExhaustedDrive {
        creates: AtomicUsize::new(0),
    });

    let enabled = ReportCompiler::new(store.clone(), ReportConfig::default()).with_drive(drive.clone());
    let disabled = enabled.clone().with_drive_settings(DriveSettings::disabled());

    let a = enabled.generate(&march()).await.unwrap();
    let b = disabled.generate(&march()).await.unwrap();

    assert_eq!(a.summary, b.summary);
    assert_eq!(
        DeckOutline::from_bytes(&a.bytes).unwrap(),
        DeckOutline::from_bytes(&b.bytes).unwrap()
    );
    assert_eq!(a.upload, UploadOutcome::failed(QUOTA_EXCEEDED_MESSAGE));
    assert_eq!(b.upload, UploadOutcome::failed(UPLOAD_DISABLED_MESSAGE));
    assert_eq!(drive.creates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_malformed_record_policies() {
    let mut bad = publication(9, 9);
    bad.as_object_mut().unwrap().remove("facultyInvolved");
    let store = Arc::new(store_with(vec![publication(1, 1), bad]));

    let failing = ReportCompiler::new(store.clone(), ReportConfig::default());
    let err = failing.compile(&march()).await.unwrap_err();
    assert_eq!(err.code(), "RPT003");

    let skipping = ReportCompiler::new(
        store,
        ReportConfig::default().with_policy(MalformedRecordPolicy::Skip),
    );
    let report = skipping.compile(&march()).await.unwrap();
    assert_eq!(report.summary.publications, 1);
    assert_eq!(report.summary.skipped, 1);
    assert!(report.summary.to_header_json().contains(r#""skipped":1"#));
}

#[tokio::test]
async fn test_empty_faculty_lists_render() {
    let fixture = serde_json::json!({
        "publications": [
            {"title": "Unsigned Note", "facultyInvolved": [], "category": "Journal",
             "date": "2024-03-04", "published": true}
        ],
        "projects": [
            {"title": "Grant", "facultyInvolved": [], "industry": "DST",
             "amount": "5,00,000", "date": "2024-03-10", "published": true}
        ]
    });
    let store = MemoryRecordStore::from_json_str(&fixture.to_string()).unwrap();

    let report = compiler(store).compile(&march()).await.unwrap();
    assert_eq!(report.summary.total_items, 2);

    let outline = DeckOutline::from_bytes(&report.bytes).unwrap();
    assert_eq!(outline.slides[1].paragraphs, vec![". \"Unsigned Note\". Journal (2024)."]);
    assert_eq!(outline.slides[2].tables[0][1], vec!["Grant", "2024", "DST", "₹ 5,00,000", ""]);
}

#[tokio::test]
async fn test_control_characters_never_reach_slide_xml() {
    let mut pasted = publication(1, 5);
    pasted["title"] = serde_json::json!("Deep\u{b}Learning\u{c}at Scale");
    let store = store_with(vec![pasted]);

    let report = compiler(store).compile(&march()).await.unwrap();

    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(report.bytes.clone())).unwrap();
    for i in 0..archive.len() {
        let mut part = archive.by_index(i).unwrap();
        if !part.name().ends_with(".xml") {
            continue;
        }
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut part, &mut xml).unwrap();
        assert!(
            !xml.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')),
            "{} holds a control character",
            part.name()
        );
    }

    let outline = DeckOutline::from_bytes(&report.bytes).unwrap();
    assert!(outline.slides[1].paragraphs[0].contains("\"Deep Learning at Scale\""));
}

/// Store whose lecture query fails
struct BrokenLectures;

#[async_trait]
impl RecordStore for BrokenLectures {
    async fn find_publications(&self, _: &DateRange) -> portal_records::Result<Vec<Publication>> {
        Ok(Vec::new())
    }

    async fn find_projects(&self, _: &DateRange) -> portal_records::Result<Vec<Project>> {
        Ok(Vec::new())
    }

    async fn find_lectures(&self, _: &DateRange) -> portal_records::Result<Vec<Lecture>> {
        Err(RecordError::unavailable("server selection timeout"))
    }

    async fn find_workshops(&self, _: &DateRange) -> portal_records::Result<Vec<OrganizedEvent>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_fetch_failure_yields_no_report() {
    let compiler = ReportCompiler::new(Arc::new(BrokenLectures), ReportConfig::default());
    let err = compiler.generate(&march()).await.unwrap_err();

    assert_eq!(err.code(), "RPT002");
    assert!(!err.is_client_error());
    assert!(err.to_string().contains("server selection timeout"));
}
