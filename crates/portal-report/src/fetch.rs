//! Concurrent retrieval of the four report collections.

use portal_records::{DateRange, Lecture, OrganizedEvent, Project, Publication, RecordStore};
use tracing::debug;

use crate::error::{ReportError, Result};

/// Qualifying records for one report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRecords {
    pub publications: Vec<Publication>,
    pub projects: Vec<Project>,
    pub lectures: Vec<Lecture>,
    pub workshops: Vec<OrganizedEvent>,
}

impl ReportRecords {
    pub fn total(&self) -> usize {
        self.publications.len() + self.projects.len() + self.lectures.len() + self.workshops.len()
    }
}

/// Run the four queries concurrently. The first failure aborts the join
/// and no records are returned.
pub async fn fetch_records(store: &dyn RecordStore, range: &DateRange) -> Result<ReportRecords> {
    let (publications, projects, lectures, workshops) = tokio::try_join!(
        async {
            store
                .find_publications(range)
                .await
                .map_err(|e| ReportError::fetch("publications", e))
        },
        async {
            store
                .find_projects(range)
                .await
                .map_err(|e| ReportError::fetch("projects", e))
        },
        async {
            store
                .find_lectures(range)
                .await
                .map_err(|e| ReportError::fetch("lectures", e))
        },
        async {
            store
                .find_workshops(range)
                .await
                .map_err(|e| ReportError::fetch("workshops", e))
        },
    )?;

    debug!(
        backend = store.backend_tag(),
        publications = publications.len(),
        projects = projects.len(),
        lectures = lectures.len(),
        workshops = workshops.len(),
        "Fetched qualifying records"
    );

    Ok(ReportRecords {
        publications,
        projects,
        lectures,
        workshops,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portal_records::{MemoryRecordStore, RecordError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails projects immediately; the others would take a long time
    struct FailingProjects {
        completed: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for FailingProjects {
        async fn find_publications(&self, _: &DateRange) -> portal_records::Result<Vec<Publication>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn find_projects(&self, _: &DateRange) -> portal_records::Result<Vec<Project>> {
            Err(RecordError::unavailable("connection reset"))
        }

        async fn find_lectures(&self, _: &DateRange) -> portal_records::Result<Vec<Lecture>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn find_workshops(&self, _: &DateRange) -> portal_records::Result<Vec<OrganizedEvent>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_first_failure_aborts_join() {
        let store = FailingProjects {
            completed: AtomicUsize::new(0),
        };
        let range = DateRange::parse("2024-01-01", "2024-12-31").unwrap();

        let err = fetch_records(&store, &range).await.unwrap_err();
        assert_eq!(err.code(), "RPT002");
        assert!(err.to_string().contains("projects"));
        assert_eq!(store.completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetches_all_collections() {
        let store = MemoryRecordStore::from_json_str(
            r#"{
                "publications": [{"title": "P", "date": "2024-02-01", "published": true}],
                "projects": [{"title": "Q", "date": "2024-02-02", "published": true}],
                "organizedEvents": [
                    {"title": "W", "category": "Workshops", "date": "2024-02-03", "published": true},
                    {"title": "C", "category": "Conferences", "date": "2024-02-03", "published": true}
                ]
            }"#,
        )
        .unwrap();
        let range = DateRange::parse("2024-02-01", "2024-02-29").unwrap();

        let records = fetch_records(&store, &range).await.unwrap();
        assert_eq!(records.publications.len(), 1);
        assert_eq!(records.projects.len(), 1);
        assert!(records.lectures.is_empty());
        assert_eq!(records.workshops.len(), 1);
        assert_eq!(records.total(), 3);
    }
}
