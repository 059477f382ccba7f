//! Record store abstraction and the in-memory implementation.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Lecture, OrganizedEvent, Project, Publication, RecordSet};
use crate::range::DateRange;

/// Find-by-filter access to the four report collections.
///
/// Every query returns only qualifying records: `published == true` and
/// `date` inside the range. `find_workshops` further restricts organized
/// events to the "Workshops" category.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name for logs
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn find_publications(&self, range: &DateRange) -> Result<Vec<Publication>>;

    async fn find_projects(&self, range: &DateRange) -> Result<Vec<Project>>;

    async fn find_lectures(&self, range: &DateRange) -> Result<Vec<Lecture>>;

    async fn find_workshops(&self, range: &DateRange) -> Result<Vec<OrganizedEvent>>;
}

/// Store backed by an in-memory [`RecordSet`], typically loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: RecordSet,
}

impl MemoryRecordStore {
    pub fn new(records: RecordSet) -> Self {
        Self { records }
    }

    /// Load a fixture from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a fixture from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }
}

fn qualifying<T: Clone + crate::model::Qualifying>(items: &[T], range: &DateRange) -> Vec<T> {
    items
        .iter()
        .filter(|item| range.qualifies(*item))
        .cloned()
        .collect()
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn find_publications(&self, range: &DateRange) -> Result<Vec<Publication>> {
        Ok(qualifying(&self.records.publications, range))
    }

    async fn find_projects(&self, range: &DateRange) -> Result<Vec<Project>> {
        Ok(qualifying(&self.records.projects, range))
    }

    async fn find_lectures(&self, range: &DateRange) -> Result<Vec<Lecture>> {
        Ok(qualifying(&self.records.lectures_delivered, range))
    }

    async fn find_workshops(&self, range: &DateRange) -> Result<Vec<OrganizedEvent>> {
        Ok(qualifying(&self.records.organized_events, range)
            .into_iter()
            .filter(OrganizedEvent::is_workshop)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "publications": [
            {"title": "In range", "date": "2024-03-10", "published": true},
            {"title": "Draft", "date": "2024-03-11", "published": false},
            {"title": "Too early", "date": "2023-12-31", "published": true}
        ],
        "organizedEvents": [
            {"title": "Rust Workshop", "category": "Workshops", "date": "2024-03-02", "published": true},
            {"title": "Guest Seminar", "category": "Seminars", "date": "2024-03-03", "published": true}
        ]
    }"#;

    #[tokio::test]
    async fn test_only_published_in_range() {
        let store = MemoryRecordStore::from_json_str(FIXTURE).unwrap();
        let range = DateRange::parse("2024-01-01", "2024-03-31").unwrap();

        let publications = store.find_publications(&range).await.unwrap();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].title, "In range");
    }

    #[tokio::test]
    async fn test_workshops_filtered_by_category() {
        let store = MemoryRecordStore::from_json_str(FIXTURE).unwrap();
        let range = DateRange::parse("2024-03-01", "2024-03-31").unwrap();

        let workshops = store.find_workshops(&range).await.unwrap();
        assert_eq!(workshops.len(), 1);
        assert_eq!(workshops[0].title, "Rust Workshop");
        assert!(store.find_projects(&range).await.unwrap().is_empty());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let store = MemoryRecordStore::from_json_file(&path).unwrap();
        assert_eq!(store.records().publications.len(), 3);
        assert_eq!(store.backend_tag(), "memory");
    }
}
