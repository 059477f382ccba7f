//! Range Boundary Tests
//!
//! Checks inclusive range edges across all four collections of a fixture.

use portal_records::{DateRange, MemoryRecordStore, RecordStore};

const FIXTURE: &str = r#"{
    "publications": [
        {"title": "First instant", "date": "2024-03-01T00:00:00.000Z", "published": true},
        {"title": "Last millisecond", "date": "2024-03-31T23:59:59.999Z", "published": true},
        {"title": "Next day", "date": "2024-04-01T00:00:00.000Z", "published": true}
    ],
    "projects": [
        {"title": "Grant", "industry": "DST", "amount": 500000, "date": "2024-03-15", "published": true},
        {"title": "Unpublished grant", "date": "2024-03-15", "published": false}
    ],
    "lecturesDelivered": [
        {"title": "Talk", "institution": "IIT", "startDate": "", "date": "2024-03-31", "published": true}
    ],
    "organizedEvents": [
        {"title": "FDP", "category": "Workshops", "venue": "Hall", "date": "2024-02-29", "published": true},
        {"title": "Symposium", "category": "Conferences", "venue": "Hall", "date": "2024-03-05", "published": true}
    ]
}"#;

fn march() -> DateRange {
    DateRange::parse("2024-03-01", "2024-03-31").unwrap()
}

#[tokio::test]
async fn test_both_edges_are_inclusive() {
    let store = MemoryRecordStore::from_json_str(FIXTURE).unwrap();
    let titles: Vec<String> = store
        .find_publications(&march())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();

    assert_eq!(titles, vec!["First instant", "Last millisecond"]);
}

#[tokio::test]
async fn test_each_collection_filtered() {
    let store = MemoryRecordStore::from_json_str(FIXTURE).unwrap();
    let range = march();

    let projects = store.find_projects(&range).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].amount, "500000");

    let lectures = store.find_lectures(&range).await.unwrap();
    assert_eq!(lectures.len(), 1);
    assert!(lectures[0].start_date.is_none());

    assert!(store.find_workshops(&range).await.unwrap().is_empty());

    let leap_day = DateRange::parse("2024-02-29", "2024-02-29").unwrap();
    assert_eq!(store.find_workshops(&leap_day).await.unwrap().len(), 1);
}

#[test]
fn test_missing_required_field_fails_load() {
    let err = MemoryRecordStore::from_json_str(r#"{"projects": [{"title": "No date", "published": true}]}"#)
        .unwrap_err();
    assert_eq!(err.code(), "REC005");
}
