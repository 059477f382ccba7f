//! MongoDB-backed record store.
//!
//! Collections are opened typed (`Collection<Publication>` and so on) and
//! the driver decodes documents through the serde schemas in
//! [`crate::model`]. The range filter compares `date` against BSON dates,
//! so the `date` field must be stored as a native date; documents holding
//! it as text never match a query. `startDate`/`endDate` may be either.

use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::error::ErrorKind;
use mongodb::options::FindOptions;
use mongodb::{Client, Database};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use async_trait::async_trait;

use crate::error::{RecordError, Result};
use crate::model::{Lecture, OrganizedEvent, Project, Publication, WORKSHOP_CATEGORY};
use crate::range::DateRange;
use crate::store::RecordStore;

/// Collection names for each record kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub publications: String,
    pub projects: String,
    pub lectures: String,
    pub organized_events: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            publications: "publications".to_string(),
            projects: "projects".to_string(),
            lectures: "lecturesdelivereds".to_string(),
            organized_events: "organizedevents".to_string(),
        }
    }
}

/// Record store reading from a MongoDB database
#[derive(Debug, Clone)]
pub struct MongoRecordStore {
    db: Database,
    collections: CollectionNames,
}

impl MongoRecordStore {
    /// Connect to a MongoDB deployment
    pub async fn connect(uri: &str, database: &str, collections: CollectionNames) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        tracing::info!(database, "connected to record store");
        Ok(Self::with_database(client.database(database), collections))
    }

    pub fn with_database(db: Database, collections: CollectionNames) -> Self {
        Self { db, collections }
    }

    /// Run a filtered query, oldest first
    async fn find<T>(&self, collection: &str, filter: Document) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let cursor = self
            .db
            .collection::<T>(collection)
            .find(filter, date_order())
            .await?;
        let records: Vec<T> = cursor
            .try_collect()
            .await
            .map_err(|err| decode_error(collection, err))?;
        tracing::debug!(collection, count = records.len(), "query finished");
        Ok(records)
    }
}

fn date_order() -> FindOptions {
    FindOptions::builder().sort(doc! { "date": 1 }).build()
}

/// Schema mismatches name the collection; everything else stays a driver error
fn decode_error(collection: &str, err: mongodb::error::Error) -> RecordError {
    match err.kind.as_ref() {
        ErrorKind::BsonDeserialization(inner) => RecordError::invalid_document(collection, inner.to_string()),
        _ => err.into(),
    }
}

/// `published == true AND date ∈ [start, end]`
pub fn qualifying_filter(range: &DateRange) -> Document {
    doc! {
        "published": true,
        "date": {
            "$gte": BsonDateTime::from_millis(range.start().timestamp_millis()),
            "$lte": BsonDateTime::from_millis(range.end().timestamp_millis()),
        },
    }
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    fn backend_tag(&self) -> &'static str {
        "mongodb"
    }

    async fn find_publications(&self, range: &DateRange) -> Result<Vec<Publication>> {
        self.find(&self.collections.publications, qualifying_filter(range)).await
    }

    async fn find_projects(&self, range: &DateRange) -> Result<Vec<Project>> {
        self.find(&self.collections.projects, qualifying_filter(range)).await
    }

    async fn find_lectures(&self, range: &DateRange) -> Result<Vec<Lecture>> {
        self.find(&self.collections.lectures, qualifying_filter(range)).await
    }

    async fn find_workshops(&self, range: &DateRange) -> Result<Vec<OrganizedEvent>> {
        let mut filter = qualifying_filter(range);
        filter.insert("category", WORKSHOP_CATEGORY);
        self.find(&self.collections.organized_events, filter).await
    }
}
