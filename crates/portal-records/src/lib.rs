//! # portal-records
//!
//! Read-side access to the activity portal's record collections.
//!
//! The report pipeline consumes four collections (publications, projects,
//! lectures delivered and organized events). This crate defines explicit
//! schemas for them, the inclusive [`DateRange`] used to select qualifying
//! records, and the [`RecordStore`] seam with two implementations:
//!
//! - [`MemoryRecordStore`]: a JSON fixture held in memory
//! - `MongoRecordStore`: the portal's MongoDB database (feature `mongodb`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use portal_records::{DateRange, MemoryRecordStore, RecordStore};
//!
//! let store = MemoryRecordStore::from_json_file("records.json")?;
//! let range = DateRange::parse("2024-01-01", "2024-03-31")?;
//! let publications = store.find_publications(&range).await?;
//! ```

pub mod error;
pub mod model;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod range;
pub mod store;

// Re-exports
pub use error::{RecordError, Result};
pub use model::{
    Faculty, Lecture, OrganizedEvent, Project, Publication, Qualifying, RecordSet,
    WORKSHOP_CATEGORY,
};
#[cfg(feature = "mongodb")]
pub use mongo::{CollectionNames, MongoRecordStore};
pub use range::DateRange;
pub use store::{MemoryRecordStore, RecordStore};
