//! Activity record schemas.
//!
//! These mirror the documents the portal's management screens write. The
//! report pipeline only reads them. Field names follow the stored form
//! (camelCase, except `journal_name`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category value marking an organized event as a workshop
pub const WORKSHOP_CATEGORY: &str = "Workshops";

/// Common view over records that can appear in a report
pub trait Qualifying {
    /// Whether the record is marked for public/report inclusion
    fn is_published(&self) -> bool;

    /// The range-filter date
    fn date(&self) -> DateTime<Utc>;
}

/// A faculty member credited on a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
}

impl Faculty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            institute: None,
        }
    }
}

/// A journal or conference publication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub title: String,

    /// `None` when the document has no faculty field at all; an empty
    /// list is ordinary data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_involved: Option<Vec<Faculty>>,

    #[serde(default)]
    pub category: String,

    #[serde(rename = "journal_name", default, skip_serializing_if = "Option::is_none")]
    pub journal_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    pub published: bool,
}

/// A funded research or consultancy project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_involved: Option<Vec<Faculty>>,

    #[serde(default)]
    pub category: String,

    /// Funding agency
    #[serde(default)]
    pub industry: String,

    /// Sanctioned amount as entered, without currency symbol
    #[serde(default, deserialize_with = "text_or_number")]
    pub amount: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,

    pub published: bool,
}

/// An invited lecture delivered by faculty at another institution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_involved: Option<Vec<Faculty>>,

    #[serde(default)]
    pub institution: String,

    #[serde(default, with = "flexible_date::option", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, with = "flexible_date::option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,

    pub published: bool,
}

/// An event organized by the department (workshops, conferences, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizedEvent {
    pub title: String,

    #[serde(default)]
    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_involved: Option<Vec<Faculty>>,

    #[serde(default, with = "flexible_date::option", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, with = "flexible_date::option", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub venue: String,

    #[serde(with = "flexible_date")]
    pub date: DateTime<Utc>,

    pub published: bool,
}

impl OrganizedEvent {
    /// Check if this event is a workshop
    pub fn is_workshop(&self) -> bool {
        self.category == WORKSHOP_CATEGORY
    }
}

macro_rules! impl_qualifying {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Qualifying for $ty {
                fn is_published(&self) -> bool {
                    self.published
                }

                fn date(&self) -> DateTime<Utc> {
                    self.date
                }
            }

            impl $ty {
                /// Credited faculty, empty when the field is absent
                pub fn faculty(&self) -> &[Faculty] {
                    self.faculty_involved.as_deref().unwrap_or_default()
                }
            }
        )*
    };
}

impl_qualifying!(Publication, Project, Lecture, OrganizedEvent);

/// All four collections, as stored in a JSON fixture
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordSet {
    pub publications: Vec<Publication>,
    pub projects: Vec<Project>,
    pub lectures_delivered: Vec<Lecture>,
    pub organized_events: Vec<OrganizedEvent>,
}

/// Accept a string or a bare JSON number, keeping the text
fn text_or_number<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
        Raw::Null => String::new(),
    })
}

/// Serde helpers for record dates.
///
/// Fixtures and older documents carry RFC 3339 timestamps or bare
/// `YYYY-MM-DD` text; MongoDB documents carry native BSON dates. Both
/// decode to UTC. Blank text counts as absent.
pub mod flexible_date {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Text(String),
        #[cfg(feature = "mongodb")]
        Native(mongodb::bson::DateTime),
    }

    impl Stored {
        fn into_datetime<E: Error>(self) -> Result<Option<DateTime<Utc>>, E> {
            match self {
                Stored::Text(text) if text.trim().is_empty() => Ok(None),
                Stored::Text(text) => crate::range::parse_datetime(&text)
                    .map(Some)
                    .map_err(E::custom),
                #[cfg(feature = "mongodb")]
                Stored::Native(native) => DateTime::from_timestamp_millis(native.timestamp_millis())
                    .map(Some)
                    .ok_or_else(|| E::custom("date out of range")),
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        Stored::deserialize(deserializer)?
            .into_datetime()?
            .ok_or_else(|| D::Error::custom("date is empty"))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<Stored>::deserialize(deserializer)? {
                Some(stored) => stored.into_datetime(),
                None => Ok(None),
            }
        }
    }
}
