//! Inclusive report date ranges.
//!
//! Dates arrive as ISO 8601 text, either a bare calendar date (`2024-03-31`)
//! or a full timestamp. A bare end date covers the whole day.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::{RecordError, Result};
use crate::model::Qualifying;

/// Inclusive `[start, end]` window over record dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Create a range from two instants
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(RecordError::InvalidRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from request text
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_instant(start, Bound::Start)?;
        let end = parse_instant(end, Bound::End)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Check whether an instant falls inside the range
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant <= self.end
    }

    /// Published and dated within the range
    pub fn qualifies<T: Qualifying>(&self, record: &T) -> bool {
        record.is_published() && self.contains(&record.date())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

fn parse_instant(value: &str, bound: Bound) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let time = match bound {
            Bound::Start => NaiveTime::MIN,
            Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                .ok_or_else(|| RecordError::invalid_date(value))?,
        };
        return Ok(date.and_time(time).and_utc());
    }
    parse_datetime(value)
}

/// Parse a timestamp or bare date into UTC (bare dates map to midnight)
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(RecordError::invalid_date(value))
}
