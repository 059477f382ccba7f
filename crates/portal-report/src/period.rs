//! Human-readable report periods.

use chrono::{DateTime, Datelike, Utc};
use portal_records::DateRange;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Full English month name of a date
pub fn month_name(date: &DateTime<Utc>) -> &'static str {
    MONTHS[date.month0() as usize]
}

/// Title-slide subtitle for a range.
///
/// - same month: `"March 2024"`
/// - same year: `"January, March & March 2024"` (the end month appears twice)
/// - otherwise: `"December 2023 - February 2024"`
pub fn report_subtitle(range: &DateRange) -> String {
    let start = range.start();
    let end = range.end();

    if start.year() == end.year() {
        if start.month() == end.month() {
            format!("{} {}", month_name(&start), start.year())
        } else {
            format!(
                "{}, {} & {} {}",
                month_name(&start),
                month_name(&end),
                month_name(&end),
                start.year()
            )
        }
    } else {
        format!(
            "{} {} - {} {}",
            month_name(&start),
            start.year(),
            month_name(&end),
            end.year()
        )
    }
}

/// `"05 Mar 2024"`
pub fn short_date(date: &DateTime<Utc>) -> String {
    date.format("%d %b %Y").to_string()
}

/// `"05 Mar 2024"` or `"05 Mar 2024 - 07 Mar 2024"` when the days differ
pub fn date_span(start: Option<&DateTime<Utc>>, end: Option<&DateTime<Utc>>, fallback: &DateTime<Utc>) -> String {
    let start = start.unwrap_or(fallback);
    match end {
        Some(end) if end.date_naive() != start.date_naive() => {
            format!("{} - {}", short_date(start), short_date(end))
        }
        _ => short_date(start),
    }
}
