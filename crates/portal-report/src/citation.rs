//! Single-line citation text for each record kind.

use chrono::Datelike;
use portal_pptx::{ListItem, TextContent, TextRun};
use portal_records::{Faculty, Lecture, OrganizedEvent, Project, Publication};

use crate::period::date_span;

/// Names joined with ", "
pub fn faculty_names(faculty: &[Faculty]) -> String {
    faculty
        .iter()
        .map(|f| f.name.trim())
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a record cannot be rendered, if it cannot.
///
/// Only a record without any faculty field is malformed. An empty list
/// renders as an empty author or coordinator segment.
pub fn render_problem(faculty: Option<&[Faculty]>) -> Option<&'static str> {
    match faculty {
        None => Some("faculty list is missing"),
        Some(_) => None,
    }
}

/// Citation pieces before the DOI: authors and title, journal, year
fn publication_parts(publication: &Publication) -> (String, &str, String) {
    let journal = publication
        .journal_name
        .as_deref()
        .map(str::trim)
        .filter(|j| !j.is_empty())
        .unwrap_or(publication.category.trim());
    let year = publication.year.unwrap_or_else(|| publication.date.year());

    (
        format!(
            "{}. \"{}\". ",
            faculty_names(publication.faculty()),
            publication.title.trim()
        ),
        journal,
        format!(" ({}).", year),
    )
}

fn publication_doi(publication: &Publication) -> Option<&str> {
    publication
        .doi
        .as_deref()
        .map(str::trim)
        .filter(|doi| !doi.is_empty())
}

/// `{authors}. "{title}". {journal} ({year}). DOI: {doi}.`
pub fn format_publication(publication: &Publication) -> String {
    let (lead, journal, year) = publication_parts(publication);
    let head = format!("{}{}{}", lead, journal, year);
    match publication_doi(publication) {
        Some(doi) => format!("{} DOI: {}.", head, doi),
        None => head,
    }
}

/// Publication citation with the journal in italics and the DOI as a hyperlink
pub fn publication_item(publication: &Publication) -> ListItem {
    let (lead, journal, year) = publication_parts(publication);
    let mut runs = vec![TextRun::plain(lead), TextRun::italic(journal)];
    match publication_doi(publication) {
        Some(doi) => runs.extend([
            TextRun::plain(format!("{} DOI: ", year)),
            TextRun::link(doi, doi_url(doi)),
            TextRun::plain("."),
        ]),
        None => runs.push(TextRun::plain(year)),
    }

    ListItem {
        content: TextContent::from_runs(runs),
        level: 0,
    }
}

/// Resolver URL for a DOI (URLs pass through)
pub fn doi_url(doi: &str) -> String {
    if doi.starts_with("http://") || doi.starts_with("https://") {
        doi.to_string()
    } else {
        format!("https://doi.org/{}", doi)
    }
}

/// `{faculty} delivered a lecture on "{title}" at {institution} ({dates}).`
pub fn format_lecture(lecture: &Lecture) -> String {
    format!(
        "{} delivered a lecture on \"{}\" at {} ({}).",
        faculty_names(lecture.faculty()),
        lecture.title.trim(),
        lecture.institution.trim(),
        date_span(lecture.start_date.as_ref(), lecture.end_date.as_ref(), &lecture.date)
    )
}

/// `"{title}" organized by {faculty} at {venue} ({dates}).`
pub fn format_workshop(workshop: &OrganizedEvent) -> String {
    format!(
        "\"{}\" organized by {} at {} ({}).",
        workshop.title.trim(),
        faculty_names(workshop.faculty()),
        workshop.venue.trim(),
        date_span(workshop.start_date.as_ref(), workshop.end_date.as_ref(), &workshop.date)
    )
}

/// Amount with the currency prefix; empty amounts stay empty
pub fn format_amount(amount: &str, currency_symbol: &str) -> String {
    let amount = amount.trim();
    if amount.is_empty() {
        String::new()
    } else {
        format!("{} {}", currency_symbol, amount)
    }
}

/// Projects table row: Title, Duration, Funding Agency, Amount, Coordinators
pub fn project_row(project: &Project, currency_symbol: &str) -> Vec<String> {
    vec![
        project.title.trim().to_string(),
        project.date.year().to_string(),
        project.industry.trim().to_string(),
        format_amount(&project.amount, currency_symbol),
        faculty_names(project.faculty()),
    ]
}
