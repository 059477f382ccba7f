//! Deck synthesis: title, per-category sections and closing slide.

use portal_pptx::{
    BoxContent, Deck, ListContent, ListItem, Slide, SlideContent, TableContent,
};
use portal_records::{DateRange, Faculty};
use tracing::warn;

use crate::citation::{
    format_lecture, format_workshop, project_row, publication_item, render_problem,
};
use crate::config::{MalformedRecordPolicy, ReportConfig};
use crate::error::{ReportError, Result};
use crate::fetch::ReportRecords;
use crate::period::report_subtitle;
use crate::summary::ReportSummary;

/// Citations per itemized slide
pub const ITEMS_PER_SLIDE: usize = 4;

/// Appended to the section title on every slide after the first
pub const CONTINUED_SUFFIX: &str = " (continued)";

pub const PUBLICATIONS_TITLE: &str = "Publications";
pub const PROJECTS_TITLE: &str = "Projects";
pub const LECTURES_TITLE: &str = "Lectures Delivered";
pub const WORKSHOPS_TITLE: &str = "Workshops Organized";
pub const CLOSING_TITLE: &str = "Ongoing Activities";

pub const PROJECT_COLUMNS: [&str; 5] = ["Title", "Duration", "Funding Agency", "Amount", "Coordinators"];

/// Deck plus the counts that went into it
#[derive(Debug, Clone)]
pub struct BuiltDeck {
    pub deck: Deck,
    pub summary: ReportSummary,
}

/// Assemble the report deck from fetched records
pub fn build_deck(config: &ReportConfig, range: &DateRange, records: &ReportRecords) -> Result<BuiltDeck> {
    let policy = config.malformed_records;
    let mut skipped = 0;

    let publications = screen("publications", &records.publications, policy, &mut skipped, |p| {
        (&p.title, p.faculty_involved.as_deref())
    })?;
    let projects = screen("projects", &records.projects, policy, &mut skipped, |p| {
        (&p.title, p.faculty_involved.as_deref())
    })?;
    let lectures = screen("lectures", &records.lectures, policy, &mut skipped, |l| {
        (&l.title, l.faculty_involved.as_deref())
    })?;
    let workshops = screen("workshops", &records.workshops, policy, &mut skipped, |w| {
        (&w.title, w.faculty_involved.as_deref())
    })?;

    let title = config.report_title();
    let mut deck = Deck::with_title(title.clone()).with_author(config.department.name.clone());

    deck.push(Slide::title_slide(0, title, Some(report_subtitle(range))));

    push_itemized(
        &mut deck,
        PUBLICATIONS_TITLE,
        publications.iter().map(|p| publication_item(p)).collect(),
    );

    if !projects.is_empty() {
        let mut table = TableContent::with_header(PROJECT_COLUMNS).with_col_widths(vec![4, 1, 2, 2, 3]);
        for project in &projects {
            table.push_row(project_row(project, &config.currency_symbol));
        }
        deck.push(Slide::content_slide(0, PROJECTS_TITLE).with_content(SlideContent::Table(table)));
    }

    push_itemized(
        &mut deck,
        LECTURES_TITLE,
        lectures.iter().map(|l| ListItem::simple(format_lecture(l))).collect(),
    );
    push_itemized(
        &mut deck,
        WORKSHOPS_TITLE,
        workshops.iter().map(|w| ListItem::simple(format_workshop(w))).collect(),
    );

    deck.push(closing_slide(config));

    let summary = ReportSummary::new(publications.len(), projects.len(), lectures.len(), workshops.len())
        .with_skipped(skipped);

    Ok(BuiltDeck { deck, summary })
}

/// Apply the malformed-record policy to one collection
fn screen<'a, T>(
    collection: &'static str,
    items: &'a [T],
    policy: MalformedRecordPolicy,
    skipped: &mut usize,
    fields: impl Fn(&'a T) -> (&'a String, Option<&'a [Faculty]>),
) -> Result<Vec<&'a T>> {
    let mut kept = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let (title, faculty) = fields(item);
        match (render_problem(faculty), policy) {
            (None, _) => kept.push(item),
            (Some(problem), MalformedRecordPolicy::Fail) => {
                return Err(ReportError::synthesis(
                    collection,
                    format!("record {} ({}): {}", index + 1, title.trim(), problem),
                ));
            }
            (Some(problem), MalformedRecordPolicy::Skip) => {
                warn!(collection, index, title = title.as_str(), problem, "Skipping malformed record");
                *skipped += 1;
            }
        }
    }

    Ok(kept)
}

/// Emit `ceil(n / ITEMS_PER_SLIDE)` slides; nothing for an empty section
fn push_itemized(deck: &mut Deck, section: &str, items: Vec<ListItem>) {
    for (page, chunk) in items.chunks(ITEMS_PER_SLIDE).enumerate() {
        let title = if page == 0 {
            section.to_string()
        } else {
            format!("{}{}", section, CONTINUED_SUFFIX)
        };
        let list = ListContent {
            items: chunk.to_vec(),
        };
        deck.push(Slide::content_slide(0, title).with_content(SlideContent::BulletList(list)));
    }
}

/// Numbered ongoing-activities list over a branding band
fn closing_slide(config: &ReportConfig) -> Slide {
    let (width, height) = config.deck.slide_size();
    let margin = 457_200;
    let band_height = 548_640;

    let branding = BoxContent::new(
        config.department.name.clone(),
        (margin, height - band_height - margin / 2),
        (width - 2 * margin, band_height),
    );

    Slide::content_slide(0, CLOSING_TITLE)
        .with_content(SlideContent::NumberedList(ListContent::from_texts(
            config.ongoing_activities.iter().cloned(),
        )))
        .with_content(SlideContent::Box(branding))
}
