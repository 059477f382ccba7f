//! Package Coverage Tests
//!
//! Checks the structure of generated packages across contracts, beyond the
//! inline writer tests.

use std::io::{Cursor, Read};

use portal_pptx::constants::{PPTX_MIME_TYPE, WIDESCREEN_SLIDE_WIDTH_EMU};
use portal_pptx::{
    Deck, DeckOutline, ListContent, PptxWriter, Slide, SlideContent, SlideContract, TableContent,
};
use tempfile::TempDir;
use zip::ZipArchive;

fn part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

fn report_like_deck() -> Deck {
    let mut deck = Deck::with_title("CSE Activity Report").with_author("Department of CSE");
    deck.push(Slide::title_slide(0, "CSE Activity Report", Some("January, March & March 2024".into())));
    deck.push(
        Slide::content_slide(0, "Publications")
            .with_content(SlideContent::BulletList(ListContent::from_texts(["P1", "P2", "P3", "P4"]))),
    );
    deck.push(
        Slide::content_slide(0, "Publications (continued)")
            .with_content(SlideContent::BulletList(ListContent::from_texts(["P5"]))),
    );

    let mut table = TableContent::with_header(["Title", "Faculty", "Agency", "Amount"]);
    for i in 0..12 {
        table.push_row(vec![format!("Project {}", i), "A. Rao".into(), "DST".into(), "₹ 1".into()]);
    }
    deck.push(Slide::content_slide(0, "Projects").with_content(SlideContent::Table(table)));
    deck.push(Slide::title_slide(0, "Thank You", Some("Department of CSE".into())));
    deck
}

#[test]
fn test_every_slide_has_parts_and_overrides() {
    let deck = report_like_deck();
    let bytes = PptxWriter::from_deck(SlideContract::default(), &deck)
        .generate()
        .unwrap();

    let content_types = part(&bytes, "[Content_Types].xml");
    let presentation = part(&bytes, "ppt/presentation.xml");
    let rels = part(&bytes, "ppt/_rels/presentation.xml.rels");

    for i in 1..=deck.len() {
        assert!(content_types.contains(&format!("/ppt/slides/slide{}.xml", i)));
        assert!(rels.contains(&format!("slides/slide{}.xml", i)));
        assert!(presentation.contains(&format!("r:id=\"rId{}\"", i + 3)));
    }
    assert_eq!(presentation.matches("<p:sldId ").count(), deck.len());

    let app = part(&bytes, "docProps/app.xml");
    assert!(app.contains("<Slides>5</Slides>"));
}

#[test]
fn test_outline_matches_deck() {
    let deck = report_like_deck();
    let bytes = PptxWriter::from_deck(SlideContract::default(), &deck)
        .generate()
        .unwrap();

    let outline = DeckOutline::from_bytes(&bytes).unwrap();
    assert_eq!(
        outline.titles(),
        vec![
            "CSE Activity Report",
            "Publications",
            "Publications (continued)",
            "Projects",
            "Thank You"
        ]
    );
    assert_eq!(outline.slides[0].subtitle.as_deref(), Some("January, March & March 2024"));
    assert_eq!(outline.slides[1].paragraphs.len(), 4);

    // One table, never paginated
    let tables = &outline.slides[3].tables;
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].len(), 13);
}

#[test]
fn test_widescreen_contract_changes_slide_size() {
    let contract = SlideContract::parse("[meta]\nwidescreen = true\nlocale = \"en-IN\"\n").unwrap();
    let bytes = PptxWriter::from_deck(contract, &report_like_deck())
        .generate()
        .unwrap();

    let presentation = part(&bytes, "ppt/presentation.xml");
    assert!(presentation.contains(&format!("cx=\"{}\"", WIDESCREEN_SLIDE_WIDTH_EMU)));

    let slide = part(&bytes, "ppt/slides/slide2.xml");
    assert!(slide.contains("lang=\"en-IN\""));
}

#[test]
fn test_save_and_read_back_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.pptx");

    PptxWriter::from_deck(SlideContract::default(), &report_like_deck())
        .save(&path)
        .unwrap();

    let outline = DeckOutline::from_file(&path).unwrap();
    assert_eq!(outline.len(), 5);
    assert!(PPTX_MIME_TYPE.ends_with("presentationml.presentation"));
}
