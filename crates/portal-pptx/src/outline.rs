//! Read the text outline back out of a PPTX package.
//!
//! Used by the `inspect` command and by tests that assert on generated
//! decks without depending on the exact XML the writer emits.

use crate::error::{PptxError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::ZipArchive;

/// Text content of one slide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlideOutline {
    /// 1-based position in the deck
    pub number: usize,

    /// Text of the title placeholder
    pub title: Option<String>,

    /// Text of the subtitle placeholder
    pub subtitle: Option<String>,

    /// Non-empty paragraphs outside title/subtitle and tables, in order
    pub paragraphs: Vec<String>,

    /// Table rows (header included), one entry per table
    pub tables: Vec<Vec<Vec<String>>>,
}

/// Text outline of a whole deck
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeckOutline {
    pub slides: Vec<SlideOutline>,
}

impl DeckOutline {
    /// Read an outline from PPTX bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut numbers: Vec<usize> = archive
            .file_names()
            .filter_map(slide_number)
            .collect();
        numbers.sort_unstable();

        let mut slides = Vec::with_capacity(numbers.len());
        for number in numbers {
            let mut xml = String::new();
            archive
                .by_name(&format!("ppt/slides/slide{}.xml", number))?
                .read_to_string(&mut xml)?;
            let mut outline = parse_slide(&xml)?;
            outline.number = number;
            slides.push(outline);
        }

        if slides.is_empty() && archive.by_name("ppt/presentation.xml").is_err() {
            return Err(PptxError::invalid_package("missing ppt/presentation.xml"));
        }

        Ok(Self { slides })
    }

    /// Read an outline from a PPTX file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Titles of all slides, empty string for untitled ones
    pub fn titles(&self) -> Vec<&str> {
        self.slides
            .iter()
            .map(|s| s.title.as_deref().unwrap_or(""))
            .collect()
    }
}

/// `ppt/slides/slide12.xml` -> 12
fn slide_number(name: &str) -> Option<usize> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    None,
    Title,
    Subtitle,
    Body,
    Table,
}

/// Walk one slide part collecting text per container
fn parse_slide(xml: &str) -> Result<SlideOutline> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut outline = SlideOutline::default();
    let mut container = Container::None;
    let mut shape_paragraphs: Vec<String> = Vec::new();
    let mut table: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"p:sp" => {
                    container = Container::Body;
                    shape_paragraphs.clear();
                }
                b"p:graphicFrame" => {
                    container = Container::Table;
                    table.clear();
                }
                b"a:tr" => row.clear(),
                b"a:tc" => cell.clear(),
                b"a:p" => paragraph.clear(),
                b"a:t" => in_text = true,
                b"p:ph" => container = placeholder_kind(&e, container)?,
                _ => {}
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"p:ph" {
                    container = placeholder_kind(&e, container)?;
                }
            }
            Event::Text(e) => {
                if in_text {
                    let text = e
                        .unescape()
                        .map_err(|err| PptxError::invalid_package(err.to_string()))?;
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"a:p" => {
                    let text = paragraph.trim();
                    if container == Container::Table {
                        if !cell.is_empty() && !text.is_empty() {
                            cell.push(' ');
                        }
                        cell.push_str(text);
                    } else if !text.is_empty() {
                        shape_paragraphs.push(text.to_string());
                    }
                }
                b"a:tc" => row.push(std::mem::take(&mut cell)),
                b"a:tr" => table.push(std::mem::take(&mut row)),
                b"p:graphicFrame" => {
                    outline.tables.push(std::mem::take(&mut table));
                    container = Container::None;
                }
                b"p:sp" => {
                    let joined = shape_paragraphs.join(" ");
                    match container {
                        Container::Title => outline.title = Some(joined),
                        Container::Subtitle => outline.subtitle = Some(joined),
                        _ => outline.paragraphs.append(&mut shape_paragraphs),
                    }
                    container = Container::None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(outline)
}

/// Classify a `p:ph` element by its `type` attribute
fn placeholder_kind(e: &quick_xml::events::BytesStart<'_>, current: Container) -> Result<Container> {
    if current != Container::Body {
        return Ok(current);
    }
    for attr in e.attributes() {
        let attr = attr.map_err(|err| PptxError::invalid_package(err.to_string()))?;
        if attr.key.as_ref() == b"type" {
            return Ok(match attr.value.as_ref() {
                b"title" | b"ctrTitle" => Container::Title,
                b"subTitle" => Container::Subtitle,
                _ => Container::Body,
            });
        }
    }
    Ok(Container::Body)
}
