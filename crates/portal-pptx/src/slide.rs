//! Slide data structures and content types.
//!
//! This module defines the intermediate representation for slides, built by
//! the report compiler and consumed by the PPTX writer.

use serde::{Deserialize, Serialize};

/// A single slide in a presentation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    /// Slide number (1-based)
    pub number: u32,

    /// Slide title (displayed in title placeholder)
    pub title: Option<String>,

    /// Slide subtitle (title slides only)
    pub subtitle: Option<String>,

    /// Main slide content
    pub content: Vec<SlideContent>,

    /// Layout type hint
    pub layout_hint: SlideLayoutHint,
}

/// Hint for layout selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayoutHint {
    /// Title slide (centered, large text)
    Title,

    /// Standard title and content
    #[default]
    Content,
}

/// Content elements within a slide
#[derive(Debug, Clone, PartialEq)]
pub enum SlideContent {
    /// Unordered (bullet) list
    BulletList(ListContent),

    /// Ordered (numbered) list
    NumberedList(ListContent),

    /// Table
    Table(TableContent),

    /// Filled rectangle with centered text
    Box(BoxContent),
}

/// Text content with optional formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextContent {
    /// Text runs with inline formatting
    pub runs: Vec<TextRun>,
}

/// A run of text with consistent formatting
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The text content
    pub text: String,

    /// Bold formatting
    pub bold: bool,

    /// Italic formatting
    pub italic: bool,

    /// Hyperlink URL (if this is a link)
    pub link: Option<String>,
}

impl TextRun {
    /// Create a plain text run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
            link: None,
        }
    }

    /// Create a bold text run
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: true,
            ..Self::plain(text)
        }
    }

    /// Create an italic text run
    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            italic: true,
            ..Self::plain(text)
        }
    }

    /// Create a hyperlink text run
    pub fn link(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            link: Some(url.into()),
            ..Self::plain(text)
        }
    }
}

impl TextContent {
    /// Create text content from a single plain string
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
        }
    }

    /// Create text content from multiple runs
    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    /// Get the plain text without formatting
    pub fn as_plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// List content with items
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListContent {
    /// List items
    pub items: Vec<ListItem>,
}

impl ListContent {
    /// Build a flat list from plain strings
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: texts.into_iter().map(ListItem::simple).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single list item
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Item text content
    pub content: TextContent,

    /// Nesting level (0 = top level)
    pub level: u32,
}

impl ListItem {
    /// Create a simple list item
    pub fn simple(text: impl Into<String>) -> Self {
        Self {
            content: TextContent::plain(text),
            level: 0,
        }
    }
}

/// Table content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableContent {
    /// Header row
    pub header: Vec<String>,

    /// Body rows
    pub rows: Vec<Vec<String>>,

    /// Relative column widths; equal widths when empty
    pub col_widths: Vec<u32>,
}

impl TableContent {
    /// Create a table with a header row and no body
    pub fn with_header<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set relative column widths
    pub fn with_col_widths(mut self, widths: Vec<u32>) -> Self {
        self.col_widths = widths;
        self
    }

    /// Append a body row
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Number of columns (from the header)
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Total rows including the header row
    pub fn row_count(&self) -> usize {
        self.rows.len() + usize::from(!self.header.is_empty())
    }
}

/// Filled box with centered text
#[derive(Debug, Clone, PartialEq)]
pub struct BoxContent {
    /// Box text
    pub text: TextContent,

    /// Offset (x, y) in EMU
    pub position: (i64, i64),

    /// Size (width, height) in EMU
    pub size: (i64, i64),

    /// Fill color (hex RGB); contract accent color when absent
    pub fill: Option<String>,
}

impl BoxContent {
    pub fn new(text: impl Into<String>, position: (i64, i64), size: (i64, i64)) -> Self {
        Self {
            text: TextContent::from_runs(vec![TextRun::bold(text)]),
            position,
            size,
            fill: None,
        }
    }

    pub fn with_fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(color.into());
        self
    }
}

impl Slide {
    /// Create a title slide
    pub fn title_slide(number: u32, title: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            number,
            title: Some(title.into()),
            subtitle,
            layout_hint: SlideLayoutHint::Title,
            ..Default::default()
        }
    }

    /// Create a content slide
    pub fn content_slide(number: u32, title: impl Into<String>) -> Self {
        Self {
            number,
            title: Some(title.into()),
            layout_hint: SlideLayoutHint::Content,
            ..Default::default()
        }
    }

    /// Add content to the slide
    pub fn with_content(mut self, content: SlideContent) -> Self {
        self.content.push(content);
        self
    }

    /// Set the layout hint
    pub fn with_layout(mut self, hint: SlideLayoutHint) -> Self {
        self.layout_hint = hint;
        self
    }

    /// Check if this is a title slide
    pub fn is_title_slide(&self) -> bool {
        self.layout_hint == SlideLayoutHint::Title
    }

    /// Tables on this slide
    pub fn tables(&self) -> impl Iterator<Item = &TableContent> {
        self.content.iter().filter_map(|c| match c {
            SlideContent::Table(table) => Some(table),
            _ => None,
        })
    }

    /// Items of all lists on this slide, in order
    pub fn list_items(&self) -> impl Iterator<Item = &ListItem> {
        self.content.iter().flat_map(|c| match c {
            SlideContent::BulletList(list) | SlideContent::NumberedList(list) => list.items.iter(),
            _ => [].iter(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_title_slide() {
        let slide = Slide::title_slide(1, "Welcome", Some("March 2024".to_string()));

        assert_eq!(slide.number, 1);
        assert_eq!(slide.title, Some("Welcome".to_string()));
        assert_eq!(slide.subtitle, Some("March 2024".to_string()));
        assert!(slide.is_title_slide());
    }

    #[test]
    fn test_create_content_slide() {
        let slide = Slide::content_slide(2, "Publications")
            .with_content(SlideContent::BulletList(ListContent::from_texts(["First", "Second"])));

        assert_eq!(slide.number, 2);
        assert!(!slide.is_title_slide());
        assert_eq!(slide.list_items().count(), 2);
    }

    #[test]
    fn test_text_runs() {
        let run = TextRun::bold("important");
        assert!(run.bold);
        assert!(!run.italic);

        let run = TextRun::link("doi", "https://doi.org/10.1000/1");
        assert_eq!(run.link.as_deref(), Some("https://doi.org/10.1000/1"));
    }

    #[test]
    fn test_text_content() {
        let content = TextContent::from_runs(vec![
            TextRun::plain("Hello "),
            TextRun::bold("world"),
            TextRun::plain("!"),
        ]);

        assert_eq!(content.as_plain_text(), "Hello world!");
    }

    #[test]
    fn test_table_row_count_includes_header() {
        let mut table = TableContent::with_header(["Title", "Amount"]);
        assert_eq!(table.row_count(), 1);

        table.push_row(vec!["Grid".to_string(), "₹ 10".to_string()]);
        table.push_row(vec!["Edge".to_string(), "₹ 20".to_string()]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);

        let slide = Slide::content_slide(3, "Projects").with_content(SlideContent::Table(table));
        assert_eq!(slide.tables().count(), 1);
    }

    #[test]
    fn test_box_content() {
        let branding = BoxContent::new("Department of CSE", (0, 0), (100, 100)).with_fill("1F3864");
        assert_eq!(branding.fill.as_deref(), Some("1F3864"));
        assert!(branding.text.runs[0].bold);
    }
}
