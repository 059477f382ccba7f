//! # portal-pptx
//!
//! PowerPoint (PPTX) generation for activity reports.
//!
//! Slides are described with the types in [`slide`], collected into a
//! [`Deck`] and serialized by [`PptxWriter`]. Styling (fonts, table colors,
//! branding) comes from a TOML [`SlideContract`]. [`DeckOutline`] reads the
//! text back out of a generated package.
//!
//! ## Example
//!
//! ```rust,ignore
//! use portal_pptx::{Deck, PptxWriter, Slide, SlideContract};
//!
//! let mut deck = Deck::with_title("CSE Activity Report");
//! deck.push(Slide::title_slide(1, "CSE Activity Report", Some("March 2024".into())));
//!
//! let bytes = PptxWriter::from_deck(SlideContract::default(), &deck).generate()?;
//! std::fs::write("report.pptx", bytes)?;
//! ```

pub mod deck;
pub mod error;
pub mod outline;
pub mod slide;
pub mod slide_contract;
pub mod writer;

// Re-exports
pub use deck::Deck;
pub use error::{PptxError, Result};
pub use outline::{DeckOutline, SlideOutline};
pub use slide::{
    BoxContent, ListContent, ListItem, Slide, SlideContent, SlideLayoutHint, TableContent,
    TextContent, TextRun,
};
pub use slide_contract::SlideContract;
pub use writer::PptxWriter;

/// PPTX-related constants
pub mod constants {
    /// MIME type of a PPTX package
    pub const PPTX_MIME_TYPE: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation";

    /// Default slide width in EMU (914400 EMU = 1 inch, standard 10" width)
    pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;

    /// Default slide height in EMU (standard 7.5" height for 4:3)
    pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// Widescreen 16:9 slide width in EMU (13.333" width)
    pub const WIDESCREEN_SLIDE_WIDTH_EMU: i64 = 12_192_000;

    /// Widescreen 16:9 slide height in EMU (7.5" height)
    pub const WIDESCREEN_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// EMU per point
    pub const EMU_PER_POINT: i64 = 12_700;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// DrawingML table graphic data URI
    pub const NS_TABLE: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";

    /// Relationships namespace (r: prefix inside parts)
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Package relationships namespace (.rels parts)
    pub const NS_PACKAGE_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Hyperlink relationship type
    pub const REL_TYPE_HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
}
