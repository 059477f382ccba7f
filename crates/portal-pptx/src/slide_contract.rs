//! SlideContract configuration for PPTX generation.
//!
//! SlideContract fixes the layout indices, fonts and colors used by the
//! writer. It is loaded from the `[deck]` table of the service config or
//! from a standalone TOML file.

use crate::error::{PptxError, Result};
use crate::slide::SlideLayoutHint;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Number of slide layouts the writer emits
pub const LAYOUT_COUNT: u32 = 2;

/// SlideContract configuration for PPTX generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideContract {
    /// Metadata about the contract
    #[serde(default)]
    pub meta: ContractMeta,

    /// Layout index mappings
    #[serde(default)]
    pub layouts: LayoutMappings,

    /// Font families and sizes
    #[serde(default)]
    pub fonts: FontConfig,

    /// Table styling
    #[serde(default)]
    pub table: TableConfig,

    /// Branding box styling
    #[serde(default)]
    pub branding: BrandingConfig,
}

/// Contract metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractMeta {
    /// Display name (also used as the theme name)
    #[serde(default = "default_name")]
    pub name: String,

    /// Locale code (e.g., "en-US", "en-IN")
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Application name recorded in docProps/app.xml
    #[serde(default = "default_application")]
    pub application: String,

    /// Use the 16:9 slide size instead of 4:3
    #[serde(default)]
    pub widescreen: bool,
}

fn default_name() -> String {
    "Activity Report".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_application() -> String {
    "portal-report".to_string()
}

/// Layout index mappings (1-based indices matching slideLayoutN.xml)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMappings {
    /// Title Slide layout (centered title)
    #[serde(default = "default_title_layout")]
    pub title: u32,

    /// Title and Content layout
    #[serde(default = "default_content_layout")]
    pub content: u32,
}

fn default_title_layout() -> u32 {
    1
}
fn default_content_layout() -> u32 {
    2
}

/// Font configuration (sizes in points)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_heading_font")]
    pub heading: String,

    #[serde(default = "default_body_font")]
    pub body: String,

    #[serde(default = "default_title_size")]
    pub title_size: u32,

    #[serde(default = "default_heading_size")]
    pub heading_size: u32,

    #[serde(default = "default_body_size")]
    pub body_size: u32,
}

fn default_heading_font() -> String {
    "Calibri Light".to_string()
}
fn default_body_font() -> String {
    "Calibri".to_string()
}
fn default_title_size() -> u32 {
    40
}
fn default_heading_size() -> u32 {
    28
}
fn default_body_size() -> u32 {
    14
}

/// Table styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Header background color (hex RGB)
    #[serde(default = "default_table_header_bg")]
    pub header_background: String,

    /// Header text color (hex RGB)
    #[serde(default = "default_table_header_text")]
    pub header_text_color: String,

    /// Row background color (hex RGB)
    #[serde(default = "default_table_row_bg")]
    pub row_background: String,

    /// Alternating row background color (hex RGB)
    #[serde(default = "default_table_alt_row_bg")]
    pub alt_row_background: String,

    /// Font size in points
    #[serde(default = "default_table_font_size")]
    pub font_size: u32,

    /// Row height in EMU
    #[serde(default = "default_table_row_height")]
    pub row_height: i64,
}

fn default_table_header_bg() -> String {
    "2563EB".to_string()
}
fn default_table_header_text() -> String {
    "FFFFFF".to_string()
}
fn default_table_row_bg() -> String {
    "FFFFFF".to_string()
}
fn default_table_alt_row_bg() -> String {
    "F3F4F6".to_string()
}
fn default_table_font_size() -> u32 {
    11
}
fn default_table_row_height() -> i64 {
    370_840
}

/// Branding box styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Default fill color (hex RGB)
    #[serde(default = "default_brand_fill")]
    pub fill_color: String,

    /// Text color (hex RGB)
    #[serde(default = "default_brand_text")]
    pub text_color: String,

    /// Font size in points
    #[serde(default = "default_brand_font_size")]
    pub font_size: u32,
}

fn default_brand_fill() -> String {
    "1F3864".to_string()
}
fn default_brand_text() -> String {
    "FFFFFF".to_string()
}
fn default_brand_font_size() -> u32 {
    20
}

impl Default for ContractMeta {
    fn default() -> Self {
        Self {
            name: default_name(),
            locale: default_locale(),
            application: default_application(),
            widescreen: false,
        }
    }
}

impl Default for LayoutMappings {
    fn default() -> Self {
        Self {
            title: default_title_layout(),
            content: default_content_layout(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            heading: default_heading_font(),
            body: default_body_font(),
            title_size: default_title_size(),
            heading_size: default_heading_size(),
            body_size: default_body_size(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            header_background: default_table_header_bg(),
            header_text_color: default_table_header_text(),
            row_background: default_table_row_bg(),
            alt_row_background: default_table_alt_row_bg(),
            font_size: default_table_font_size(),
            row_height: default_table_row_height(),
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            fill_color: default_brand_fill(),
            text_color: default_brand_text(),
            font_size: default_brand_font_size(),
        }
    }
}

impl SlideContract {
    /// Load SlideContract from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse SlideContract from a TOML string
    pub fn parse(toml_content: &str) -> Result<Self> {
        let contract: SlideContract = toml::from_str(toml_content)?;
        contract.validate()?;
        Ok(contract)
    }

    /// Get the layout index for a SlideLayoutHint
    pub fn layout_for_hint(&self, hint: SlideLayoutHint) -> u32 {
        match hint {
            SlideLayoutHint::Title => self.layouts.title,
            SlideLayoutHint::Content => self.layouts.content,
        }
    }

    /// Slide size in EMU
    pub fn slide_size(&self) -> (i64, i64) {
        use crate::constants::*;

        if self.meta.widescreen {
            (WIDESCREEN_SLIDE_WIDTH_EMU, WIDESCREEN_SLIDE_HEIGHT_EMU)
        } else {
            (DEFAULT_SLIDE_WIDTH_EMU, DEFAULT_SLIDE_HEIGHT_EMU)
        }
    }

    /// Check layout indices and colors
    pub fn validate(&self) -> Result<()> {
        for (name, index) in [("title", self.layouts.title), ("content", self.layouts.content)] {
            if index < 1 || index > LAYOUT_COUNT {
                return Err(PptxError::invalid_layout(
                    index,
                    format!("Layout '{}' index must be between 1 and {}", name, LAYOUT_COUNT),
                ));
            }
        }

        let colors = [
            ("table.header_background", &self.table.header_background),
            ("table.header_text_color", &self.table.header_text_color),
            ("table.row_background", &self.table.row_background),
            ("table.alt_row_background", &self.table.alt_row_background),
            ("branding.fill_color", &self.branding.fill_color),
            ("branding.text_color", &self.branding.text_color),
        ];
        for (field, value) in colors {
            if !is_hex_color(value) {
                return Err(PptxError::invalid_color(field, value.as_str()));
            }
        }

        if self.meta.locale.trim().is_empty() {
            return Err(PptxError::contract_error("meta.locale must not be empty"));
        }

        Ok(())
    }
}

/// Six hex digits, no leading '#'
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit())
}
