//! Error types for PPTX generation.

use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while writing or reading a deck
#[derive(Error, Debug)]
pub enum PptxError {
    /// SlideContract configuration error
    #[error("SlideContract error: {reason}")]
    ContractError { reason: String },

    /// Invalid layout index in SlideContract
    #[error("Invalid slide layout index {index}: {reason}")]
    InvalidLayoutIndex { index: u32, reason: String },

    /// Color value is not six hex digits
    #[error("Invalid color '{value}' for {field}: expected RRGGBB")]
    InvalidColor { field: String, value: String },

    /// Table rows disagree with the header width
    #[error("Table row {row} has {found} cells, header has {expected}")]
    RaggedTable {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Package is missing a part or holds malformed XML
    #[error("Invalid package: {reason}")]
    InvalidPackage { reason: String },

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// ZIP archive error
    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error (for SlideContract)
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl PptxError {
    /// Create a contract error
    pub fn contract_error(reason: impl Into<String>) -> Self {
        Self::ContractError {
            reason: reason.into(),
        }
    }

    /// Create an invalid layout index error
    pub fn invalid_layout(index: u32, reason: impl Into<String>) -> Self {
        Self::InvalidLayoutIndex {
            index,
            reason: reason.into(),
        }
    }

    /// Create an invalid color error
    pub fn invalid_color(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidColor {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invalid package error
    pub fn invalid_package(reason: impl Into<String>) -> Self {
        Self::InvalidPackage {
            reason: reason.into(),
        }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::ContractError { .. } => "PPTX003",
            Self::InvalidLayoutIndex { .. } => "PPTX004",
            Self::InvalidColor { .. } => "PPTX005",
            Self::RaggedTable { .. } => "PPTX006",
            Self::XmlError(_) => "PPTX007",
            Self::ZipError(_) => "PPTX008",
            Self::IoError(_) => "PPTX009",
            Self::TomlError(_) => "PPTX010",
            Self::InvalidPackage { .. } => "PPTX011",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PptxError::invalid_layout(99, "layout does not exist");
        assert_eq!(err.code(), "PPTX004");
        assert!(err.to_string().contains("99"));

        let err = PptxError::invalid_package("missing ppt/presentation.xml");
        assert_eq!(err.code(), "PPTX011");
    }

    #[test]
    fn test_error_display() {
        let err = PptxError::invalid_color("table.header_background", "blue");
        assert!(err.to_string().contains("blue"));
        assert!(err.to_string().contains("table.header_background"));

        let err = PptxError::RaggedTable {
            row: 3,
            found: 2,
            expected: 5,
        };
        assert_eq!(err.to_string(), "Table row 3 has 2 cells, header has 5");
    }
}
