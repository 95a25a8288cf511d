//! Dimension style table entry
//!
//! Only the dimension variables this crate serializes are modeled; the full
//! DIMVAR catalog belongs to the dimension drawing collaborator.

use super::TableEntry;
use crate::types::{Color, Handle};
use crate::xdata::XData;

/// Name of the default dimension style
pub const STANDARD: &str = "Standard";

/// A dimension style table entry
#[derive(Debug, Clone)]
pub struct DimStyle {
    /// Unique handle
    pub handle: Handle,
    /// Style name
    pub name: String,
    /// DIMSCALE overall scale factor
    pub scale: f64,
    /// DIMASZ arrow size
    pub arrow_size: f64,
    /// DIMTXT text height
    pub text_height: f64,
    /// DIMGAP gap between dimension line and text
    pub text_gap: f64,
    /// DIMEXO extension line offset
    pub ext_line_offset: f64,
    /// DIMEXE extension line extension
    pub ext_line_extension: f64,
    /// DIMDEC decimal places
    pub decimal_places: i16,
    /// DIMCLRD dimension line color
    pub line_color: Color,
    /// DIMTXSTY text style name (resolved through the text style registry)
    pub text_style: String,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

impl DimStyle {
    /// Create a new dimension style
    pub fn new(name: impl Into<String>) -> Self {
        DimStyle {
            handle: Handle::NULL,
            name: name.into(),
            scale: 1.0,
            arrow_size: 0.18,
            text_height: 0.18,
            text_gap: 0.09,
            ext_line_offset: 0.0625,
            ext_line_extension: 0.18,
            decimal_places: 4,
            line_color: Color::ByBlock,
            text_style: crate::tables::textstyle::STANDARD.to_string(),
            xdata: XData::new(),
        }
    }

    /// The default "Standard" style
    pub fn standard() -> Self {
        DimStyle::new(STANDARD)
    }
}

impl TableEntry for DimStyle {
    fn handle(&self) -> Handle {
        self.handle
    }

    fn set_handle(&mut self, handle: Handle) {
        self.handle = handle;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn is_reserved(&self) -> bool {
        self.name.eq_ignore_ascii_case(STANDARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_is_reserved() {
        assert!(DimStyle::standard().is_reserved());
        assert!(!DimStyle::new("Arch").is_reserved());
    }

    #[test]
    fn test_references_standard_text_style() {
        assert_eq!(DimStyle::standard().text_style, "Standard");
    }
}
