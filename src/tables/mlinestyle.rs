//! Multiline style entry
//!
//! Multiline styles behave like any other named registry even though the
//! format stores them in the OBJECTS section.

use super::TableEntry;
use crate::types::{Color, Handle};
use crate::xdata::XData;

/// Name of the default multiline style
pub const STANDARD: &str = "Standard";

/// One offset line of a multiline style
#[derive(Debug, Clone, PartialEq)]
pub struct MLineStyleElement {
    /// Offset from the multiline axis
    pub offset: f64,
    /// Element color
    pub color: Color,
    /// Element line type name
    pub line_type: String,
}

impl MLineStyleElement {
    pub fn new(offset: f64) -> Self {
        Self {
            offset,
            color: Color::ByLayer,
            line_type: crate::tables::linetype::BY_LAYER.to_string(),
        }
    }
}

/// A multiline style entry
#[derive(Debug, Clone)]
pub struct MLineStyle {
    /// Unique handle
    pub handle: Handle,
    /// Style name
    pub name: String,
    /// Descriptive text
    pub description: String,
    /// Fill color when fill is on
    pub fill_color: Color,
    /// Start angle in degrees
    pub start_angle: f64,
    /// End angle in degrees
    pub end_angle: f64,
    /// Offset elements, outermost first
    pub elements: Vec<MLineStyleElement>,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

impl MLineStyle {
    /// Create a new multiline style with the two default offset lines
    pub fn new(name: impl Into<String>) -> Self {
        MLineStyle {
            handle: Handle::NULL,
            name: name.into(),
            description: String::new(),
            fill_color: Color::ByLayer,
            start_angle: 90.0,
            end_angle: 90.0,
            elements: vec![MLineStyleElement::new(0.5), MLineStyleElement::new(-0.5)],
            xdata: XData::new(),
        }
    }

    /// The default "Standard" style
    pub fn standard() -> Self {
        MLineStyle::new(STANDARD)
    }
}

impl TableEntry for MLineStyle {
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
