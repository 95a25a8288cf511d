//! Text style table entry

use super::TableEntry;
use crate::types::Handle;
use crate::xdata::XData;
use bitflags::bitflags;

bitflags! {
    /// Text generation flags (wire code 71)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextStyleFlags: u16 {
        const BACKWARD = 2;
        const UPSIDE_DOWN = 4;
    }
}

/// Name of the default text style
pub const STANDARD: &str = "Standard";

/// A text style table entry
#[derive(Debug, Clone)]
pub struct TextStyle {
    /// Unique handle
    pub handle: Handle,
    /// Style name
    pub name: String,
    /// Primary font file name
    pub font: String,
    /// Big font file for asian alphabets, if any
    pub big_font: String,
    /// Fixed text height; 0 means not fixed
    pub height: f64,
    /// Width factor
    pub width_factor: f64,
    /// Oblique angle in degrees
    pub oblique_angle: f64,
    /// Generation flags
    pub flags: TextStyleFlags,
    /// Height of the most recently used text, kept for interop
    pub last_height: f64,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

impl TextStyle {
    /// Create a new text style for a font file
    pub fn new(name: impl Into<String>, font: impl Into<String>) -> Self {
        TextStyle {
            handle: Handle::NULL,
            name: name.into(),
            font: font.into(),
            big_font: String::new(),
            height: 0.0,
            width_factor: 1.0,
            oblique_angle: 0.0,
            flags: TextStyleFlags::empty(),
            last_height: 2.5,
            xdata: XData::new(),
        }
    }

    /// The default "Standard" style
    pub fn standard() -> Self {
        TextStyle::new(STANDARD, "txt")
    }
}

impl TableEntry for TextStyle {
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
        assert!(TextStyle::standard().is_reserved());
        assert!(!TextStyle::new("Arial", "arial.ttf").is_reserved());
    }
}
