//! Line type table entry

use super::TableEntry;
use crate::types::Handle;
use crate::xdata::XData;
use once_cell::sync::Lazy;

/// Names of the three line types every document carries
pub const BY_LAYER: &str = "ByLayer";
pub const BY_BLOCK: &str = "ByBlock";
pub const CONTINUOUS: &str = "Continuous";

/// One dash/dot/space segment of a line type pattern.
///
/// Positive lengths are dashes, negative are spaces, zero is a dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTypeSegment {
    pub length: f64,
}

impl LineTypeSegment {
    pub fn dash(length: f64) -> Self {
        Self { length }
    }

    pub fn space(length: f64) -> Self {
        Self { length: -length }
    }

    pub fn dot() -> Self {
        Self { length: 0.0 }
    }
}

/// A line type table entry
#[derive(Debug, Clone)]
pub struct LineType {
    /// Unique handle
    pub handle: Handle,
    /// Line type name
    pub name: String,
    /// Descriptive text shown by CAD tools
    pub description: String,
    /// Pattern segments
    pub segments: Vec<LineTypeSegment>,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

/// Predefined pattern catalog (name, description, segments), used to build
/// the common stock line types without repeating the tables at every call
/// site.
static PREDEFINED: Lazy<Vec<(&'static str, &'static str, Vec<LineTypeSegment>)>> =
    Lazy::new(|| {
        vec![
            (
                "Dashed",
                "Dashed _ _ _ _ _ _ _ _ _ _ _ _ _ _",
                vec![LineTypeSegment::dash(0.5), LineTypeSegment::space(0.25)],
            ),
            (
                "Dot",
                "Dot . . . . . . . . . . . . . . . .",
                vec![LineTypeSegment::dot(), LineTypeSegment::space(0.25)],
            ),
            (
                "DashDot",
                "Dash dot _ . _ . _ . _ . _ . _ . _",
                vec![
                    LineTypeSegment::dash(0.5),
                    LineTypeSegment::space(0.25),
                    LineTypeSegment::dot(),
                    LineTypeSegment::space(0.25),
                ],
            ),
            (
                "Center",
                "Center ____ _ ____ _ ____ _ ____",
                vec![
                    LineTypeSegment::dash(1.25),
                    LineTypeSegment::space(0.25),
                    LineTypeSegment::dash(0.25),
                    LineTypeSegment::space(0.25),
                ],
            ),
        ]
    });

impl LineType {
    /// Create a new continuous (empty pattern) line type
    pub fn new(name: impl Into<String>) -> Self {
        LineType {
            handle: Handle::NULL,
            name: name.into(),
            description: String::new(),
            segments: Vec::new(),
            xdata: XData::new(),
        }
    }

    /// The "ByLayer" placeholder line type
    pub fn by_layer() -> Self {
        LineType::new(BY_LAYER)
    }

    /// The "ByBlock" placeholder line type
    pub fn by_block() -> Self {
        LineType::new(BY_BLOCK)
    }

    /// The "Continuous" line type
    pub fn continuous() -> Self {
        LineType {
            description: "Solid line".to_string(),
            ..LineType::new(CONTINUOUS)
        }
    }

    /// Look up one of the predefined stock patterns by name
    pub fn predefined(name: &str) -> Option<Self> {
        PREDEFINED
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, d, segments)| LineType {
                handle: Handle::NULL,
                name: (*n).to_string(),
                description: (*d).to_string(),
                segments: segments.clone(),
                xdata: XData::new(),
            })
    }

    /// Total pattern length (sum of absolute segment lengths, code 40)
    pub fn pattern_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length.abs()).sum()
    }
}

impl TableEntry for LineType {
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
        self.name.eq_ignore_ascii_case(BY_LAYER)
            || self.name.eq_ignore_ascii_case(BY_BLOCK)
            || self.name.eq_ignore_ascii_case(CONTINUOUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_line_types_reserved() {
        assert!(LineType::by_layer().is_reserved());
        assert!(LineType::by_block().is_reserved());
        assert!(LineType::continuous().is_reserved());
        assert!(!LineType::new("Hidden").is_reserved());
    }

    #[test]
    fn test_predefined_lookup() {
        let dashed = LineType::predefined("dashed").unwrap();
        assert_eq!(dashed.name, "Dashed");
        assert_eq!(dashed.segments.len(), 2);
        assert!(LineType::predefined("NoSuch").is_none());
    }

    #[test]
    fn test_pattern_length() {
        let dashed = LineType::predefined("Dashed").unwrap();
        assert!((dashed.pattern_length() - 0.75).abs() < 1e-12);
        assert_eq!(LineType::continuous().pattern_length(), 0.0);
    }
}
