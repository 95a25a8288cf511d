//! Color representation for drawing objects
//!
//! Colors are stored either as an AutoCAD Color Index (ACI) or as a 24-bit
//! true color. True color only exists on the wire from AC1018 on; older
//! dialects receive the nearest ACI index instead.

use std::fmt;

/// A drawing color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Color by layer (index 256)
    #[default]
    ByLayer,
    /// Color by block (index 0)
    ByBlock,
    /// AutoCAD Color Index (1-255)
    Index(u8),
    /// True color with RGB values
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    pub const RED: Color = Color::Index(1);
    pub const YELLOW: Color = Color::Index(2);
    pub const GREEN: Color = Color::Index(3);
    pub const CYAN: Color = Color::Index(4);
    pub const BLUE: Color = Color::Index(5);
    pub const MAGENTA: Color = Color::Index(6);
    pub const WHITE: Color = Color::Index(7);

    /// Create a color from an ACI value as found on the wire.
    ///
    /// Negative indices mark an invisible layer in LAYER records; the sign
    /// is handled by the caller, so the magnitude is taken here.
    pub fn from_index(index: i16) -> Self {
        match index {
            0 => Color::ByBlock,
            256 => Color::ByLayer,
            1..=255 => Color::Index(index as u8),
            _ if index < 0 => Color::Index((-index).min(255) as u8),
            _ => Color::WHITE,
        }
    }

    /// Create a true color from RGB values
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create a true color from the packed 24-bit wire value (code 420)
    pub fn from_true_color(value: i32) -> Self {
        Color::Rgb {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Packed 24-bit wire value, if this is a true color
    pub fn true_color_value(&self) -> Option<i32> {
        match self {
            Color::Rgb { r, g, b } => {
                Some(((*r as i32) << 16) | ((*g as i32) << 8) | (*b as i32))
            }
            _ => None,
        }
    }

    /// ACI value for the wire (code 62). True colors collapse to the
    /// nearest index, which is also the downgrade path for old dialects.
    pub fn approximate_index(&self) -> i16 {
        match self {
            Color::ByBlock => 0,
            Color::ByLayer => 256,
            Color::Index(i) => *i as i16,
            Color::Rgb { r, g, b } => {
                let brightness = ((*r as u16) + (*g as u16) + (*b as u16)) / 3;
                if brightness < 32 {
                    8
                } else if brightness > 224 {
                    7
                } else if *r > *g && *r > *b {
                    1
                } else if *g > *r && *g > *b {
                    3
                } else if *b > *r && *b > *g {
                    5
                } else if *r > 128 && *g > 128 {
                    2
                } else if *g > 128 && *b > 128 {
                    4
                } else if *r > 128 && *b > 128 {
                    6
                } else {
                    7
                }
            }
        }
    }

    /// Whether this color needs a true-color group on the wire
    pub fn is_true_color(&self) -> bool {
        matches!(self, Color::Rgb { .. })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::ByLayer => write!(f, "ByLayer"),
            Color::ByBlock => write!(f, "ByBlock"),
            Color::Index(i) => write!(f, "Index({})", i),
            Color::Rgb { r, g, b } => write!(f, "RGB({}, {}, {})", r, g, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_index() {
        assert_eq!(Color::from_index(0), Color::ByBlock);
        assert_eq!(Color::from_index(256), Color::ByLayer);
        assert_eq!(Color::from_index(1), Color::RED);
        assert_eq!(Color::from_index(-7), Color::WHITE);
    }

    #[test]
    fn test_true_color_roundtrip() {
        let color = Color::from_rgb(255, 128, 64);
        let packed = color.true_color_value().unwrap();
        assert_eq!(Color::from_true_color(packed), color);
    }

    #[test]
    fn test_downgrade_to_index() {
        assert_eq!(Color::from_rgb(250, 10, 10).approximate_index(), 1);
        assert_eq!(Color::ByLayer.approximate_index(), 256);
        assert_eq!(Color::ByBlock.approximate_index(), 0);
    }
}
