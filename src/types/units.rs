//! Drawing units ($INSUNITS values)

/// Insertion units for blocks and the document.
///
/// New blocks take the document's configured default instead of a
/// process-wide global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Unitless,
    Inches,
    Feet,
    Millimeters,
    Centimeters,
    Meters,
    Kilometers,
}

impl Units {
    /// Wire value (code 70 in BLOCK_RECORD, $INSUNITS in the header)
    pub fn value(&self) -> i16 {
        match self {
            Units::Unitless => 0,
            Units::Inches => 1,
            Units::Feet => 2,
            Units::Millimeters => 4,
            Units::Centimeters => 5,
            Units::Meters => 6,
            Units::Kilometers => 7,
        }
    }

    /// Create from the wire value; unknown values collapse to unitless
    pub fn from_value(value: i16) -> Self {
        match value {
            1 => Units::Inches,
            2 => Units::Feet,
            4 => Units::Millimeters,
            5 => Units::Centimeters,
            6 => Units::Meters,
            7 => Units::Kilometers,
            _ => Units::Unitless,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_roundtrip() {
        for u in [
            Units::Unitless,
            Units::Inches,
            Units::Feet,
            Units::Millimeters,
            Units::Centimeters,
            Units::Meters,
            Units::Kilometers,
        ] {
            assert_eq!(Units::from_value(u.value()), u);
        }
    }

    #[test]
    fn test_unknown_units_are_unitless() {
        assert_eq!(Units::from_value(13), Units::Unitless);
    }
}
