//! Line weight values

/// Line weight in hundredths of a millimeter, plus the symbolic values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineWeight {
    /// Use the layer's line weight (-1)
    #[default]
    ByLayer,
    /// Use the block's line weight (-2)
    ByBlock,
    /// The document default (-3)
    Standard,
    /// Explicit weight in 1/100 mm (0-211)
    Value(i16),
}

impl LineWeight {
    /// Wire value (code 370)
    pub fn value(&self) -> i16 {
        match self {
            LineWeight::ByLayer => -1,
            LineWeight::ByBlock => -2,
            LineWeight::Standard => -3,
            LineWeight::Value(v) => *v,
        }
    }

    /// Create from the wire value
    pub fn from_value(value: i16) -> Self {
        match value {
            -1 => LineWeight::ByLayer,
            -2 => LineWeight::ByBlock,
            -3 => LineWeight::Standard,
            v => LineWeight::Value(v.clamp(0, 211)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_weight_roundtrip() {
        for v in [-3i16, -2, -1, 0, 13, 211] {
            assert_eq!(LineWeight::from_value(v).value(), v);
        }
    }

    #[test]
    fn test_out_of_range_clamped() {
        assert_eq!(LineWeight::from_value(500).value(), 211);
    }
}
