//! Linear dimension entity
//!
//! Only the aligned/rotated linear form is modeled; the full dimension
//! family belongs to the geometry collaborator.

use super::{Entity, EntityCommon};
use crate::types::Vector3;

/// A linear dimension entity
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub common: EntityCommon,
    /// Dimension style name (resolved through the dimension style registry)
    pub style: String,
    /// First extension line origin
    pub first_point: Vector3,
    /// Second extension line origin
    pub second_point: Vector3,
    /// Dimension line location
    pub definition_point: Vector3,
    /// Text middle point
    pub text_mid_point: Vector3,
    /// Dimension line rotation in degrees
    pub rotation: f64,
    /// Explicit text, if the measured value is overridden
    pub text_override: Option<String>,
}

impl Dimension {
    /// Create a linear dimension between two points
    pub fn linear(first: Vector3, second: Vector3, offset: f64) -> Self {
        let definition_point = Vector3::new(second.x, second.y + offset, second.z);
        let text_mid_point = Vector3::new(
            (first.x + second.x) / 2.0,
            second.y + offset,
            second.z,
        );
        Dimension {
            common: EntityCommon::new(),
            style: crate::tables::dimstyle::STANDARD.to_string(),
            first_point: first,
            second_point: second,
            definition_point,
            text_mid_point,
            rotation: 0.0,
            text_override: None,
        }
    }

    /// Measured distance
    pub fn measurement(&self) -> f64 {
        self.first_point.distance(&self.second_point)
    }
}

impl Entity for Dimension {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "DIMENSION"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement() {
        let dim = Dimension::linear(
            Vector3::ZERO,
            Vector3::new(10.0, 0.0, 0.0),
            2.0,
        );
        assert_eq!(dim.measurement(), 10.0);
        assert_eq!(dim.style, "Standard");
    }
}
