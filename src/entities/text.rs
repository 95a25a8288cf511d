//! Single-line text entity

use super::{Entity, EntityCommon};
use crate::types::Vector3;

/// A single-line text entity
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub common: EntityCommon,
    /// Text content
    pub value: String,
    /// Insertion point
    pub position: Vector3,
    /// Text height
    pub height: f64,
    /// Rotation angle in degrees
    pub rotation: f64,
    /// Width factor
    pub width_factor: f64,
    /// Oblique angle in degrees
    pub oblique_angle: f64,
    /// Text style name (resolved through the text style registry)
    pub style: String,
}

impl Text {
    /// Create a text entity
    pub fn new(value: impl Into<String>, position: Vector3, height: f64) -> Self {
        Text {
            common: EntityCommon::new(),
            value: value.into(),
            position,
            height,
            rotation: 0.0,
            width_factor: 1.0,
            oblique_angle: 0.0,
            style: crate::tables::textstyle::STANDARD.to_string(),
        }
    }
}

impl Entity for Text {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "TEXT"
    }
}
