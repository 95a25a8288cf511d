//! Point entity

use super::{Entity, EntityCommon};
use crate::types::Vector3;

/// A point entity
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub common: EntityCommon,
    /// Location of the point
    pub location: Vector3,
    /// Thickness (extrusion in Z direction)
    pub thickness: f64,
}

impl Point {
    /// Create a point at a location
    pub fn new(location: Vector3) -> Self {
        Point {
            common: EntityCommon::new(),
            location,
            thickness: 0.0,
        }
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(Vector3::ZERO)
    }
}

impl Entity for Point {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "POINT"
    }
}
