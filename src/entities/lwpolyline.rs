//! Lightweight polyline entity

use super::{Entity, EntityCommon};
use crate::types::Vector2;

/// One vertex of a lightweight polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LwVertex {
    /// Vertex location (in OCS)
    pub point: Vector2,
    /// Bulge factor; 0 for a straight segment
    pub bulge: f64,
}

impl LwVertex {
    pub fn new(point: Vector2) -> Self {
        LwVertex { point, bulge: 0.0 }
    }

    pub fn with_bulge(point: Vector2, bulge: f64) -> Self {
        LwVertex { point, bulge }
    }
}

/// A lightweight polyline entity
#[derive(Debug, Clone, PartialEq)]
pub struct LwPolyline {
    pub common: EntityCommon,
    /// Vertices in order
    pub vertices: Vec<LwVertex>,
    /// Closed flag
    pub is_closed: bool,
    /// Constant width, if any
    pub constant_width: f64,
    /// Elevation (OCS Z)
    pub elevation: f64,
}

impl LwPolyline {
    /// Create an empty polyline
    pub fn new() -> Self {
        LwPolyline {
            common: EntityCommon::new(),
            vertices: Vec::new(),
            is_closed: false,
            constant_width: 0.0,
            elevation: 0.0,
        }
    }

    /// Create a polyline from points
    pub fn from_points(points: impl IntoIterator<Item = Vector2>, is_closed: bool) -> Self {
        LwPolyline {
            vertices: points.into_iter().map(LwVertex::new).collect(),
            is_closed,
            ..Self::new()
        }
    }

    /// Append a straight vertex
    pub fn push(&mut self, point: Vector2) {
        self.vertices.push(LwVertex::new(point));
    }

    /// Whether any segment is an arc
    pub fn has_bulge(&self) -> bool {
        self.vertices.iter().any(|v| v.bulge.abs() > 1e-12)
    }
}

impl Default for LwPolyline {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for LwPolyline {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "LWPOLYLINE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let pl = LwPolyline::from_points(
            [Vector2::new(0.0, 0.0), Vector2::new(1.0, 0.0), Vector2::new(1.0, 1.0)],
            true,
        );
        assert_eq!(pl.vertices.len(), 3);
        assert!(pl.is_closed);
        assert!(!pl.has_bulge());
    }
}
