//! Hatch entity and boundary paths

use super::{Entity, EntityCommon, EntityType};
use crate::types::{Handle, Vector2};

/// Hatch fill pattern
#[derive(Debug, Clone, PartialEq)]
pub struct HatchPattern {
    /// Pattern name ("SOLID", "ANSI31", ...)
    pub name: String,
    /// Pattern scale
    pub scale: f64,
    /// Pattern angle in degrees
    pub angle: f64,
}

impl HatchPattern {
    /// Solid fill
    pub fn solid() -> Self {
        HatchPattern {
            name: "SOLID".to_string(),
            scale: 1.0,
            angle: 0.0,
        }
    }

    /// A named predefined pattern
    pub fn named(name: impl Into<String>) -> Self {
        HatchPattern {
            name: name.into(),
            scale: 1.0,
            angle: 0.0,
        }
    }

    /// Whether this is the solid fill pattern
    pub fn is_solid(&self) -> bool {
        self.name.eq_ignore_ascii_case("SOLID")
    }
}

/// One edge of a non-polyline boundary path
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryEdge {
    /// Straight segment
    Line { start: Vector2, end: Vector2 },
    /// Circular arc segment; angles in degrees
    Arc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    },
}

/// A hatch boundary path.
///
/// `sources` holds staged entities to be adopted by the hatch's block when
/// the hatch is added; once adopted, their handles live in `handles` and the
/// hatch is associative.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryPath {
    /// Polyline vertices with bulge, if this is a polyline path
    pub vertices: Vec<(Vector2, f64)>,
    /// Closed flag for the polyline form
    pub is_closed: bool,
    /// Edge list for the non-polyline form
    pub edges: Vec<BoundaryEdge>,
    /// Handles of the boundary's source entities, once owned
    pub handles: Vec<Handle>,
    /// Detached entities to adopt into the hatch's block on add
    pub sources: Vec<EntityType>,
}

impl BoundaryPath {
    /// Create a closed polyline path from points
    pub fn polyline(points: impl IntoIterator<Item = Vector2>) -> Self {
        BoundaryPath {
            vertices: points.into_iter().map(|p| (p, 0.0)).collect(),
            is_closed: true,
            ..Default::default()
        }
    }

    /// Create a path whose geometry comes from staged source entities
    pub fn from_entities(sources: Vec<EntityType>) -> Self {
        BoundaryPath {
            sources,
            ..Default::default()
        }
    }
}

/// A hatch entity
#[derive(Debug, Clone, PartialEq)]
pub struct Hatch {
    pub common: EntityCommon,
    /// Fill pattern
    pub pattern: HatchPattern,
    /// Elevation (OCS Z)
    pub elevation: f64,
    /// Whether boundary paths track real entities in the same block
    pub is_associative: bool,
    /// Boundary paths
    pub paths: Vec<BoundaryPath>,
}

impl Hatch {
    /// Create a hatch with a pattern and no boundaries
    pub fn new(pattern: HatchPattern) -> Self {
        Hatch {
            common: EntityCommon::new(),
            pattern,
            elevation: 0.0,
            is_associative: false,
            paths: Vec::new(),
        }
    }

    /// Add a boundary path
    pub fn add_path(&mut self, path: BoundaryPath) {
        self.paths.push(path);
    }

    /// Drop the association with boundary entities.
    ///
    /// The entities stay in their block; only the hatch stops tracking
    /// them.
    pub fn unlink_boundaries(&mut self) {
        self.is_associative = false;
        for path in &mut self.paths {
            path.handles.clear();
        }
    }

    /// All boundary entity handles across paths
    pub fn boundary_handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.paths.iter().flat_map(|p| p.handles.iter().copied())
    }
}

impl Entity for Hatch {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "HATCH"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlink_clears_handles_only() {
        let mut hatch = Hatch::new(HatchPattern::solid());
        let mut path = BoundaryPath::polyline([
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
        ]);
        path.handles.push(Handle::new(0x20));
        hatch.add_path(path);
        hatch.is_associative = true;

        hatch.unlink_boundaries();
        assert!(!hatch.is_associative);
        assert_eq!(hatch.boundary_handles().count(), 0);
        // Geometry survives
        assert_eq!(hatch.paths[0].vertices.len(), 3);
    }
}
