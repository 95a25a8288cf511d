//! Drawing entities
//!
//! Entities live inside exactly one block (the ownership invariant is
//! structural: the owning block's vector holds the value). The `owner`
//! field on the common envelope records the owning block's name so that
//! detached clones and removal mismatches can be detected.

use crate::types::{Color, Handle, LineWeight, Transparency};
use crate::xdata::XData;

pub mod arc;
pub mod attrib;
pub mod circle;
pub mod dimension;
pub mod hatch;
pub mod insert;
pub mod line;
pub mod lwpolyline;
pub mod point;
pub mod text;

pub use arc::Arc;
pub use attrib::{Attribute, AttributeDefinition, AttributeFlags};
pub use circle::Circle;
pub use dimension::Dimension;
pub use hatch::{BoundaryEdge, BoundaryPath, Hatch, HatchPattern};
pub use insert::Insert;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwVertex};
pub use point::Point;
pub use text::Text;

/// Data shared by every entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCommon {
    /// Unique handle, assigned when the entity becomes document-owned
    pub handle: Handle,
    /// Name of the owning block, `None` while detached
    pub owner: Option<String>,
    /// Layer name (resolved through the layer registry)
    pub layer: String,
    /// Line type name (resolved through the line type registry)
    pub line_type: String,
    /// Line type scale
    pub line_type_scale: f64,
    /// Color
    pub color: Color,
    /// Line weight
    pub line_weight: LineWeight,
    /// Transparency
    pub transparency: Transparency,
    /// Visibility flag
    pub invisible: bool,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

impl EntityCommon {
    /// Create a detached envelope with default references
    pub fn new() -> Self {
        EntityCommon {
            handle: Handle::NULL,
            owner: None,
            layer: crate::tables::layer::DEFAULT_LAYER.to_string(),
            line_type: crate::tables::linetype::BY_LAYER.to_string(),
            line_type_scale: 1.0,
            color: Color::ByLayer,
            line_weight: LineWeight::ByLayer,
            transparency: Transparency::ByLayer,
            invisible: false,
            xdata: XData::new(),
        }
    }

    /// Create with a specific layer
    pub fn on_layer(layer: impl Into<String>) -> Self {
        EntityCommon {
            layer: layer.into(),
            ..Self::new()
        }
    }
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self::new()
    }
}

/// Base trait for all entities
pub trait Entity {
    /// The shared envelope
    fn common(&self) -> &EntityCommon;

    /// The shared envelope, mutably
    fn common_mut(&mut self) -> &mut EntityCommon;

    /// The DXF record name of this entity ("LINE", "CIRCLE", ...)
    fn entity_type(&self) -> &'static str;

    /// Get the entity's handle
    fn handle(&self) -> Handle {
        self.common().handle
    }

    /// Get the entity's layer name
    fn layer(&self) -> &str {
        &self.common().layer
    }

    /// Set the entity's layer name
    fn set_layer(&mut self, layer: impl Into<String>)
    where
        Self: Sized,
    {
        self.common_mut().layer = layer.into();
    }

    /// Get the entity's color
    fn color(&self) -> Color {
        self.common().color
    }
}

/// Enumeration of all entity types for type-safe storage
#[derive(Debug, Clone, PartialEq)]
pub enum EntityType {
    Point(Point),
    Line(Line),
    Circle(Circle),
    Arc(Arc),
    LwPolyline(LwPolyline),
    Text(Text),
    AttributeDefinition(AttributeDefinition),
    Insert(Insert),
    Hatch(Hatch),
    Dimension(Dimension),
}

impl EntityType {
    /// Get a reference to the entity trait object
    pub fn as_entity(&self) -> &dyn Entity {
        match self {
            EntityType::Point(e) => e,
            EntityType::Line(e) => e,
            EntityType::Circle(e) => e,
            EntityType::Arc(e) => e,
            EntityType::LwPolyline(e) => e,
            EntityType::Text(e) => e,
            EntityType::AttributeDefinition(e) => e,
            EntityType::Insert(e) => e,
            EntityType::Hatch(e) => e,
            EntityType::Dimension(e) => e,
        }
    }

    /// Get a mutable reference to the entity trait object
    pub fn as_entity_mut(&mut self) -> &mut dyn Entity {
        match self {
            EntityType::Point(e) => e,
            EntityType::Line(e) => e,
            EntityType::Circle(e) => e,
            EntityType::Arc(e) => e,
            EntityType::LwPolyline(e) => e,
            EntityType::Text(e) => e,
            EntityType::AttributeDefinition(e) => e,
            EntityType::Insert(e) => e,
            EntityType::Hatch(e) => e,
            EntityType::Dimension(e) => e,
        }
    }

    /// The shared envelope
    pub fn common(&self) -> &EntityCommon {
        self.as_entity().common()
    }

    /// The shared envelope, mutably
    pub fn common_mut(&mut self) -> &mut EntityCommon {
        self.as_entity_mut().common_mut()
    }

    /// The entity's handle
    pub fn handle(&self) -> Handle {
        self.common().handle
    }

    /// A clone with handle and owner cleared, ready to be added to another
    /// block or document
    pub fn detached_clone(&self) -> EntityType {
        let mut clone = self.clone();
        let common = clone.common_mut();
        common.handle = Handle::NULL;
        common.owner = None;
        clone
    }
}

impl From<Line> for EntityType {
    fn from(e: Line) -> Self {
        EntityType::Line(e)
    }
}

impl From<Circle> for EntityType {
    fn from(e: Circle) -> Self {
        EntityType::Circle(e)
    }
}

impl From<Arc> for EntityType {
    fn from(e: Arc) -> Self {
        EntityType::Arc(e)
    }
}

impl From<Point> for EntityType {
    fn from(e: Point) -> Self {
        EntityType::Point(e)
    }
}

impl From<LwPolyline> for EntityType {
    fn from(e: LwPolyline) -> Self {
        EntityType::LwPolyline(e)
    }
}

impl From<Text> for EntityType {
    fn from(e: Text) -> Self {
        EntityType::Text(e)
    }
}

impl From<AttributeDefinition> for EntityType {
    fn from(e: AttributeDefinition) -> Self {
        EntityType::AttributeDefinition(e)
    }
}

impl From<Insert> for EntityType {
    fn from(e: Insert) -> Self {
        EntityType::Insert(e)
    }
}

impl From<Hatch> for EntityType {
    fn from(e: Hatch) -> Self {
        EntityType::Hatch(e)
    }
}

impl From<Dimension> for EntityType {
    fn from(e: Dimension) -> Self {
        EntityType::Dimension(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector3;

    #[test]
    fn test_detached_clone_clears_identity() {
        let mut line = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        line.common.handle = Handle::new(0x50);
        line.common.owner = Some("*Model_Space".to_string());

        let entity: EntityType = line.into();
        let clone = entity.detached_clone();
        assert!(clone.handle().is_null());
        assert_eq!(clone.common().owner, None);
        // The original keeps its identity
        assert_eq!(entity.handle(), Handle::new(0x50));
    }

    #[test]
    fn test_entity_type_name() {
        let circle: EntityType = Circle::new(Vector3::ZERO, 2.0).into();
        assert_eq!(circle.as_entity().entity_type(), "CIRCLE");
    }
}
