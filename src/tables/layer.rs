//! Layer table entry

use super::TableEntry;
use crate::types::{Color, Handle, LineWeight, Transparency};
use crate::xdata::XData;
use bitflags::bitflags;

bitflags! {
    /// Layer state flags (wire code 70, plus the off state folded into the
    /// sign of the color group)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayerFlags: u16 {
        const FROZEN = 1;
        const LOCKED = 4;
    }
}

/// A layer table entry
#[derive(Debug, Clone)]
pub struct Layer {
    /// Unique handle
    pub handle: Handle,
    /// Layer name
    pub name: String,
    /// Layer color
    pub color: Color,
    /// Line type name (resolved through the line type registry)
    pub line_type: String,
    /// Line weight
    pub line_weight: LineWeight,
    /// Layer transparency
    pub transparency: Transparency,
    /// State flags
    pub flags: LayerFlags,
    /// Layer is off (invisible); encoded as a negative color index
    pub is_off: bool,
    /// Is this layer plottable?
    pub is_plottable: bool,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

/// Name of the default layer present in every document
pub const DEFAULT_LAYER: &str = "0";

impl Layer {
    /// Create a new layer with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Layer {
            handle: Handle::NULL,
            name: name.into(),
            color: Color::WHITE,
            line_type: crate::tables::linetype::CONTINUOUS.to_string(),
            line_weight: LineWeight::Standard,
            transparency: Transparency::ByLayer,
            flags: LayerFlags::empty(),
            is_off: false,
            is_plottable: true,
            xdata: XData::new(),
        }
    }

    /// Create a layer with a specific color
    pub fn with_color(name: impl Into<String>, color: Color) -> Self {
        Layer {
            color,
            ..Self::new(name)
        }
    }

    /// The default layer "0"
    pub fn default_layer() -> Self {
        Self::new(DEFAULT_LAYER)
    }

    pub fn is_frozen(&self) -> bool {
        self.flags.contains(LayerFlags::FROZEN)
    }

    pub fn is_locked(&self) -> bool {
        self.flags.contains(LayerFlags::LOCKED)
    }

    /// Visible means neither off nor frozen
    pub fn is_visible(&self) -> bool {
        !self.is_off && !self.is_frozen()
    }
}

impl TableEntry for Layer {
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
        self.name == DEFAULT_LAYER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layer_is_reserved() {
        assert!(Layer::default_layer().is_reserved());
        assert!(!Layer::new("Walls").is_reserved());
    }

    #[test]
    fn test_visibility() {
        let mut layer = Layer::new("L");
        assert!(layer.is_visible());
        layer.flags |= LayerFlags::FROZEN;
        assert!(!layer.is_visible());
        layer.flags -= LayerFlags::FROZEN;
        layer.is_off = true;
        assert!(!layer.is_visible());
    }
}
