//! View table entry

use super::TableEntry;
use crate::types::{Handle, Vector2, Vector3};
use crate::xdata::XData;

/// A named view
#[derive(Debug, Clone)]
pub struct View {
    /// Unique handle
    pub handle: Handle,
    /// View name
    pub name: String,
    /// View center (in DCS)
    pub center: Vector2,
    /// View height
    pub height: f64,
    /// View width
    pub width: f64,
    /// Target point
    pub target: Vector3,
    /// View direction from target
    pub direction: Vector3,
    /// Lens length for perspective views
    pub lens_length: f64,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

impl View {
    /// Create a new top-down view
    pub fn new(name: impl Into<String>) -> Self {
        View {
            handle: Handle::NULL,
            name: name.into(),
            center: Vector2::ZERO,
            height: 1.0,
            width: 1.0,
            target: Vector3::ZERO,
            direction: Vector3::UNIT_Z,
            lens_length: 50.0,
            xdata: XData::new(),
        }
    }
}

impl TableEntry for View {
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
}
