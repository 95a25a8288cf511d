//! User coordinate system table entry

use super::TableEntry;
use crate::types::{Handle, Vector3};
use crate::xdata::XData;

/// A named user coordinate system
#[derive(Debug, Clone)]
pub struct Ucs {
    /// Unique handle
    pub handle: Handle,
    /// UCS name
    pub name: String,
    /// Origin point
    pub origin: Vector3,
    /// X axis direction
    pub x_axis: Vector3,
    /// Y axis direction
    pub y_axis: Vector3,
    /// Extended data keyed by application registry
    pub xdata: XData,
}

impl Ucs {
    /// Create a new world-aligned UCS
    pub fn new(name: impl Into<String>) -> Self {
        Ucs {
            handle: Handle::NULL,
            name: name.into(),
            origin: Vector3::ZERO,
            x_axis: Vector3::new(1.0, 0.0, 0.0),
            y_axis: Vector3::new(0.0, 1.0, 0.0),
            xdata: XData::new(),
        }
    }
}

impl TableEntry for Ucs {
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
