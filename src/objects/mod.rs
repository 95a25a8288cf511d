//! Non-graphical objects (OBJECTS section)

mod group;
mod layout;

pub use group::Group;
pub use layout::Layout;

use crate::types::Handle;

/// An OBJECTS entry this crate does not model, preserved verbatim so that
/// third-party data survives a round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObject {
    /// DXF record name ("XRECORD", "ACDBPLACEHOLDER", ...)
    pub object_type: String,
    /// Unique handle
    pub handle: Handle,
    /// Owner handle as found on the wire
    pub owner: Handle,
    /// Every remaining group, in wire order
    pub pairs: Vec<(i32, String)>,
}

impl RawObject {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            handle: Handle::NULL,
            owner: Handle::NULL,
            pairs: Vec::new(),
        }
    }
}
