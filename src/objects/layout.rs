//! Layout object

use crate::types::{Handle, Vector2};

/// A drawing sheet, bound one-to-one to a space block.
///
/// The "Model" layout is bound to the model space block; every other layout
/// owns a paper space block.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Unique handle
    pub handle: Handle,
    /// Layout name
    pub name: String,
    /// Name of the block this layout draws into
    pub block_name: String,
    /// Tab order in the UI
    pub tab_order: i16,
    /// Printable area minimum
    pub limits_min: Vector2,
    /// Printable area maximum
    pub limits_max: Vector2,
}

impl Layout {
    /// Create a layout bound to a block
    pub fn new(name: impl Into<String>, block_name: impl Into<String>, tab_order: i16) -> Self {
        Layout {
            handle: Handle::NULL,
            name: name.into(),
            block_name: block_name.into(),
            tab_order,
            limits_min: Vector2::ZERO,
            limits_max: Vector2::new(12.0, 9.0),
        }
    }

    /// The model layout
    pub fn model() -> Self {
        Layout::new("Model", crate::blocks::MODEL_SPACE, 0)
    }

    pub fn is_model(&self) -> bool {
        self.name.eq_ignore_ascii_case("Model")
    }
}
