//! Core value types shared across the document model and codec

pub mod color;
pub mod handle;
pub mod line_weight;
pub mod transparency;
pub mod units;
pub mod vector;
pub mod version;

pub use color::Color;
pub use handle::{Handle, HandleAllocator};
pub use line_weight::LineWeight;
pub use transparency::Transparency;
pub use units::Units;
pub use vector::{Vector2, Vector3};
pub use version::DxfVersion;
