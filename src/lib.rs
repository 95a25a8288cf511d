//! # dxfdom
//!
//! A pure Rust library for reading and writing DXF drawings.
//!
//! The crate centers on a reference-tracked document model: named table
//! objects (layers, line types, text styles, ...) live in case-insensitive
//! registries that merge by name, entities belong to exactly one block, and
//! removal is refused while anything still references the entry. The codec
//! serializes that model to DXF tag streams, ASCII or binary, across
//! dialect versions with per-version feature downgrades.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use dxfdom::{CadDocument, DxfVersion};
//! use dxfdom::entities::Line;
//! use dxfdom::types::Vector3;
//!
//! let mut doc = CadDocument::new();
//! let line = Line::from_points(Vector3::ZERO, Vector3::new(10.0, 0.0, 0.0));
//! doc.add_to_model_space(line.into())?;
//! doc.save("drawing.dxf", DxfVersion::AC1032)?;
//!
//! let loaded = CadDocument::load("drawing.dxf")?;
//! assert_eq!(loaded.model_space().unwrap().entity_count(), 1);
//! # Ok::<(), dxfdom::DxfError>(())
//! ```

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blocks;
pub mod document;
pub mod entities;
pub mod error;
pub mod header;
pub mod io;
pub mod notification;
pub mod objects;
pub mod tables;
pub mod types;
pub mod xdata;

// Re-export commonly used types
pub use blocks::Block;
pub use document::{CadDocument, DocumentOptions};
pub use error::{DxfError, Result};
pub use header::HeaderVariables;
pub use io::dxf::{probe, DxfProbe, DxfReader, DxfWriter};
pub use notification::{Notification, NotificationKind};
pub use types::{Color, DxfVersion, Handle, LineWeight, Transparency, Units, Vector2, Vector3};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_document_creation() {
        let doc = CadDocument::new();
        assert_eq!(doc.version, DxfVersion::AC1032);

        let doc2 = CadDocument::with_version(DxfVersion::AC1015);
        assert_eq!(doc2.version, DxfVersion::AC1015);
    }
}
