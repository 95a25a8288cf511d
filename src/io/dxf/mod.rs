//! DXF tag stream reading and writing

pub mod code;
pub mod code_page;
mod probe;
pub mod reader;
pub mod tag;
pub mod writer;

pub use code::{value_kind, GroupValueKind};
pub use probe::{probe, probe_file, DxfProbe};
pub use reader::{DxfReader, DxfReaderConfiguration};
pub use tag::{Tag, TagValue};
pub use writer::DxfWriter;
