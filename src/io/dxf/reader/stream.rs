//! Tag reader trait shared by the ASCII and binary decoders

use crate::error::Result;
use crate::io::dxf::tag::Tag;
use encoding_rs::Encoding;

/// Sentinel opening every binary DXF stream
pub const BINARY_SENTINEL: &[u8] = b"AutoCAD Binary DXF\r\n\x1a\x00";

/// Pulls typed tags off a stream
pub trait TagReader {
    /// Read the next tag; `None` at end of stream
    fn read_tag(&mut self) -> Result<Option<Tag>>;

    /// Push a tag back so the next `read_tag` returns it again
    fn push_back(&mut self, tag: Tag);

    /// Rewind to the position the reader was constructed at
    fn reset(&mut self) -> Result<()>;

    /// Set the code-page fallback used for non-UTF-8 text
    fn set_encoding(&mut self, encoding: &'static Encoding);
}
