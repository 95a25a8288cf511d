//! DXF writer

mod binary;
mod sections;
mod stream;
mod text;

pub use binary::BinaryTagWriter;
pub use sections::SectionWriter;
pub use stream::{format_double, TagWriter, TagWriterExt};
pub use text::TextTagWriter;

use crate::document::CadDocument;
use crate::error::{DxfError, Result};
use crate::types::DxfVersion;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// DXF file writer.
///
/// Emits a document as an ASCII or binary tag stream at a chosen dialect
/// version; features the dialect cannot carry are downgraded silently.
pub struct DxfWriter {
    version: DxfVersion,
    binary: bool,
}

impl DxfWriter {
    /// Create an ASCII writer for a dialect version.
    ///
    /// Fails with `UnsupportedVersion` for dialects older than AC1015.
    pub fn new(version: DxfVersion) -> Result<Self> {
        Self::with_encoding(version, false)
    }

    /// Create a binary writer for a dialect version
    pub fn new_binary(version: DxfVersion) -> Result<Self> {
        Self::with_encoding(version, true)
    }

    fn with_encoding(version: DxfVersion, binary: bool) -> Result<Self> {
        if !version.is_writable() {
            return Err(DxfError::UnsupportedVersion(
                version.to_dxf_string().to_string(),
            ));
        }
        Ok(Self { version, binary })
    }

    /// Write a document to any sink.
    ///
    /// The document is taken mutably so persisted objects that do not yet
    /// carry a handle receive one, in the fixed traversal order; nothing
    /// else is modified. Externally supplied sinks are never closed here.
    pub fn write<W: Write>(&self, doc: &mut CadDocument, sink: W) -> Result<()> {
        doc.assign_missing_handles();
        if self.binary {
            let mut writer = BinaryTagWriter::new(sink)?;
            self.emit(doc, &mut writer)
        } else {
            let mut writer = TextTagWriter::new(sink);
            for comment in &doc.comments {
                writer.write_comment(comment)?;
            }
            self.emit(doc, &mut writer)
        }
    }

    /// Write a document to a file path
    pub fn write_to_file<P: AsRef<Path>>(&self, doc: &mut CadDocument, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write(doc, BufWriter::new(file))
    }

    /// Write a document to a byte vector
    pub fn write_to_vec(&self, doc: &mut CadDocument) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(doc, &mut buffer)?;
        Ok(buffer)
    }

    fn emit<W: TagWriter>(&self, doc: &CadDocument, writer: &mut W) -> Result<()> {
        let mut sections = SectionWriter::new(writer, self.version);
        sections.write_document(doc)?;
        writer.write_str(0, "EOF")?;
        writer.flush()
    }
}

impl CadDocument {
    /// Save as ASCII DXF at a dialect version
    pub fn save<P: AsRef<Path>>(&mut self, path: P, version: DxfVersion) -> Result<()> {
        DxfWriter::new(version)?.write_to_file(self, path)
    }

    /// Save as binary DXF at a dialect version
    pub fn save_binary<P: AsRef<Path>>(&mut self, path: P, version: DxfVersion) -> Result<()> {
        DxfWriter::new_binary(version)?.write_to_file(self, path)
    }

    /// Serialize to an in-memory tag stream
    pub fn to_bytes(&mut self, version: DxfVersion, binary: bool) -> Result<Vec<u8>> {
        let writer = if binary {
            DxfWriter::new_binary(version)?
        } else {
            DxfWriter::new(version)?
        };
        writer.write_to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_old_versions_rejected() {
        assert!(matches!(
            DxfWriter::new(DxfVersion::AC1009),
            Err(DxfError::UnsupportedVersion(_))
        ));
        assert!(DxfWriter::new(DxfVersion::AC1015).is_ok());
    }

    #[test]
    fn test_write_is_deterministic() {
        let mut doc = CadDocument::new();
        let first = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
        let second = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ascii_output_ends_with_eof() {
        let mut doc = CadDocument::new();
        let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.ends_with("  0\nEOF\n"));
    }
}
