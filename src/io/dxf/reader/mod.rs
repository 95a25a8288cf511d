//! DXF reader

mod binary;
mod sections;
mod stream;
mod text;

pub use binary::BinaryTagReader;
pub use sections::{PendingRefs, RawDictionary, SectionReader};
pub use stream::{TagReader, BINARY_SENTINEL};
pub use text::TextTagReader;

use crate::document::CadDocument;
use crate::error::Result;
use crate::notification::NotificationKind;
use crate::tables::{table_key, TableEntry};
use crate::types::DxfVersion;
use ahash::AHashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Configuration for the DXF reader
#[derive(Debug, Clone, Default)]
pub struct DxfReaderConfiguration {
    /// When `true`, per-section errors are caught and reported as
    /// notifications instead of aborting the read. Structural errors before
    /// the first section remain fatal.
    pub failsafe: bool,
    /// Folders searched by collaborators for shape and line type definition
    /// files; the codec itself only threads them through.
    pub search_paths: Vec<PathBuf>,
}

/// DXF file reader.
///
/// Accepts ASCII and binary streams, telling them apart by sniffing the
/// leading bytes. Streams supplied by the caller are borrowed, never
/// closed, and left positioned after the EOF marker.
pub struct DxfReader<'a> {
    tags: Box<dyn TagReader + 'a>,
    config: DxfReaderConfiguration,
}

impl DxfReader<'static> {
    /// Open a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }
}

impl<'a> DxfReader<'a> {
    /// Wrap any seekable byte source, owned or borrowed
    pub fn from_reader<R: Read + Seek + 'a>(mut source: R) -> Result<Self> {
        let is_binary = sniff_binary(&mut source)?;
        let tags: Box<dyn TagReader + 'a> = if is_binary {
            Box::new(BinaryTagReader::new(BufReader::new(source))?)
        } else {
            Box::new(TextTagReader::new(BufReader::new(source))?)
        };
        Ok(Self {
            tags,
            config: DxfReaderConfiguration::default(),
        })
    }

    /// Set the reader configuration
    pub fn with_configuration(mut self, config: DxfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Consume the stream and build a document
    pub fn read(mut self) -> Result<CadDocument> {
        self.prepare_encoding()?;

        let mut doc = CadDocument::empty();
        let mut pending = PendingRefs::default();
        let failsafe = self.config.failsafe;
        let mut seen_section = false;

        while let Some(tag) = self.tags.read_tag()? {
            if tag.code == 999 {
                if !seen_section {
                    doc.comments.push(tag.as_str().to_string());
                }
                continue;
            }
            if tag.is(0, "EOF") {
                break;
            }
            if !tag.is(0, "SECTION") {
                continue;
            }
            seen_section = true;
            let name = match self.tags.read_tag()? {
                Some(t) if t.code == 2 => t.as_str().to_string(),
                _ => continue,
            };
            let result = self.read_section(&name, &mut doc, &mut pending);
            if let Err(e) = result {
                if failsafe {
                    doc.notifications.notify(
                        NotificationKind::Error,
                        format!("error reading {} section: {}", name, e),
                    );
                    let _ = SectionReader::new(self.tags.as_mut()).skip_section();
                } else {
                    return Err(e);
                }
            }
        }

        resolve_pending(&mut doc, pending);
        doc.resolve_after_load();
        Ok(doc)
    }

    fn read_section(
        &mut self,
        name: &str,
        doc: &mut CadDocument,
        pending: &mut PendingRefs,
    ) -> Result<()> {
        let mut sections = SectionReader::new(self.tags.as_mut());
        match name {
            "HEADER" => sections.read_header(doc),
            "TABLES" => sections.read_tables(doc, pending),
            "BLOCKS" => sections.read_blocks(doc),
            "ENTITIES" => sections.read_entities(doc),
            "OBJECTS" => sections.read_objects(doc, pending),
            "CLASSES" => sections.skip_section(),
            other => {
                doc.notifications.notify(
                    NotificationKind::NotImplemented,
                    format!("{} section skipped", other),
                );
                sections.skip_section()
            }
        }
    }

    /// Pre-scan for $ACADVER and $DWGCODEPAGE, then rewind.
    ///
    /// Files older than AC1021 are decoded through the code page named in
    /// their header; newer files are always UTF-8.
    fn prepare_encoding(&mut self) -> Result<()> {
        let mut version = DxfVersion::Unknown;
        let mut code_page: Option<String> = None;

        'scan: while let Some(tag) = self.tags.read_tag()? {
            if !tag.is(0, "SECTION") {
                if tag.is(0, "EOF") {
                    break;
                }
                continue;
            }
            match self.tags.read_tag()? {
                Some(t) if t.is(2, "HEADER") => {
                    while let Some(header_tag) = self.tags.read_tag()? {
                        if header_tag.is(0, "ENDSEC") {
                            break 'scan;
                        }
                        if header_tag.code != 9 {
                            continue;
                        }
                        match header_tag.as_str() {
                            "$ACADVER" => {
                                if let Some(value) = self.tags.read_tag()? {
                                    version = DxfVersion::from_version_string(value.as_str());
                                }
                            }
                            "$DWGCODEPAGE" => {
                                if let Some(value) = self.tags.read_tag()? {
                                    code_page = Some(value.as_str().to_string());
                                }
                            }
                            _ => {}
                        }
                    }
                    break 'scan;
                }
                _ => break 'scan,
            }
        }

        if !version.is_unicode() {
            if let Some(cp) = code_page {
                if let Some(encoding) = super::code_page::encoding_from_code_page(&cp) {
                    self.tags.set_encoding(encoding);
                }
            }
        }
        self.tags.reset()
    }
}

/// Detect a binary stream by its sentinel, restoring the position
fn sniff_binary<R: Read + Seek>(source: &mut R) -> Result<bool> {
    let start = source.stream_position()?;
    let mut buffer = [0u8; 22];
    let mut filled = 0usize;
    while filled < buffer.len() {
        let n = source.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    source.seek(SeekFrom::Start(start))?;
    Ok(filled == buffer.len() && &buffer[..] == BINARY_SENTINEL)
}

/// Substitute the stashed handle references now that every object exists
fn resolve_pending(doc: &mut CadDocument, pending: PendingRefs) {
    // dimension style -> text style, by handle
    let mut text_styles: AHashMap<u64, String> = AHashMap::new();
    for style in doc.text_styles.iter() {
        text_styles.insert(style.handle.value(), style.name.clone());
    }
    for (dim_style, handle) in pending.dimstyle_text_styles {
        match text_styles.get(&handle.value()) {
            Some(name) => {
                let name = name.clone();
                if let Some(style) = doc.dim_styles.get_mut(&dim_style) {
                    style.text_style = name;
                }
            }
            None => {
                doc.notifications.notify(
                    NotificationKind::Substituted,
                    format!(
                        "text style {:#X} on dimension style '{}' -> 'Standard'",
                        handle.value(),
                        dim_style
                    ),
                );
            }
        }
    }

    // layouts bind to their space block through the block record handle
    let mut records: AHashMap<u64, String> = AHashMap::new();
    for block in doc.blocks.iter() {
        records.insert(block.record_handle.value(), block.name().to_string());
    }
    for (mut layout, block_handle) in pending.layouts {
        match records.get(&block_handle.value()) {
            Some(block_name) => {
                layout.block_name = block_name.clone();
                let layout_name = layout.name.clone();
                if let Some(block) = doc.blocks.get_mut(block_name) {
                    block.layout = Some(layout_name);
                }
                doc.insert_layout_raw(layout);
            }
            None => {
                doc.notifications.notify(
                    NotificationKind::Warning,
                    format!(
                        "layout '{}' references unknown block {:#X}; dropped",
                        layout.name,
                        block_handle.value()
                    ),
                );
            }
        }
    }

    // group names come from the ACAD_GROUP dictionary
    let group_names: AHashMap<u64, String> = pending
        .dictionaries
        .iter()
        .find(|d| d.owner.is_null())
        .and_then(|root| {
            root.entries
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("ACAD_GROUP"))
                .map(|(_, handle)| *handle)
        })
        .and_then(|group_dict| {
            pending
                .dictionaries
                .iter()
                .find(|d| d.handle == group_dict)
        })
        .map(|dict| {
            dict.entries
                .iter()
                .map(|(name, handle)| (handle.value(), name.clone()))
                .collect()
        })
        .unwrap_or_default();

    for (index, mut group) in pending.groups.into_iter().enumerate() {
        group.name = group_names
            .get(&group.handle.value())
            .cloned()
            .unwrap_or_else(|| format!("*A{}", index + 1));
        doc.groups.insert(table_key(&group.name), group);
    }
}

impl CadDocument {
    /// Load a document from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<CadDocument> {
        DxfReader::from_file(path)?.read()
    }

    /// Load a document from a borrowed seekable stream.
    ///
    /// The stream stays open. Several documents can share one stream at
    /// disjoint offsets; the caller records each start offset and seeks
    /// there before reading, since buffering leaves the position past the
    /// EOF marker.
    pub fn read_from<R: Read + Seek>(source: &mut R) -> Result<CadDocument> {
        DxfReader::from_reader(source)?.read()
    }
}

impl DxfReaderConfiguration {
    /// Failsafe configuration: recover from per-section errors
    pub fn failsafe() -> Self {
        Self {
            failsafe: true,
            search_paths: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sniff_ascii() {
        let mut cursor = Cursor::new(b"  0\nEOF\n".to_vec());
        assert!(!sniff_binary(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_sniff_binary_restores_position() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(b"EOF\0");
        let mut cursor = Cursor::new(data);
        assert!(sniff_binary(&mut cursor).unwrap());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_read_minimal_ascii() {
        let data = "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1032\n  0\nENDSEC\n  0\nEOF\n";
        let mut cursor = Cursor::new(data.as_bytes().to_vec());
        let doc = CadDocument::read_from(&mut cursor).unwrap();
        assert_eq!(doc.version, DxfVersion::AC1032);
        // defaults are completed after the load
        assert!(doc.layers.contains("0"));
    }
}
