//! Version probe
//!
//! Reports a stream's dialect version and encoding without building a
//! document. The caller's stream position is restored on every path.

use super::reader::{BinaryTagReader, TagReader, TextTagReader, BINARY_SENTINEL};
use crate::error::Result;
use crate::types::DxfVersion;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// What a probe learned about a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DxfProbe {
    /// Dialect version from $ACADVER; `Unknown` when the header lacks one
    pub version: DxfVersion,
    /// Whether the stream is the packed binary encoding
    pub is_binary: bool,
}

/// Probe a borrowed stream for its version and encoding
pub fn probe<R: Read + Seek>(source: &mut R) -> Result<DxfProbe> {
    let start = source.stream_position()?;

    let mut sentinel = [0u8; 22];
    let mut filled = 0usize;
    while filled < sentinel.len() {
        let n = source.read(&mut sentinel[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    let is_binary = filled == sentinel.len() && &sentinel[..] == BINARY_SENTINEL;
    source.seek(SeekFrom::Start(start))?;

    let version = {
        let mut tags: Box<dyn TagReader + '_> = if is_binary {
            Box::new(BinaryTagReader::new(BufReader::new(&mut *source))?)
        } else {
            Box::new(TextTagReader::new(BufReader::new(&mut *source))?)
        };
        scan_version(tags.as_mut())?
    };

    source.seek(SeekFrom::Start(start))?;
    Ok(DxfProbe { version, is_binary })
}

/// Probe a file path
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<DxfProbe> {
    let mut file = File::open(path)?;
    probe(&mut file)
}

/// Read just far enough into the HEADER section to find $ACADVER
fn scan_version(tags: &mut dyn TagReader) -> Result<DxfVersion> {
    let mut at_section_name = false;
    while let Some(tag) = tags.read_tag()? {
        if tag.is(0, "EOF") || tag.is(0, "ENDSEC") {
            break;
        }
        if at_section_name && tag.code == 2 && tag.as_str() != "HEADER" {
            // the first section is not HEADER; there is no version to find
            break;
        }
        at_section_name = tag.is(0, "SECTION");
        if tag.code == 9 && tag.as_str() == "$ACADVER" {
            if let Some(value) = tags.read_tag()? {
                return Ok(DxfVersion::from_version_string(value.as_str()));
            }
        }
    }
    Ok(DxfVersion::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_probe_ascii() {
        let data = "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1027\n  0\nENDSEC\n  0\nEOF\n";
        let mut cursor = Cursor::new(data.as_bytes().to_vec());
        let info = probe(&mut cursor).unwrap();
        assert_eq!(info.version, DxfVersion::AC1027);
        assert!(!info.is_binary);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_probe_versionless_stream() {
        let data = "  0\nSECTION\n  2\nENTITIES\n  0\nENDSEC\n  0\nEOF\n";
        let mut cursor = Cursor::new(data.as_bytes().to_vec());
        let info = probe(&mut cursor).unwrap();
        assert_eq!(info.version, DxfVersion::Unknown);
    }
}
