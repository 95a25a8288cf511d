//! ASCII tag stream decoder

use super::stream::TagReader;
use crate::error::{DxfError, Result};
use crate::io::dxf::code_page::decode_text;
use crate::io::dxf::tag::Tag;
use encoding_rs::Encoding;
use std::io::{BufReader, Read, Seek, SeekFrom};

/// Reads `code\nvalue\n` pairs from an ASCII stream.
///
/// Lines are read byte-wise so that non-UTF-8 text can fall back to the
/// file's code page (or Latin-1) without poisoning the stream.
pub struct TextTagReader<R: Read + Seek> {
    reader: BufReader<R>,
    start: u64,
    line: usize,
    pending: Option<Tag>,
    encoding: Option<&'static Encoding>,
}

impl<R: Read + Seek> TextTagReader<R> {
    /// Create a reader at the stream's current position
    pub fn new(mut reader: BufReader<R>) -> Result<Self> {
        let start = reader.stream_position()?;
        Ok(Self {
            reader,
            start,
            line: 0,
            pending: None,
            encoding: None,
        })
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte)? {
                0 => {
                    if bytes.is_empty() {
                        return Ok(None);
                    }
                    break;
                }
                _ => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    bytes.push(byte[0]);
                }
            }
        }
        self.line += 1;
        let mut text = decode_text(&bytes, self.encoding);
        if text.ends_with('\r') {
            text.pop();
        }
        Ok(Some(text))
    }
}

impl<R: Read + Seek> TagReader for TextTagReader<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        if let Some(tag) = self.pending.take() {
            return Ok(Some(tag));
        }

        let code_line = match self.read_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        let code = code_line.trim().parse::<i32>().map_err(|_| {
            DxfError::parse(self.line, format!("invalid group code '{}'", code_line.trim()))
        })?;

        let value_line = self.read_line()?.ok_or_else(|| {
            DxfError::parse(self.line, format!("unexpected EOF after code {}", code))
        })?;

        Tag::from_ascii(code, &value_line, self.line).map(Some)
    }

    fn push_back(&mut self, tag: Tag) {
        self.pending = Some(tag);
    }

    fn reset(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(self.start))?;
        self.line = 0;
        self.pending = None;
        Ok(())
    }

    fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = Some(encoding);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: &str) -> TextTagReader<Cursor<Vec<u8>>> {
        TextTagReader::new(BufReader::new(Cursor::new(data.as_bytes().to_vec()))).unwrap()
    }

    #[test]
    fn test_read_pairs() {
        let mut r = reader("  0\nSECTION\n  2\nHEADER\n");
        let tag = r.read_tag().unwrap().unwrap();
        assert!(tag.is(0, "SECTION"));
        let tag = r.read_tag().unwrap().unwrap();
        assert!(tag.is(2, "HEADER"));
        assert!(r.read_tag().unwrap().is_none());
    }

    #[test]
    fn test_push_back() {
        let mut r = reader(" 10\n1.5\n");
        let tag = r.read_tag().unwrap().unwrap();
        r.push_back(tag);
        let tag = r.read_tag().unwrap().unwrap();
        assert_eq!(tag.as_f64(), Some(1.5));
    }

    #[test]
    fn test_crlf_lines() {
        let mut r = reader("  0\r\nEOF\r\n");
        let tag = r.read_tag().unwrap().unwrap();
        assert!(tag.is(0, "EOF"));
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut r = reader("  0\nEOF\n");
        let _ = r.read_tag().unwrap();
        r.reset().unwrap();
        let tag = r.read_tag().unwrap().unwrap();
        assert!(tag.is(0, "EOF"));
    }

    #[test]
    fn test_bad_code_is_parse_error() {
        let mut r = reader("nope\nvalue\n");
        assert!(matches!(r.read_tag(), Err(DxfError::Parse { .. })));
    }
}
