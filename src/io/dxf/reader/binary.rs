//! Packed binary tag stream decoder

use super::stream::{TagReader, BINARY_SENTINEL};
use crate::error::{DxfError, Result};
use crate::io::dxf::code::{value_kind, GroupValueKind};
use crate::io::dxf::code_page::decode_text;
use crate::io::dxf::tag::{Tag, TagValue};
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::Encoding;
use std::io::{BufReader, Read, Seek, SeekFrom};

/// Reads the packed binary tag stream.
///
/// Group codes come as 2-byte little-endian words; the legacy variant uses
/// a single byte with 255 escaping a 2-byte extension. Which form a file
/// uses is sniffed once from its first pair.
pub struct BinaryTagReader<R: Read + Seek> {
    reader: BufReader<R>,
    start: u64,
    pending: Option<Tag>,
    /// Legacy one-byte group codes with the 255 escape
    one_byte_codes: bool,
    encoding: Option<&'static Encoding>,
}

impl<R: Read + Seek> BinaryTagReader<R> {
    /// Create a reader positioned at the sentinel
    pub fn new(mut reader: BufReader<R>) -> Result<Self> {
        let start = reader.stream_position()?;
        let mut sentinel = [0u8; 22];
        reader.read_exact(&mut sentinel).map_err(|_| {
            DxfError::InvalidHeader("stream too short for a binary sentinel".to_string())
        })?;
        if &sentinel[..] != BINARY_SENTINEL {
            return Err(DxfError::InvalidHeader(
                "missing binary DXF sentinel".to_string(),
            ));
        }
        // The first pair is (0, "SECTION"). In the two-byte form the code
        // is 00 00; in the one-byte form a nonzero byte follows the 0.
        let probe = [reader.read_u8()?, reader.read_u8()?];
        let one_byte_codes = !(probe[0] == 0 && probe[1] == 0);
        // Re-position just after the sentinel for the real pass
        reader.seek(SeekFrom::Start(start + 22))?;
        Ok(Self {
            reader,
            start,
            pending: None,
            one_byte_codes,
            encoding: None,
        })
    }

    fn read_code(&mut self) -> Result<Option<i32>> {
        if self.one_byte_codes {
            let byte = match self.reader.read_u8() {
                Ok(b) => b,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            if byte == 255 {
                Ok(Some(self.reader.read_i16::<LittleEndian>()? as i32))
            } else {
                Ok(Some(byte as i32))
            }
        } else {
            match self.reader.read_i16::<LittleEndian>() {
                Ok(code) => Ok(Some(code as i32)),
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
    }

    fn read_null_string(&mut self) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            let byte = self.reader.read_u8()?;
            if byte == 0 {
                break;
            }
            bytes.push(byte);
        }
        Ok(decode_text(&bytes, self.encoding))
    }
}

impl<R: Read + Seek> TagReader for BinaryTagReader<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        if let Some(tag) = self.pending.take() {
            return Ok(Some(tag));
        }
        let code = match self.read_code()? {
            Some(code) => code,
            None => return Ok(None),
        };
        let value = match value_kind(code)? {
            GroupValueKind::Str => TagValue::Str(self.read_null_string()?),
            GroupValueKind::Double => TagValue::Double(self.reader.read_f64::<LittleEndian>()?),
            GroupValueKind::Int16 => TagValue::Int16(self.reader.read_i16::<LittleEndian>()?),
            GroupValueKind::Int32 => TagValue::Int32(self.reader.read_i32::<LittleEndian>()?),
            GroupValueKind::Int64 => TagValue::Int64(self.reader.read_i64::<LittleEndian>()?),
            GroupValueKind::Bool => TagValue::Bool(self.reader.read_u8()? != 0),
            GroupValueKind::Handle => {
                let text = self.read_null_string()?;
                let value = u64::from_str_radix(text.trim(), 16).map_err(|_| {
                    DxfError::InvalidHeader(format!("invalid handle '{}' for code {}", text, code))
                })?;
                TagValue::Handle(value)
            }
            GroupValueKind::Bytes => {
                let len = self.reader.read_u8()? as usize;
                let mut data = vec![0u8; len];
                self.reader.read_exact(&mut data)?;
                TagValue::Bytes(data)
            }
        };
        Ok(Some(Tag::from_value(code, value)))
    }

    fn push_back(&mut self, tag: Tag) {
        self.pending = Some(tag);
    }

    fn reset(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(self.start + 22))?;
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

    fn binary_stream(body: &[u8]) -> BinaryTagReader<Cursor<Vec<u8>>> {
        let mut data = BINARY_SENTINEL.to_vec();
        data.extend_from_slice(body);
        BinaryTagReader::new(BufReader::new(Cursor::new(data))).unwrap()
    }

    #[test]
    fn test_two_byte_codes() {
        // (0, "SECTION")
        let mut body = vec![0u8, 0u8];
        body.extend_from_slice(b"SECTION\0");
        let mut r = binary_stream(&body);
        assert!(!r.one_byte_codes);
        let tag = r.read_tag().unwrap().unwrap();
        assert!(tag.is(0, "SECTION"));
        assert!(r.read_tag().unwrap().is_none());
    }

    #[test]
    fn test_one_byte_codes_with_escape() {
        let mut body = vec![0u8];
        body.extend_from_slice(b"SECTION\0");
        // code 330 via the 255 escape, value "1F"
        body.push(255);
        body.extend_from_slice(&330i16.to_le_bytes());
        body.extend_from_slice(b"1F\0");
        let mut r = binary_stream(&body);
        assert!(r.one_byte_codes);
        let tag = r.read_tag().unwrap().unwrap();
        assert!(tag.is(0, "SECTION"));
        let tag = r.read_tag().unwrap().unwrap();
        assert_eq!(tag.code, 330);
        assert_eq!(tag.as_handle().unwrap().value(), 0x1F);
    }

    #[test]
    fn test_double_value() {
        let mut body = vec![0u8, 0u8];
        body.extend_from_slice(b"X\0");
        body.extend_from_slice(&10i16.to_le_bytes());
        body.extend_from_slice(&1.5f64.to_le_bytes());
        let mut r = binary_stream(&body);
        let _ = r.read_tag().unwrap();
        let tag = r.read_tag().unwrap().unwrap();
        assert_eq!(tag.as_f64(), Some(1.5));
    }

    #[test]
    fn test_missing_sentinel_rejected() {
        let data = b"not a dxf".to_vec();
        assert!(BinaryTagReader::new(BufReader::new(Cursor::new(data))).is_err());
    }
}
