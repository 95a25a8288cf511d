//! Packed binary tag stream encoder

use super::stream::TagWriter;
use crate::error::Result;
use crate::io::dxf::code::{value_kind, GroupValueKind};
use crate::io::dxf::reader::BINARY_SENTINEL;
use crate::io::dxf::tag::Tag;
use crate::types::Handle;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

/// Writes the packed binary tag stream.
///
/// Group codes are always emitted as 2-byte little-endian words; values are
/// raw little-endian binary, so full double precision survives.
pub struct BinaryTagWriter<W: Write> {
    writer: W,
}

impl<W: Write> BinaryTagWriter<W> {
    /// Create a writer, emitting the sentinel
    pub fn new(mut writer: W) -> Result<Self> {
        writer.write_all(BINARY_SENTINEL)?;
        Ok(Self { writer })
    }

    fn write_code(&mut self, code: i32) -> Result<()> {
        self.writer.write_i16::<LittleEndian>(code as i16)?;
        Ok(())
    }

    fn write_null_string(&mut self, value: &str) -> Result<()> {
        self.writer.write_all(value.as_bytes())?;
        self.writer.write_u8(0)?;
        Ok(())
    }
}

impl<W: Write> TagWriter for BinaryTagWriter<W> {
    fn write_str(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        self.write_null_string(value)
    }

    fn write_f64(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_u8(value as u8)?;
        Ok(())
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        // Handles stay hex text even in the binary encoding
        self.write_code(code)?;
        self.write_null_string(&format!("{:X}", handle.value()))
    }

    fn write_chunk(&mut self, code: i32, data: &[u8]) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_u8(data.len() as u8)?;
        self.writer.write_all(data)?;
        Ok(())
    }

    fn write_raw(&mut self, code: i32, raw: &str) -> Result<()> {
        // Re-type the preserved ASCII spelling for the binary encoding
        match value_kind(code)? {
            GroupValueKind::Str => self.write_str(code, raw),
            _ => {
                let tag = Tag::from_ascii(code, raw, 0)?;
                match tag.value {
                    crate::io::dxf::tag::TagValue::Str(s) => self.write_str(code, &s),
                    crate::io::dxf::tag::TagValue::Double(d) => self.write_f64(code, d),
                    crate::io::dxf::tag::TagValue::Int16(i) => self.write_i16(code, i),
                    crate::io::dxf::tag::TagValue::Int32(i) => self.write_i32(code, i),
                    crate::io::dxf::tag::TagValue::Int64(i) => self.write_i64(code, i),
                    crate::io::dxf::tag::TagValue::Bool(b) => self.write_bool(code, b),
                    crate::io::dxf::tag::TagValue::Handle(h) => {
                        self.write_handle(code, Handle::new(h))
                    }
                    crate::io::dxf::tag::TagValue::Bytes(b) => self.write_chunk(code, &b),
                }
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_written() {
        let mut buf = Vec::new();
        {
            let _ = BinaryTagWriter::new(&mut buf).unwrap();
        }
        assert!(buf.starts_with(BINARY_SENTINEL));
    }

    #[test]
    fn test_string_layout() {
        let mut buf = Vec::new();
        {
            let mut w = BinaryTagWriter::new(&mut buf).unwrap();
            w.write_str(0, "LINE").unwrap();
        }
        let body = &buf[BINARY_SENTINEL.len()..];
        assert_eq!(&body[..2], &[0, 0]);
        assert_eq!(&body[2..6], b"LINE");
        assert_eq!(body[6], 0);
    }

    #[test]
    fn test_double_full_precision() {
        let value = std::f64::consts::PI;
        let mut buf = Vec::new();
        {
            let mut w = BinaryTagWriter::new(&mut buf).unwrap();
            w.write_f64(10, value).unwrap();
        }
        let body = &buf[BINARY_SENTINEL.len() + 2..];
        assert_eq!(body, &value.to_le_bytes());
    }

    #[test]
    fn test_chunk_length_prefixed() {
        let mut buf = Vec::new();
        {
            let mut w = BinaryTagWriter::new(&mut buf).unwrap();
            w.write_chunk(310, &[1, 2, 3]).unwrap();
        }
        let body = &buf[BINARY_SENTINEL.len()..];
        assert_eq!(body, &[54, 1, 3, 1, 2, 3]);
    }
}
