//! ASCII tag stream encoder

use super::stream::{format_double, TagWriter};
use crate::error::Result;
use crate::types::Handle;
use std::io::Write;

/// Writes `code\nvalue\n` pairs, the code right-aligned in a three-column
/// field as the reference tools do.
pub struct TextTagWriter<W: Write> {
    writer: W,
}

impl<W: Write> TextTagWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_code(&mut self, code: i32) -> Result<()> {
        if (0..10).contains(&code) {
            writeln!(self.writer, "  {}", code)?;
        } else if (10..100).contains(&code) {
            writeln!(self.writer, " {}", code)?;
        } else {
            writeln!(self.writer, "{}", code)?;
        }
        Ok(())
    }

    /// Write a leading comment line (code 999)
    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        self.write_str(999, text)
    }
}

impl<W: Write> TagWriter for TextTagWriter<W> {
    fn write_str(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_f64(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", format_double(value))?;
        Ok(())
    }

    fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", if value { 1 } else { 0 })?;
        Ok(())
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{:X}", handle.value())?;
        Ok(())
    }

    fn write_chunk(&mut self, code: i32, data: &[u8]) -> Result<()> {
        self.write_code(code)?;
        for byte in data {
            write!(self.writer, "{:02X}", byte)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_raw(&mut self, code: i32, raw: &str) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", raw)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::writer::stream::TagWriterExt;
    use crate::types::Vector3;

    fn capture(f: impl FnOnce(&mut TextTagWriter<&mut Vec<u8>>)) -> String {
        let mut buf = Vec::new();
        {
            let mut w = TextTagWriter::new(&mut buf);
            f(&mut w);
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_code_alignment() {
        let out = capture(|w| {
            w.write_str(0, "LINE").unwrap();
            w.write_i16(62, 7).unwrap();
            w.write_str(100, "AcDbEntity").unwrap();
        });
        assert_eq!(out, "  0\nLINE\n 62\n7\n100\nAcDbEntity\n");
    }

    #[test]
    fn test_point3() {
        let out = capture(|w| {
            w.write_point3(10, Vector3::new(1.0, 2.0, 3.0)).unwrap();
        });
        assert_eq!(out, " 10\n1.0\n 20\n2.0\n 30\n3.0\n");
    }

    #[test]
    fn test_handle_hex() {
        let out = capture(|w| w.write_handle(5, Handle::new(255)).unwrap());
        assert_eq!(out, "  5\nFF\n");
    }

    #[test]
    fn test_bytes_chunked() {
        let data = vec![0xAB; 130];
        let out = capture(|w| w.write_bytes(310, &data).unwrap());
        // Two chunk groups: 127 + 3 bytes
        assert_eq!(out.matches("310\n").count(), 2);
    }
}
