//! Tag writer trait shared by the ASCII and binary encoders

use crate::error::Result;
use crate::types::{Handle, Vector2, Vector3};
use crate::xdata::chunk_bytes;

/// Pushes typed tags onto a stream
pub trait TagWriter {
    /// Write a string group
    fn write_str(&mut self, code: i32, value: &str) -> Result<()>;

    /// Write a double group
    fn write_f64(&mut self, code: i32, value: f64) -> Result<()>;

    /// Write a 16-bit integer group
    fn write_i16(&mut self, code: i32, value: i16) -> Result<()>;

    /// Write a 32-bit integer group
    fn write_i32(&mut self, code: i32, value: i32) -> Result<()>;

    /// Write a 64-bit integer group
    fn write_i64(&mut self, code: i32, value: i64) -> Result<()>;

    /// Write a boolean group
    fn write_bool(&mut self, code: i32, value: bool) -> Result<()>;

    /// Write a handle group (hex text in both encodings)
    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()>;

    /// Write one binary chunk group (at most 127 bytes)
    fn write_chunk(&mut self, code: i32, data: &[u8]) -> Result<()>;

    /// Write a value whose ASCII spelling must be preserved verbatim
    fn write_raw(&mut self, code: i32, raw: &str) -> Result<()>;

    /// Flush the underlying stream
    fn flush(&mut self) -> Result<()>;
}

/// Convenience helpers layered over [`TagWriter`]
pub trait TagWriterExt: TagWriter {
    /// Write a 2D point (codes `base`, `base`+10)
    fn write_point2(&mut self, base: i32, point: Vector2) -> Result<()> {
        self.write_f64(base, point.x)?;
        self.write_f64(base + 10, point.y)
    }

    /// Write a 3D point (codes `base`, `base`+10, `base`+20)
    fn write_point3(&mut self, base: i32, point: Vector3) -> Result<()> {
        self.write_f64(base, point.x)?;
        self.write_f64(base + 10, point.y)?;
        self.write_f64(base + 20, point.z)
    }

    /// Write a byte value split into wire-sized chunks
    fn write_bytes(&mut self, code: i32, data: &[u8]) -> Result<()> {
        for chunk in chunk_bytes(data) {
            self.write_chunk(code, chunk)?;
        }
        Ok(())
    }

    /// Write a subclass marker
    fn write_subclass(&mut self, marker: &str) -> Result<()> {
        self.write_str(100, marker)
    }

    /// Write a section header
    fn write_section_start(&mut self, name: &str) -> Result<()> {
        self.write_str(0, "SECTION")?;
        self.write_str(2, name)
    }

    /// Write a section end marker
    fn write_section_end(&mut self) -> Result<()> {
        self.write_str(0, "ENDSEC")
    }
}

impl<T: TagWriter + ?Sized> TagWriterExt for T {}

/// ASCII spelling of a double, bounded precision.
///
/// Integral values get one decimal; everything else is written with at
/// most fifteen fractional digits, trailing zeros trimmed. The result
/// parses back to a value that formats identically, which is what makes
/// ASCII round trips byte-stable.
pub fn format_double(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        let formatted = format!("{:.15}", value);
        let trimmed = formatted.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integral() {
        assert_eq!(format_double(1.0), "1.0");
        assert_eq!(format_double(-3.0), "-3.0");
        assert_eq!(format_double(0.0), "0.0");
    }

    #[test]
    fn test_format_fractional() {
        assert_eq!(format_double(1.5), "1.500000000000000".trim_end_matches('0'));
        assert_eq!(format_double(0.25), "0.25");
    }

    #[test]
    fn test_format_is_reparse_stable() {
        for v in [1.5, 0.1, 123.456, -0.0625, 1e20, 3.141592653589793] {
            let s1 = format_double(v);
            let s2 = format_double(s1.parse::<f64>().unwrap());
            assert_eq!(s1, s2, "unstable for {}", v);
        }
    }
}
