//! The typed tag a DXF stream is made of

use super::code::{value_kind, GroupValueKind};
use crate::error::{DxfError, Result};
use crate::types::Handle;

/// A typed group value
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Str(String),
    Double(f64),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Bool(bool),
    Handle(u64),
    Bytes(Vec<u8>),
}

/// One group-code/value pair of the tag stream.
///
/// `raw` preserves the exact ASCII spelling of the value so unrecognized
/// data can be written back verbatim; binary reads synthesize a canonical
/// spelling.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub code: i32,
    pub value: TagValue,
    pub raw: String,
}

impl Tag {
    /// Parse an ASCII value line into a typed tag
    pub fn from_ascii(code: i32, raw: &str, line: usize) -> Result<Self> {
        let trimmed = raw.trim();
        let value = match value_kind(code)? {
            GroupValueKind::Str => TagValue::Str(trimmed.to_string()),
            GroupValueKind::Double => TagValue::Double(trimmed.parse::<f64>().map_err(|_| {
                DxfError::parse(line, format!("invalid double '{}' for code {}", trimmed, code))
            })?),
            GroupValueKind::Int16 => TagValue::Int16(parse_int(trimmed, line, code)? as i16),
            GroupValueKind::Int32 => TagValue::Int32(parse_int(trimmed, line, code)? as i32),
            GroupValueKind::Int64 => TagValue::Int64(parse_int(trimmed, line, code)?),
            GroupValueKind::Bool => TagValue::Bool(parse_int(trimmed, line, code)? != 0),
            GroupValueKind::Handle => {
                TagValue::Handle(u64::from_str_radix(trimmed, 16).map_err(|_| {
                    DxfError::parse(line, format!("invalid handle '{}' for code {}", trimmed, code))
                })?)
            }
            GroupValueKind::Bytes => TagValue::Bytes(parse_hex_bytes(trimmed, line)?),
        };
        Ok(Tag {
            code,
            value,
            raw: trimmed.to_string(),
        })
    }

    /// Build a tag from an already-typed value, synthesizing the raw form
    pub fn from_value(code: i32, value: TagValue) -> Self {
        let raw = match &value {
            TagValue::Str(s) => s.clone(),
            TagValue::Double(d) => d.to_string(),
            TagValue::Int16(i) => i.to_string(),
            TagValue::Int32(i) => i.to_string(),
            TagValue::Int64(i) => i.to_string(),
            TagValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            TagValue::Handle(h) => format!("{:X}", h),
            TagValue::Bytes(b) => b.iter().map(|x| format!("{:02X}", x)).collect(),
        };
        Tag { code, value, raw }
    }

    /// Whether this is `(code, value)` with a string value
    pub fn is(&self, code: i32, value: &str) -> bool {
        self.code == code && self.as_str() == value
    }

    /// String form of the value
    pub fn as_str(&self) -> &str {
        match &self.value {
            TagValue::Str(s) => s,
            _ => &self.raw,
        }
    }

    /// Double value; integer kinds widen
    pub fn as_f64(&self) -> Option<f64> {
        match &self.value {
            TagValue::Double(d) => Some(*d),
            TagValue::Int16(i) => Some(*i as f64),
            TagValue::Int32(i) => Some(*i as f64),
            TagValue::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match &self.value {
            TagValue::Int16(i) => Some(*i),
            TagValue::Int32(i) => i16::try_from(*i).ok(),
            TagValue::Int64(i) => i16::try_from(*i).ok(),
            TagValue::Bool(b) => Some(*b as i16),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match &self.value {
            TagValue::Int16(i) => Some(*i as i32),
            TagValue::Int32(i) => Some(*i),
            TagValue::Int64(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.value {
            TagValue::Bool(b) => Some(*b),
            TagValue::Int16(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_handle(&self) -> Option<Handle> {
        match &self.value {
            TagValue::Handle(h) => Some(Handle::new(*h)),
            TagValue::Str(s) => Handle::from_hex(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            TagValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

fn parse_int(s: &str, line: usize, code: i32) -> Result<i64> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    // Some writers emit integral fields with a decimal point
    s.parse::<f64>()
        .map(|v| v as i64)
        .map_err(|_| DxfError::parse(line, format!("invalid integer '{}' for code {}", s, code)))
}

fn parse_hex_bytes(s: &str, line: usize) -> Result<Vec<u8>> {
    let cleaned: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.len() % 2 != 0 {
        return Err(DxfError::parse(line, "odd-length hex data"));
    }
    (0..cleaned.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&cleaned[i..i + 2], 16)
                .map_err(|_| DxfError::parse(line, format!("invalid hex data '{}'", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_string_tag() {
        let tag = Tag::from_ascii(0, "SECTION", 1).unwrap();
        assert!(tag.is(0, "SECTION"));
    }

    #[test]
    fn test_ascii_double_tag() {
        let tag = Tag::from_ascii(10, " 1.5 ", 1).unwrap();
        assert_eq!(tag.as_f64(), Some(1.5));
    }

    #[test]
    fn test_ascii_handle_tag() {
        let tag = Tag::from_ascii(5, "1AF", 1).unwrap();
        assert_eq!(tag.as_handle(), Some(Handle::new(0x1AF)));
    }

    #[test]
    fn test_ascii_bytes_tag() {
        let tag = Tag::from_ascii(310, "DEADBEEF", 1).unwrap();
        assert_eq!(tag.as_bytes(), Some(&[0xDE, 0xAD, 0xBE, 0xEF][..]));
    }

    #[test]
    fn test_integral_double_tolerated() {
        let tag = Tag::from_ascii(70, "1.0", 1).unwrap();
        assert_eq!(tag.as_i16(), Some(1));
    }

    #[test]
    fn test_bad_value_is_parse_error() {
        assert!(Tag::from_ascii(10, "abc", 7).is_err());
        assert!(Tag::from_ascii(5, "xyz", 7).is_err());
    }
}
