//! Group code ranges and their value kinds
//!
//! The published format assigns a value type to every group code range;
//! both encodings rely on this table, the binary one to know how many
//! bytes a value occupies.

use crate::error::{DxfError, Result};

/// The value kind a group code carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupValueKind {
    Str,
    Double,
    Int16,
    Int32,
    Int64,
    Bool,
    Handle,
    Bytes,
}

/// Value kind for a group code, per the published range table
pub fn value_kind(code: i32) -> Result<GroupValueKind> {
    use GroupValueKind::*;
    let kind = match code {
        0..=4 => Str,
        5 => Handle,
        6..=9 => Str,
        10..=59 => Double,
        60..=79 => Int16,
        90..=99 => Int32,
        100 | 102 => Str,
        105 => Handle,
        110..=149 => Double,
        160..=169 => Int64,
        170..=179 => Int16,
        210..=239 => Double,
        270..=289 => Int16,
        290..=299 => Bool,
        300..=309 => Str,
        310..=319 => Bytes,
        320..=369 => Handle,
        370..=389 => Int16,
        390..=399 => Handle,
        400..=409 => Int16,
        410..=419 => Str,
        420..=429 => Int32,
        430..=439 => Str,
        440..=459 => Int32,
        460..=469 => Double,
        470..=479 => Str,
        480..=481 => Handle,
        999 => Str,
        1000..=1003 => Str,
        1004 => Bytes,
        1005 => Handle,
        1010..=1059 => Double,
        1060..=1070 => Int16,
        1071 => Int32,
        _ => return Err(DxfError::InvalidCode(code)),
    };
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_codes() {
        assert_eq!(value_kind(0).unwrap(), GroupValueKind::Str);
        assert_eq!(value_kind(5).unwrap(), GroupValueKind::Handle);
        assert_eq!(value_kind(10).unwrap(), GroupValueKind::Double);
        assert_eq!(value_kind(62).unwrap(), GroupValueKind::Int16);
        assert_eq!(value_kind(90).unwrap(), GroupValueKind::Int32);
        assert_eq!(value_kind(290).unwrap(), GroupValueKind::Bool);
        assert_eq!(value_kind(310).unwrap(), GroupValueKind::Bytes);
        assert_eq!(value_kind(330).unwrap(), GroupValueKind::Handle);
        assert_eq!(value_kind(420).unwrap(), GroupValueKind::Int32);
        assert_eq!(value_kind(999).unwrap(), GroupValueKind::Str);
        assert_eq!(value_kind(1004).unwrap(), GroupValueKind::Bytes);
        assert_eq!(value_kind(1071).unwrap(), GroupValueKind::Int32);
    }

    #[test]
    fn test_invalid_code() {
        assert!(value_kind(-10).is_err());
        assert!(value_kind(2000).is_err());
    }
}
