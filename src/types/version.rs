//! DXF dialect versions and the per-version feature gates

use std::fmt;

/// DXF dialect version ($ACADVER)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DxfVersion {
    /// Version string not recognized
    Unknown,
    /// AutoCAD R12
    AC1009,
    /// AutoCAD R13
    AC1012,
    /// AutoCAD R14
    AC1014,
    /// AutoCAD 2000
    AC1015,
    /// AutoCAD 2004
    AC1018,
    /// AutoCAD 2007
    AC1021,
    /// AutoCAD 2010
    AC1024,
    /// AutoCAD 2013
    AC1027,
    /// AutoCAD 2018
    AC1032,
}

impl DxfVersion {
    /// Parse the $ACADVER header value
    pub fn from_version_string(s: &str) -> Self {
        match s.trim() {
            "AC1009" => DxfVersion::AC1009,
            "AC1012" => DxfVersion::AC1012,
            "AC1014" => DxfVersion::AC1014,
            "AC1015" => DxfVersion::AC1015,
            "AC1018" => DxfVersion::AC1018,
            "AC1021" => DxfVersion::AC1021,
            "AC1024" => DxfVersion::AC1024,
            "AC1027" => DxfVersion::AC1027,
            "AC1032" => DxfVersion::AC1032,
            _ => DxfVersion::Unknown,
        }
    }

    /// The $ACADVER wire string
    pub fn to_dxf_string(&self) -> &'static str {
        match self {
            DxfVersion::Unknown => "AC1032",
            DxfVersion::AC1009 => "AC1009",
            DxfVersion::AC1012 => "AC1012",
            DxfVersion::AC1014 => "AC1014",
            DxfVersion::AC1015 => "AC1015",
            DxfVersion::AC1018 => "AC1018",
            DxfVersion::AC1021 => "AC1021",
            DxfVersion::AC1024 => "AC1024",
            DxfVersion::AC1027 => "AC1027",
            DxfVersion::AC1032 => "AC1032",
        }
    }

    /// Whether the writer supports emitting this dialect.
    ///
    /// AC1015 (AutoCAD 2000) is the floor; older dialects use a different
    /// tag layout and are read-only.
    pub fn is_writable(&self) -> bool {
        *self >= DxfVersion::AC1015
    }

    /// True color (code 420) exists from AC1018 on
    pub fn supports_true_color(&self) -> bool {
        *self >= DxfVersion::AC1018
    }

    /// Transparency (code 440) exists from AC1018 on
    pub fn supports_transparency(&self) -> bool {
        *self >= DxfVersion::AC1018
    }

    /// From AC1021 on files are always UTF-8; before that $DWGCODEPAGE rules
    pub fn is_unicode(&self) -> bool {
        *self >= DxfVersion::AC1021
    }
}

impl Default for DxfVersion {
    fn default() -> Self {
        DxfVersion::AC1032
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_dxf_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_string_roundtrip() {
        for v in [
            DxfVersion::AC1015,
            DxfVersion::AC1018,
            DxfVersion::AC1021,
            DxfVersion::AC1024,
            DxfVersion::AC1027,
            DxfVersion::AC1032,
        ] {
            assert_eq!(DxfVersion::from_version_string(v.to_dxf_string()), v);
        }
        assert_eq!(
            DxfVersion::from_version_string("AC9999"),
            DxfVersion::Unknown
        );
    }

    #[test]
    fn test_feature_gates() {
        assert!(!DxfVersion::AC1015.supports_true_color());
        assert!(DxfVersion::AC1018.supports_true_color());
        assert!(!DxfVersion::AC1015.supports_transparency());
        assert!(!DxfVersion::AC1009.is_writable());
        assert!(DxfVersion::AC1015.is_writable());
    }

    #[test]
    fn test_version_ordering() {
        assert!(DxfVersion::AC1015 < DxfVersion::AC1032);
        assert!(DxfVersion::AC1021 >= DxfVersion::AC1021);
    }
}
