//! Drawing header variables
//!
//! Well-known variables get typed fields. Anything else found in a HEADER
//! section is kept verbatim, group by group, and written back unchanged, so
//! vendor-specific variables survive a round trip even though this crate
//! does not interpret them.

use crate::types::{Color, LineWeight, Units, Vector2, Vector3};
use indexmap::IndexMap;

/// Header variables of a document
#[derive(Debug, Clone)]
pub struct HeaderVariables {
    /// $DWGCODEPAGE - code page of pre-2007 files
    pub code_page: String,
    /// $INSBASE - model space insertion base point
    pub insertion_base: Vector3,
    /// $EXTMIN - drawing extents minimum
    pub extents_min: Vector3,
    /// $EXTMAX - drawing extents maximum
    pub extents_max: Vector3,
    /// $LIMMIN - drawing limits minimum
    pub limits_min: Vector2,
    /// $LIMMAX - drawing limits maximum
    pub limits_max: Vector2,
    /// $CLAYER - current layer name
    pub current_layer: String,
    /// $CELTYPE - current line type name
    pub current_line_type: String,
    /// $TEXTSTYLE - current text style name
    pub current_text_style: String,
    /// $DIMSTYLE - current dimension style name
    pub current_dim_style: String,
    /// $CMLSTYLE - current multiline style name
    pub current_mline_style: String,
    /// $CECOLOR - current entity color
    pub current_color: Color,
    /// $CELWEIGHT - current entity line weight
    pub current_line_weight: LineWeight,
    /// $LTSCALE - global line type scale
    pub line_type_scale: f64,
    /// $TEXTSIZE - default text height
    pub text_height: f64,
    /// $ANGBASE - base angle
    pub angle_base: f64,
    /// $ANGDIR - angular direction (0 = counter-clockwise)
    pub angle_direction: i16,
    /// $ATTMODE - attribute display mode
    pub attribute_visibility: i16,
    /// $PDMODE - point display mode
    pub point_display_mode: i16,
    /// $PDSIZE - point display size
    pub point_display_size: f64,
    /// $LUNITS - linear unit format
    pub linear_unit_format: i16,
    /// $LUPREC - linear unit precision
    pub linear_unit_precision: i16,
    /// $AUNITS - angular unit format
    pub angular_unit_format: i16,
    /// $AUPREC - angular unit precision
    pub angular_unit_precision: i16,
    /// $INSUNITS - document insertion units
    pub insertion_units: Units,
    /// $MEASUREMENT - 0 = imperial, 1 = metric
    pub measurement: i16,
    /// $TDCREATE - creation time as a Julian date
    pub create_date: f64,
    /// $TDUPDATE - last update time as a Julian date
    pub update_date: f64,
    /// $LASTSAVEDBY - name recorded by the last writer
    pub last_saved_by: String,
    /// Unrecognized variables, verbatim `(code, value)` runs keyed by the
    /// `$NAME`, in file order
    pub custom: IndexMap<String, Vec<(i32, String)>>,
}

impl Default for HeaderVariables {
    fn default() -> Self {
        Self {
            code_page: "ANSI_1252".to_string(),
            insertion_base: Vector3::ZERO,
            extents_min: Vector3::new(1e20, 1e20, 1e20),
            extents_max: Vector3::new(-1e20, -1e20, -1e20),
            limits_min: Vector2::ZERO,
            limits_max: Vector2::new(12.0, 9.0),
            current_layer: crate::tables::layer::DEFAULT_LAYER.to_string(),
            current_line_type: crate::tables::linetype::BY_LAYER.to_string(),
            current_text_style: crate::tables::textstyle::STANDARD.to_string(),
            current_dim_style: crate::tables::dimstyle::STANDARD.to_string(),
            current_mline_style: crate::tables::mlinestyle::STANDARD.to_string(),
            current_color: Color::ByLayer,
            current_line_weight: LineWeight::ByLayer,
            line_type_scale: 1.0,
            text_height: 2.5,
            angle_base: 0.0,
            angle_direction: 0,
            attribute_visibility: 1,
            point_display_mode: 0,
            point_display_size: 0.0,
            linear_unit_format: 2,
            linear_unit_precision: 4,
            angular_unit_format: 0,
            angular_unit_precision: 0,
            insertion_units: Units::Unitless,
            measurement: 0,
            create_date: 0.0,
            update_date: 0.0,
            last_saved_by: String::new(),
            custom: IndexMap::new(),
        }
    }
}

impl HeaderVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unrecognized variable verbatim
    pub fn set_custom(&mut self, name: impl Into<String>, pairs: Vec<(i32, String)>) {
        self.custom.insert(name.into(), pairs);
    }

    /// Look up an unrecognized variable
    pub fn custom(&self, name: &str) -> Option<&[(i32, String)]> {
        self.custom.get(name).map(|v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_reserved_entries() {
        let header = HeaderVariables::new();
        assert_eq!(header.current_layer, "0");
        assert_eq!(header.current_line_type, "ByLayer");
        assert_eq!(header.current_text_style, "Standard");
    }

    #[test]
    fn test_custom_bucket_roundtrip() {
        let mut header = HeaderVariables::new();
        header.set_custom("$MYVAR", vec![(70, "5".to_string())]);
        assert_eq!(header.custom("$MYVAR").unwrap(), &[(70, "5".to_string())]);
        assert!(header.custom("$OTHER").is_none());
    }
}
