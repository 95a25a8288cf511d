//! Section writers
//!
//! Emits HEADER, CLASSES, TABLES, BLOCKS, ENTITIES and OBJECTS in the fixed
//! order the format requires. Every table object is written before anything
//! that references it and every block definition before any insert of it;
//! the section ordering guarantees both.

use super::stream::{TagWriter, TagWriterExt};
use crate::blocks::Block;
use crate::document::CadDocument;
use crate::entities::{
    Attribute, AttributeDefinition, Dimension, EntityCommon, EntityType, Hatch, Insert,
    LwPolyline, Text,
};
use crate::error::Result;
use crate::objects::{Group, Layout, RawObject};
use crate::tables::{AppId, DimStyle, Layer, LineType, MLineStyle, TextStyle, Ucs, View};
use crate::types::{Color, DxfVersion, Handle, LineWeight, Vector3};
use crate::xdata::{XData, XDataValue};

// Well-known fixed handles, shared across files for interoperability
pub(crate) const HANDLE_BLOCK_RECORD_TABLE: u64 = 0x1;
pub(crate) const HANDLE_LAYER_TABLE: u64 = 0x2;
pub(crate) const HANDLE_STYLE_TABLE: u64 = 0x3;
pub(crate) const HANDLE_LTYPE_TABLE: u64 = 0x5;
pub(crate) const HANDLE_VIEW_TABLE: u64 = 0x6;
pub(crate) const HANDLE_UCS_TABLE: u64 = 0x7;
pub(crate) const HANDLE_VPORT_TABLE: u64 = 0x8;
pub(crate) const HANDLE_APPID_TABLE: u64 = 0x9;
pub(crate) const HANDLE_DIMSTYLE_TABLE: u64 = 0xA;
pub(crate) const HANDLE_ROOT_DICT: u64 = 0xC;
pub(crate) const HANDLE_GROUP_DICT: u64 = 0xD;
pub(crate) const HANDLE_LAYOUT_DICT: u64 = 0xE;
pub(crate) const HANDLE_MLSTYLE_DICT: u64 = 0xF;

/// Per-version feature gates applied while writing
#[derive(Debug, Clone, Copy)]
struct Gates {
    true_color: bool,
    transparency: bool,
}

impl Gates {
    fn for_version(version: DxfVersion) -> Self {
        Gates {
            true_color: version.supports_true_color(),
            transparency: version.supports_transparency(),
        }
    }
}

/// Writes all DXF sections
pub struct SectionWriter<'a, W: TagWriter> {
    writer: &'a mut W,
    version: DxfVersion,
    gates: Gates,
}

impl<'a, W: TagWriter> SectionWriter<'a, W> {
    pub fn new(writer: &'a mut W, version: DxfVersion) -> Self {
        Self {
            writer,
            version,
            gates: Gates::for_version(version),
        }
    }

    /// Write every section of a document
    pub fn write_document(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_header(doc)?;
        self.write_classes()?;
        self.write_tables(doc)?;
        self.write_blocks(doc)?;
        self.write_entities(doc)?;
        self.write_objects(doc)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // HEADER
    // ------------------------------------------------------------------

    fn write_header(&mut self, doc: &CadDocument) -> Result<()> {
        let w = &mut *self.writer;
        let h = &doc.header;
        w.write_section_start("HEADER")?;

        w.write_str(9, "$ACADVER")?;
        w.write_str(1, self.version.to_dxf_string())?;
        w.write_str(9, "$DWGCODEPAGE")?;
        w.write_str(3, &h.code_page)?;
        w.write_str(9, "$HANDSEED")?;
        w.write_handle(5, Handle::new(doc.next_handle()))?;
        w.write_str(9, "$INSBASE")?;
        w.write_point3(10, h.insertion_base)?;
        w.write_str(9, "$EXTMIN")?;
        w.write_point3(10, h.extents_min)?;
        w.write_str(9, "$EXTMAX")?;
        w.write_point3(10, h.extents_max)?;
        w.write_str(9, "$LIMMIN")?;
        w.write_point2(10, h.limits_min)?;
        w.write_str(9, "$LIMMAX")?;
        w.write_point2(10, h.limits_max)?;
        w.write_str(9, "$CLAYER")?;
        w.write_str(8, &h.current_layer)?;
        w.write_str(9, "$CELTYPE")?;
        w.write_str(6, &h.current_line_type)?;
        w.write_str(9, "$TEXTSTYLE")?;
        w.write_str(7, &h.current_text_style)?;
        w.write_str(9, "$DIMSTYLE")?;
        w.write_str(2, &h.current_dim_style)?;
        w.write_str(9, "$CMLSTYLE")?;
        w.write_str(2, &h.current_mline_style)?;
        w.write_str(9, "$CECOLOR")?;
        w.write_i16(62, h.current_color.approximate_index())?;
        w.write_str(9, "$CELWEIGHT")?;
        w.write_i16(370, h.current_line_weight.value())?;
        w.write_str(9, "$LTSCALE")?;
        w.write_f64(40, h.line_type_scale)?;
        w.write_str(9, "$TEXTSIZE")?;
        w.write_f64(40, h.text_height)?;
        w.write_str(9, "$ANGBASE")?;
        w.write_f64(50, h.angle_base)?;
        w.write_str(9, "$ANGDIR")?;
        w.write_i16(70, h.angle_direction)?;
        w.write_str(9, "$ATTMODE")?;
        w.write_i16(70, h.attribute_visibility)?;
        w.write_str(9, "$PDMODE")?;
        w.write_i16(70, h.point_display_mode)?;
        w.write_str(9, "$PDSIZE")?;
        w.write_f64(40, h.point_display_size)?;
        w.write_str(9, "$LUNITS")?;
        w.write_i16(70, h.linear_unit_format)?;
        w.write_str(9, "$LUPREC")?;
        w.write_i16(70, h.linear_unit_precision)?;
        w.write_str(9, "$AUNITS")?;
        w.write_i16(70, h.angular_unit_format)?;
        w.write_str(9, "$AUPREC")?;
        w.write_i16(70, h.angular_unit_precision)?;
        w.write_str(9, "$INSUNITS")?;
        w.write_i16(70, h.insertion_units.value())?;
        w.write_str(9, "$MEASUREMENT")?;
        w.write_i16(70, h.measurement)?;
        w.write_str(9, "$TDCREATE")?;
        w.write_f64(40, h.create_date)?;
        w.write_str(9, "$TDUPDATE")?;
        w.write_f64(40, h.update_date)?;
        w.write_str(9, "$LASTSAVEDBY")?;
        w.write_str(1, &h.last_saved_by)?;

        for (name, pairs) in &h.custom {
            w.write_str(9, name)?;
            for (code, raw) in pairs {
                w.write_raw(*code, raw)?;
            }
        }

        w.write_section_end()
    }

    // ------------------------------------------------------------------
    // CLASSES
    // ------------------------------------------------------------------

    fn write_classes(&mut self) -> Result<()> {
        self.writer.write_section_start("CLASSES")?;
        self.writer.write_section_end()
    }

    // ------------------------------------------------------------------
    // TABLES
    // ------------------------------------------------------------------

    fn write_tables(&mut self, doc: &CadDocument) -> Result<()> {
        self.writer.write_section_start("TABLES")?;
        self.write_vport_table()?;
        self.write_ltype_table(doc)?;
        self.write_layer_table(doc)?;
        self.write_style_table(doc)?;
        self.write_view_table(doc)?;
        self.write_ucs_table(doc)?;
        self.write_appid_table(doc)?;
        self.write_dimstyle_table(doc)?;
        self.write_block_record_table(doc)?;
        self.writer.write_section_end()
    }

    fn write_table_start(&mut self, name: &str, count: usize, handle: u64) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, "TABLE")?;
        w.write_str(2, name)?;
        w.write_handle(5, Handle::new(handle))?;
        w.write_handle(330, Handle::NULL)?;
        w.write_subclass("AcDbSymbolTable")?;
        w.write_i16(70, count as i16)
    }

    fn write_table_end(&mut self) -> Result<()> {
        self.writer.write_str(0, "ENDTAB")
    }

    fn write_entry_prelude(
        &mut self,
        record: &str,
        handle: Handle,
        table_handle: u64,
        subclass: &str,
    ) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, record)?;
        // DIMSTYLE carries its handle on group 105 instead of 5
        let handle_code = if record == "DIMSTYLE" { 105 } else { 5 };
        w.write_handle(handle_code, handle)?;
        w.write_handle(330, Handle::new(table_handle))?;
        w.write_subclass("AcDbSymbolTableRecord")?;
        w.write_subclass(subclass)
    }

    fn write_vport_table(&mut self) -> Result<()> {
        // One hardcoded active viewport keeps third-party tools happy; the
        // document model does not track viewports.
        self.write_table_start("VPORT", 1, HANDLE_VPORT_TABLE)?;
        let w = &mut *self.writer;
        w.write_str(0, "VPORT")?;
        w.write_handle(5, Handle::new(0xB))?;
        w.write_handle(330, Handle::new(HANDLE_VPORT_TABLE))?;
        w.write_subclass("AcDbSymbolTableRecord")?;
        w.write_subclass("AcDbViewportTableRecord")?;
        w.write_str(2, "*Active")?;
        w.write_i16(70, 0)?;
        w.write_f64(10, 0.0)?;
        w.write_f64(20, 0.0)?;
        w.write_f64(11, 1.0)?;
        w.write_f64(21, 1.0)?;
        w.write_f64(12, 0.0)?;
        w.write_f64(22, 0.0)?;
        w.write_f64(40, 297.0)?;
        w.write_f64(41, 1.5)?;
        w.write_f64(42, 50.0)?;
        w.write_i16(71, 0)?;
        w.write_i16(72, 1000)?;
        self.write_table_end()
    }

    fn write_ltype_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("LTYPE", doc.line_types.len(), HANDLE_LTYPE_TABLE)?;
        for lt in doc.line_types.iter() {
            self.write_ltype_entry(lt)?;
        }
        self.write_table_end()
    }

    fn write_ltype_entry(&mut self, lt: &LineType) -> Result<()> {
        self.write_entry_prelude("LTYPE", lt.handle, HANDLE_LTYPE_TABLE, "AcDbLinetypeTableRecord")?;
        let w = &mut *self.writer;
        w.write_str(2, &lt.name)?;
        w.write_i16(70, 0)?;
        w.write_str(3, &lt.description)?;
        w.write_i16(72, 65)?;
        w.write_i16(73, lt.segments.len() as i16)?;
        w.write_f64(40, lt.pattern_length())?;
        for segment in &lt.segments {
            w.write_f64(49, segment.length)?;
            w.write_i16(74, 0)?;
        }
        write_xdata(w, &lt.xdata)
    }

    fn write_layer_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("LAYER", doc.layers.len(), HANDLE_LAYER_TABLE)?;
        for layer in doc.layers.iter() {
            self.write_layer_entry(layer)?;
        }
        self.write_table_end()
    }

    fn write_layer_entry(&mut self, layer: &Layer) -> Result<()> {
        self.write_entry_prelude("LAYER", layer.handle, HANDLE_LAYER_TABLE, "AcDbLayerTableRecord")?;
        let gates = self.gates;
        let w = &mut *self.writer;
        w.write_str(2, &layer.name)?;
        w.write_i16(70, layer.flags.bits() as i16)?;
        let index = layer.color.approximate_index();
        w.write_i16(62, if layer.is_off { -index } else { index })?;
        if gates.true_color {
            if let Some(rgb) = layer.color.true_color_value() {
                w.write_i32(420, rgb)?;
            }
        }
        w.write_str(6, &layer.line_type)?;
        w.write_bool(290, layer.is_plottable)?;
        w.write_i16(370, layer.line_weight.value())?;
        if gates.transparency && !layer.transparency.is_default() {
            w.write_i32(440, layer.transparency.value())?;
        }
        write_xdata(w, &layer.xdata)
    }

    fn write_style_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("STYLE", doc.text_styles.len(), HANDLE_STYLE_TABLE)?;
        for style in doc.text_styles.iter() {
            self.write_style_entry(style)?;
        }
        self.write_table_end()
    }

    fn write_style_entry(&mut self, style: &TextStyle) -> Result<()> {
        self.write_entry_prelude("STYLE", style.handle, HANDLE_STYLE_TABLE, "AcDbTextStyleTableRecord")?;
        let w = &mut *self.writer;
        w.write_str(2, &style.name)?;
        w.write_i16(70, 0)?;
        w.write_f64(40, style.height)?;
        w.write_f64(41, style.width_factor)?;
        w.write_f64(50, style.oblique_angle)?;
        w.write_i16(71, style.flags.bits() as i16)?;
        w.write_f64(42, style.last_height)?;
        w.write_str(3, &style.font)?;
        w.write_str(4, &style.big_font)?;
        write_xdata(w, &style.xdata)
    }

    fn write_view_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("VIEW", doc.views.len(), HANDLE_VIEW_TABLE)?;
        for view in doc.views.iter() {
            self.write_view_entry(view)?;
        }
        self.write_table_end()
    }

    fn write_view_entry(&mut self, view: &View) -> Result<()> {
        self.write_entry_prelude("VIEW", view.handle, HANDLE_VIEW_TABLE, "AcDbViewTableRecord")?;
        let w = &mut *self.writer;
        w.write_str(2, &view.name)?;
        w.write_i16(70, 0)?;
        w.write_f64(40, view.height)?;
        w.write_point2(10, view.center)?;
        w.write_f64(41, view.width)?;
        w.write_point3(11, view.direction)?;
        w.write_point3(12, view.target)?;
        w.write_f64(42, view.lens_length)?;
        w.write_f64(43, 0.0)?;
        w.write_f64(44, 0.0)?;
        w.write_f64(50, 0.0)?;
        w.write_i16(71, 0)?;
        write_xdata(w, &view.xdata)
    }

    fn write_ucs_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("UCS", doc.ucss.len(), HANDLE_UCS_TABLE)?;
        for ucs in doc.ucss.iter() {
            self.write_ucs_entry(ucs)?;
        }
        self.write_table_end()
    }

    fn write_ucs_entry(&mut self, ucs: &Ucs) -> Result<()> {
        self.write_entry_prelude("UCS", ucs.handle, HANDLE_UCS_TABLE, "AcDbUCSTableRecord")?;
        let w = &mut *self.writer;
        w.write_str(2, &ucs.name)?;
        w.write_i16(70, 0)?;
        w.write_point3(10, ucs.origin)?;
        w.write_point3(11, ucs.x_axis)?;
        w.write_point3(12, ucs.y_axis)?;
        write_xdata(w, &ucs.xdata)
    }

    fn write_appid_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("APPID", doc.app_ids.len(), HANDLE_APPID_TABLE)?;
        for app in doc.app_ids.iter() {
            self.write_appid_entry(app)?;
        }
        self.write_table_end()
    }

    fn write_appid_entry(&mut self, app: &AppId) -> Result<()> {
        self.write_entry_prelude("APPID", app.handle, HANDLE_APPID_TABLE, "AcDbRegAppTableRecord")?;
        let w = &mut *self.writer;
        w.write_str(2, &app.name)?;
        w.write_i16(70, 0)?;
        write_xdata(w, &app.xdata)
    }

    fn write_dimstyle_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("DIMSTYLE", doc.dim_styles.len(), HANDLE_DIMSTYLE_TABLE)?;
        for style in doc.dim_styles.iter() {
            self.write_dimstyle_entry(style, doc)?;
        }
        self.write_table_end()
    }

    fn write_dimstyle_entry(&mut self, style: &DimStyle, doc: &CadDocument) -> Result<()> {
        self.write_entry_prelude(
            "DIMSTYLE",
            style.handle,
            HANDLE_DIMSTYLE_TABLE,
            "AcDbDimStyleTableRecord",
        )?;
        let w = &mut *self.writer;
        w.write_str(2, &style.name)?;
        w.write_i16(70, 0)?;
        w.write_f64(40, style.scale)?;
        w.write_f64(41, style.arrow_size)?;
        w.write_f64(42, style.ext_line_offset)?;
        w.write_f64(44, style.ext_line_extension)?;
        w.write_f64(140, style.text_height)?;
        w.write_f64(147, style.text_gap)?;
        w.write_i16(176, style.line_color.approximate_index())?;
        w.write_i16(271, style.decimal_places)?;
        // Text style by handle; resolved by name after the whole file loads
        let text_style_handle = doc
            .text_styles
            .get(&style.text_style)
            .map(|s| s.handle)
            .unwrap_or(Handle::NULL);
        w.write_handle(340, text_style_handle)?;
        write_xdata(w, &style.xdata)
    }

    fn write_block_record_table(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_table_start("BLOCK_RECORD", doc.blocks.len(), HANDLE_BLOCK_RECORD_TABLE)?;
        for block in doc.blocks.iter() {
            self.write_block_record_entry(block, doc)?;
        }
        self.write_table_end()
    }

    fn write_block_record_entry(&mut self, block: &Block, doc: &CadDocument) -> Result<()> {
        self.write_entry_prelude(
            "BLOCK_RECORD",
            block.record_handle,
            HANDLE_BLOCK_RECORD_TABLE,
            "AcDbBlockTableRecord",
        )?;
        let w = &mut *self.writer;
        w.write_str(2, &block.name)?;
        let layout_handle = block
            .layout
            .as_deref()
            .and_then(|name| doc.layout(name))
            .map(|l| l.handle)
            .unwrap_or(Handle::NULL);
        w.write_handle(340, layout_handle)?;
        w.write_i16(70, block.units.unwrap_or_default().value())?;
        w.write_i16(280, 1)?;
        w.write_i16(281, 0)
    }

    // ------------------------------------------------------------------
    // BLOCKS
    // ------------------------------------------------------------------

    fn write_blocks(&mut self, doc: &CadDocument) -> Result<()> {
        self.writer.write_section_start("BLOCKS")?;
        for block in doc.blocks.iter() {
            self.write_block(block, doc)?;
        }
        self.writer.write_section_end()
    }

    fn write_block(&mut self, block: &Block, doc: &CadDocument) -> Result<()> {
        {
            let w = &mut *self.writer;
            w.write_str(0, "BLOCK")?;
            w.write_handle(5, block.block_handle)?;
            w.write_handle(330, block.record_handle)?;
            w.write_subclass("AcDbEntity")?;
            w.write_str(8, "0")?;
            w.write_subclass("AcDbBlockBegin")?;
            w.write_str(2, &block.name)?;
            let mut flags = 0i16;
            if !block.attribute_definitions().is_empty() {
                flags |= 2;
            }
            if block.is_xref {
                flags |= 4;
            }
            w.write_i16(70, flags)?;
            w.write_point3(10, block.base_point)?;
            w.write_str(3, &block.name)?;
            if block.is_xref {
                w.write_str(1, &block.xref_path)?;
            }
        }

        // Model space contents live in the ENTITIES section instead
        if !block.is_model_space() {
            for def in block.attribute_definitions() {
                self.write_attdef(def, block.record_handle)?;
            }
            for entity in block.entities() {
                self.write_entity(entity, block.record_handle, doc)?;
            }
        }

        let w = &mut *self.writer;
        w.write_str(0, "ENDBLK")?;
        w.write_handle(5, block.end_handle)?;
        w.write_handle(330, block.record_handle)?;
        w.write_subclass("AcDbEntity")?;
        w.write_str(8, "0")?;
        w.write_subclass("AcDbBlockEnd")
    }

    // ------------------------------------------------------------------
    // ENTITIES
    // ------------------------------------------------------------------

    fn write_entities(&mut self, doc: &CadDocument) -> Result<()> {
        self.writer.write_section_start("ENTITIES")?;
        if let Some(model) = doc.model_space() {
            for entity in model.entities() {
                self.write_entity(entity, model.record_handle, doc)?;
            }
        }
        self.writer.write_section_end()
    }

    fn write_entity(&mut self, entity: &EntityType, owner: Handle, doc: &CadDocument) -> Result<()> {
        match entity {
            EntityType::Point(e) => {
                self.write_common("POINT", &e.common, owner)?;
                let w = &mut *self.writer;
                w.write_subclass("AcDbPoint")?;
                w.write_point3(10, e.location)?;
                if e.thickness != 0.0 {
                    w.write_f64(39, e.thickness)?;
                }
                write_xdata(w, &e.common.xdata)
            }
            EntityType::Line(e) => {
                self.write_common("LINE", &e.common, owner)?;
                let w = &mut *self.writer;
                w.write_subclass("AcDbLine")?;
                if e.thickness != 0.0 {
                    w.write_f64(39, e.thickness)?;
                }
                w.write_point3(10, e.start)?;
                w.write_point3(11, e.end)?;
                if e.normal != Vector3::UNIT_Z {
                    w.write_point3(210, e.normal)?;
                }
                write_xdata(w, &e.common.xdata)
            }
            EntityType::Circle(e) => {
                self.write_common("CIRCLE", &e.common, owner)?;
                let w = &mut *self.writer;
                w.write_subclass("AcDbCircle")?;
                if e.thickness != 0.0 {
                    w.write_f64(39, e.thickness)?;
                }
                w.write_point3(10, e.center)?;
                w.write_f64(40, e.radius)?;
                if e.normal != Vector3::UNIT_Z {
                    w.write_point3(210, e.normal)?;
                }
                write_xdata(w, &e.common.xdata)
            }
            EntityType::Arc(e) => {
                self.write_common("ARC", &e.common, owner)?;
                let w = &mut *self.writer;
                w.write_subclass("AcDbCircle")?;
                if e.thickness != 0.0 {
                    w.write_f64(39, e.thickness)?;
                }
                w.write_point3(10, e.center)?;
                w.write_f64(40, e.radius)?;
                w.write_subclass("AcDbArc")?;
                w.write_f64(50, e.start_angle)?;
                w.write_f64(51, e.end_angle)?;
                if e.normal != Vector3::UNIT_Z {
                    w.write_point3(210, e.normal)?;
                }
                write_xdata(w, &e.common.xdata)
            }
            EntityType::LwPolyline(e) => {
                self.write_common("LWPOLYLINE", &e.common, owner)?;
                self.write_lwpolyline(e)
            }
            EntityType::Text(e) => {
                self.write_common("TEXT", &e.common, owner)?;
                self.write_text(e)
            }
            EntityType::AttributeDefinition(e) => self.write_attdef(e, owner),
            EntityType::Insert(e) => self.write_insert(e, owner),
            EntityType::Hatch(e) => {
                self.write_common("HATCH", &e.common, owner)?;
                self.write_hatch(e)
            }
            EntityType::Dimension(e) => {
                self.write_common("DIMENSION", &e.common, owner)?;
                self.write_dimension(e, doc)
            }
        }
    }

    fn write_common(&mut self, record: &str, common: &EntityCommon, owner: Handle) -> Result<()> {
        let gates = self.gates;
        let w = &mut *self.writer;
        w.write_str(0, record)?;
        w.write_handle(5, common.handle)?;
        w.write_handle(330, owner)?;
        w.write_subclass("AcDbEntity")?;
        w.write_str(8, &common.layer)?;
        if !common.line_type.eq_ignore_ascii_case(crate::tables::linetype::BY_LAYER) {
            w.write_str(6, &common.line_type)?;
        }
        if common.color != Color::ByLayer {
            w.write_i16(62, common.color.approximate_index())?;
            if gates.true_color {
                if let Some(rgb) = common.color.true_color_value() {
                    w.write_i32(420, rgb)?;
                }
            }
        }
        if common.line_weight != LineWeight::ByLayer {
            w.write_i16(370, common.line_weight.value())?;
        }
        if common.line_type_scale != 1.0 {
            w.write_f64(48, common.line_type_scale)?;
        }
        if common.invisible {
            w.write_i16(60, 1)?;
        }
        if gates.transparency && !common.transparency.is_default() {
            w.write_i32(440, common.transparency.value())?;
        }
        Ok(())
    }

    fn write_lwpolyline(&mut self, e: &LwPolyline) -> Result<()> {
        let w = &mut *self.writer;
        w.write_subclass("AcDbPolyline")?;
        w.write_i32(90, e.vertices.len() as i32)?;
        w.write_i16(70, if e.is_closed { 1 } else { 0 })?;
        if e.constant_width != 0.0 {
            w.write_f64(43, e.constant_width)?;
        }
        if e.elevation != 0.0 {
            w.write_f64(38, e.elevation)?;
        }
        for vertex in &e.vertices {
            w.write_point2(10, vertex.point)?;
            if vertex.bulge != 0.0 {
                w.write_f64(42, vertex.bulge)?;
            }
        }
        write_xdata(w, &e.common.xdata)
    }

    fn write_text(&mut self, e: &Text) -> Result<()> {
        let w = &mut *self.writer;
        w.write_subclass("AcDbText")?;
        w.write_point3(10, e.position)?;
        w.write_f64(40, e.height)?;
        w.write_str(1, &e.value)?;
        if e.rotation != 0.0 {
            w.write_f64(50, e.rotation)?;
        }
        if e.width_factor != 1.0 {
            w.write_f64(41, e.width_factor)?;
        }
        if e.oblique_angle != 0.0 {
            w.write_f64(51, e.oblique_angle)?;
        }
        if !e.style.eq_ignore_ascii_case(crate::tables::textstyle::STANDARD) {
            w.write_str(7, &e.style)?;
        }
        w.write_subclass("AcDbText")?;
        write_xdata(w, &e.common.xdata)
    }

    fn write_attdef(&mut self, def: &AttributeDefinition, owner: Handle) -> Result<()> {
        self.write_common("ATTDEF", &def.common, owner)?;
        let w = &mut *self.writer;
        w.write_subclass("AcDbText")?;
        w.write_point3(10, def.position)?;
        w.write_f64(40, def.height)?;
        w.write_str(1, &def.value)?;
        if def.rotation != 0.0 {
            w.write_f64(50, def.rotation)?;
        }
        if !def.style.eq_ignore_ascii_case(crate::tables::textstyle::STANDARD) {
            w.write_str(7, &def.style)?;
        }
        w.write_subclass("AcDbAttributeDefinition")?;
        w.write_str(3, &def.prompt)?;
        w.write_str(2, &def.tag)?;
        w.write_i16(70, def.flags.bits() as i16)?;
        write_xdata(w, &def.common.xdata)
    }

    fn write_insert(&mut self, e: &Insert, owner: Handle) -> Result<()> {
        self.write_common("INSERT", &e.common, owner)?;
        {
            let w = &mut *self.writer;
            w.write_subclass("AcDbBlockReference")?;
            if !e.attributes.is_empty() {
                w.write_i16(66, 1)?;
            }
            w.write_str(2, &e.block_name)?;
            w.write_point3(10, e.position)?;
            if e.x_scale != 1.0 {
                w.write_f64(41, e.x_scale)?;
            }
            if e.y_scale != 1.0 {
                w.write_f64(42, e.y_scale)?;
            }
            if e.z_scale != 1.0 {
                w.write_f64(43, e.z_scale)?;
            }
            if e.rotation != 0.0 {
                w.write_f64(50, e.rotation)?;
            }
            if e.normal != Vector3::UNIT_Z {
                w.write_point3(210, e.normal)?;
            }
            write_xdata(w, &e.common.xdata)?;
        }
        for attr in &e.attributes {
            self.write_attribute(attr, owner)?;
        }
        if !e.attributes.is_empty() {
            let w = &mut *self.writer;
            w.write_str(0, "SEQEND")?;
            w.write_handle(5, e.seqend_handle)?;
            w.write_handle(330, owner)?;
            w.write_subclass("AcDbEntity")?;
            w.write_str(8, &e.common.layer)?;
        }
        Ok(())
    }

    fn write_attribute(&mut self, attr: &Attribute, owner: Handle) -> Result<()> {
        self.write_common("ATTRIB", &attr.common, owner)?;
        let w = &mut *self.writer;
        w.write_subclass("AcDbText")?;
        w.write_point3(10, attr.position)?;
        w.write_f64(40, attr.height)?;
        w.write_str(1, &attr.value)?;
        if attr.rotation != 0.0 {
            w.write_f64(50, attr.rotation)?;
        }
        if !attr.style.eq_ignore_ascii_case(crate::tables::textstyle::STANDARD) {
            w.write_str(7, &attr.style)?;
        }
        w.write_subclass("AcDbAttribute")?;
        w.write_str(2, &attr.tag)?;
        w.write_i16(70, attr.flags.bits() as i16)?;
        write_xdata(w, &attr.common.xdata)
    }

    fn write_hatch(&mut self, e: &Hatch) -> Result<()> {
        let w = &mut *self.writer;
        w.write_subclass("AcDbHatch")?;
        w.write_f64(10, 0.0)?;
        w.write_f64(20, 0.0)?;
        w.write_f64(30, e.elevation)?;
        w.write_point3(210, Vector3::UNIT_Z)?;
        w.write_str(2, &e.pattern.name)?;
        w.write_i16(70, if e.pattern.is_solid() { 1 } else { 0 })?;
        w.write_i16(71, if e.is_associative { 1 } else { 0 })?;
        w.write_i32(91, e.paths.len() as i32)?;
        for path in &e.paths {
            let is_polyline = !path.vertices.is_empty();
            w.write_i32(92, if is_polyline { 2 } else { 0 })?;
            if is_polyline {
                let has_bulge = path.vertices.iter().any(|(_, b)| *b != 0.0);
                w.write_i16(72, if has_bulge { 1 } else { 0 })?;
                w.write_i16(73, if path.is_closed { 1 } else { 0 })?;
                w.write_i32(93, path.vertices.len() as i32)?;
                for (point, bulge) in &path.vertices {
                    w.write_point2(10, *point)?;
                    if has_bulge {
                        w.write_f64(42, *bulge)?;
                    }
                }
            } else {
                w.write_i32(93, path.edges.len() as i32)?;
                for edge in &path.edges {
                    match edge {
                        crate::entities::BoundaryEdge::Line { start, end } => {
                            w.write_i16(72, 1)?;
                            w.write_point2(10, *start)?;
                            w.write_point2(11, *end)?;
                        }
                        crate::entities::BoundaryEdge::Arc {
                            center,
                            radius,
                            start_angle,
                            end_angle,
                            counter_clockwise,
                        } => {
                            w.write_i16(72, 2)?;
                            w.write_point2(10, *center)?;
                            w.write_f64(40, *radius)?;
                            w.write_f64(50, *start_angle)?;
                            w.write_f64(51, *end_angle)?;
                            w.write_i16(73, if *counter_clockwise { 1 } else { 0 })?;
                        }
                    }
                }
            }
            w.write_i32(97, path.handles.len() as i32)?;
            for handle in &path.handles {
                w.write_handle(330, *handle)?;
            }
        }
        w.write_i16(75, 0)?;
        w.write_i16(76, 1)?;
        if !e.pattern.is_solid() {
            w.write_f64(52, e.pattern.angle)?;
            w.write_f64(41, e.pattern.scale)?;
            w.write_i16(78, 0)?;
        }
        w.write_i32(98, 0)?;
        write_xdata(w, &e.common.xdata)
    }

    fn write_dimension(&mut self, e: &Dimension, _doc: &CadDocument) -> Result<()> {
        let w = &mut *self.writer;
        w.write_subclass("AcDbDimension")?;
        w.write_point3(10, e.definition_point)?;
        w.write_point3(11, e.text_mid_point)?;
        w.write_i16(70, 32)?;
        if let Some(text) = &e.text_override {
            w.write_str(1, text)?;
        }
        w.write_str(3, &e.style)?;
        w.write_subclass("AcDbAlignedDimension")?;
        w.write_point3(13, e.first_point)?;
        w.write_point3(14, e.second_point)?;
        if e.rotation != 0.0 {
            w.write_f64(50, e.rotation)?;
        }
        write_xdata(w, &e.common.xdata)
    }

    // ------------------------------------------------------------------
    // OBJECTS
    // ------------------------------------------------------------------

    fn write_objects(&mut self, doc: &CadDocument) -> Result<()> {
        self.writer.write_section_start("OBJECTS")?;
        self.write_root_dictionary()?;
        self.write_group_dictionary(doc)?;
        self.write_layout_dictionary(doc)?;
        self.write_mlstyle_dictionary(doc)?;
        for layout in doc.layouts() {
            self.write_layout(layout, doc)?;
        }
        for style in doc.mline_styles.iter() {
            self.write_mline_style(style)?;
        }
        for group in doc.groups.values() {
            self.write_group(group)?;
        }
        for object in &doc.raw_objects {
            self.write_raw_object(object)?;
        }
        self.writer.write_section_end()
    }

    fn write_dictionary_prelude(&mut self, handle: u64, owner: u64) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, "DICTIONARY")?;
        w.write_handle(5, Handle::new(handle))?;
        w.write_handle(330, Handle::new(owner))?;
        w.write_subclass("AcDbDictionary")?;
        w.write_i16(281, 1)
    }

    fn write_root_dictionary(&mut self) -> Result<()> {
        self.write_dictionary_prelude(HANDLE_ROOT_DICT, 0)?;
        let w = &mut *self.writer;
        w.write_str(3, "ACAD_GROUP")?;
        w.write_handle(350, Handle::new(HANDLE_GROUP_DICT))?;
        w.write_str(3, "ACAD_LAYOUT")?;
        w.write_handle(350, Handle::new(HANDLE_LAYOUT_DICT))?;
        w.write_str(3, "ACAD_MLINESTYLE")?;
        w.write_handle(350, Handle::new(HANDLE_MLSTYLE_DICT))
    }

    fn write_group_dictionary(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_dictionary_prelude(HANDLE_GROUP_DICT, HANDLE_ROOT_DICT)?;
        let w = &mut *self.writer;
        for group in doc.groups.values() {
            w.write_str(3, &group.name)?;
            w.write_handle(350, group.handle)?;
        }
        Ok(())
    }

    fn write_layout_dictionary(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_dictionary_prelude(HANDLE_LAYOUT_DICT, HANDLE_ROOT_DICT)?;
        let w = &mut *self.writer;
        for layout in doc.layouts() {
            w.write_str(3, &layout.name)?;
            w.write_handle(350, layout.handle)?;
        }
        Ok(())
    }

    fn write_mlstyle_dictionary(&mut self, doc: &CadDocument) -> Result<()> {
        self.write_dictionary_prelude(HANDLE_MLSTYLE_DICT, HANDLE_ROOT_DICT)?;
        let w = &mut *self.writer;
        for style in doc.mline_styles.iter() {
            w.write_str(3, &style.name)?;
            w.write_handle(350, style.handle)?;
        }
        Ok(())
    }

    fn write_layout(&mut self, layout: &Layout, doc: &CadDocument) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, "LAYOUT")?;
        w.write_handle(5, layout.handle)?;
        w.write_handle(330, Handle::new(HANDLE_LAYOUT_DICT))?;
        w.write_subclass("AcDbPlotSettings")?;
        w.write_str(1, "")?;
        w.write_subclass("AcDbLayout")?;
        w.write_str(1, &layout.name)?;
        w.write_i16(70, 1)?;
        w.write_i16(71, layout.tab_order)?;
        w.write_point2(10, layout.limits_min)?;
        w.write_point2(11, layout.limits_max)?;
        let block_handle = doc
            .blocks
            .get(&layout.block_name)
            .map(|b| b.record_handle)
            .unwrap_or(Handle::NULL);
        w.write_handle(330, block_handle)
    }

    fn write_mline_style(&mut self, style: &MLineStyle) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, "MLINESTYLE")?;
        w.write_handle(5, style.handle)?;
        w.write_handle(330, Handle::new(HANDLE_MLSTYLE_DICT))?;
        w.write_subclass("AcDbMlineStyle")?;
        w.write_str(2, &style.name)?;
        w.write_i16(70, 0)?;
        w.write_str(3, &style.description)?;
        w.write_i16(62, style.fill_color.approximate_index())?;
        w.write_f64(51, style.start_angle)?;
        w.write_f64(52, style.end_angle)?;
        w.write_i16(71, style.elements.len() as i16)?;
        for element in &style.elements {
            w.write_f64(49, element.offset)?;
            w.write_i16(62, element.color.approximate_index())?;
            w.write_str(6, &element.line_type)?;
        }
        write_xdata(w, &style.xdata)
    }

    fn write_group(&mut self, group: &Group) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, "GROUP")?;
        w.write_handle(5, group.handle)?;
        w.write_handle(330, Handle::new(HANDLE_GROUP_DICT))?;
        w.write_subclass("AcDbGroup")?;
        w.write_str(300, &group.description)?;
        w.write_i16(70, 0)?;
        w.write_i16(71, if group.is_selectable { 1 } else { 0 })?;
        for handle in &group.entity_handles {
            w.write_handle(340, *handle)?;
        }
        Ok(())
    }

    fn write_raw_object(&mut self, object: &RawObject) -> Result<()> {
        let w = &mut *self.writer;
        w.write_str(0, &object.object_type)?;
        w.write_handle(5, object.handle)?;
        w.write_handle(330, object.owner)?;
        for (code, raw) in &object.pairs {
            w.write_raw(*code, raw)?;
        }
        Ok(())
    }
}

/// Write an object's extended data, application by application
fn write_xdata<W: TagWriter>(w: &mut W, xdata: &XData) -> Result<()> {
    for record in xdata.iter() {
        w.write_str(1001, &record.app_name)?;
        for value in &record.values {
            match value {
                XDataValue::String(s) => w.write_str(1000, s)?,
                XDataValue::Control(open) => w.write_str(1002, if *open { "{" } else { "}" })?,
                XDataValue::LayerName(s) => w.write_str(1003, s)?,
                XDataValue::Bytes(data) => w.write_bytes(1004, data)?,
                XDataValue::Handle(h) => w.write_handle(1005, *h)?,
                XDataValue::Point(p) => {
                    w.write_f64(1010, p.x)?;
                    w.write_f64(1020, p.y)?;
                    w.write_f64(1030, p.z)?;
                }
                XDataValue::Real(v) => w.write_f64(1040, *v)?,
                XDataValue::Distance(v) => w.write_f64(1041, *v)?,
                XDataValue::ScaleFactor(v) => w.write_f64(1042, *v)?,
                XDataValue::Integer16(v) => w.write_i16(1070, *v)?,
                XDataValue::Integer32(v) => w.write_i32(1071, *v)?,
            }
        }
    }
    Ok(())
}
