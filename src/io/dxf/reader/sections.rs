//! Section readers
//!
//! Builds document objects from the tag stream with cross references left
//! unresolved: referenced names are stored as-is and referenced handles are
//! stashed in [`PendingRefs`], because the format allows forward
//! references. The resolution pass after the full read substitutes live
//! objects or safe fallbacks.

use super::stream::TagReader;
use crate::blocks::{Block, MODEL_SPACE, PAPER_SPACE};
use crate::document::CadDocument;
use crate::entities::{
    Arc, Attribute, AttributeDefinition, AttributeFlags, BoundaryEdge, BoundaryPath, Circle,
    Dimension, EntityCommon, EntityType, Hatch, HatchPattern, Insert, Line, LwPolyline, LwVertex,
    Point, Text,
};
use crate::error::{DxfError, Result};
use crate::io::dxf::tag::Tag;
use crate::notification::NotificationKind;
use crate::objects::{Group, Layout, RawObject};
use crate::tables::{
    AppId, DimStyle, Layer, LineType, LineTypeSegment, MLineStyle, MLineStyleElement, TextStyle,
    TextStyleFlags, Ucs, View,
};
use crate::types::{
    Color, DxfVersion, Handle, LineWeight, Transparency, Units, Vector2, Vector3,
};
use crate::xdata::{XData, XDataRecord, XDataValue};

/// A dictionary found in the OBJECTS section, kept until resolution
#[derive(Debug, Clone, Default)]
pub struct RawDictionary {
    pub handle: Handle,
    pub owner: Handle,
    pub entries: Vec<(String, Handle)>,
}

/// Handle references stashed during the build pass
#[derive(Debug, Default)]
pub struct PendingRefs {
    /// (dimension style name, text style handle)
    pub dimstyle_text_styles: Vec<(String, Handle)>,
    /// (layout, block record handle)
    pub layouts: Vec<(Layout, Handle)>,
    /// Dictionaries, needed to name groups
    pub dictionaries: Vec<RawDictionary>,
    /// Groups without names yet
    pub groups: Vec<Group>,
}

/// Parses one section at a time off a tag stream
pub struct SectionReader<'a> {
    tags: &'a mut dyn TagReader,
}

impl<'a> SectionReader<'a> {
    pub fn new(tags: &'a mut dyn TagReader) -> Self {
        Self { tags }
    }

    fn next_tag(&mut self) -> Result<Option<Tag>> {
        self.tags.read_tag()
    }

    /// Collect every tag up to (not including) the next code-0 tag
    fn read_object_tags(&mut self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        while let Some(tag) = self.tags.read_tag()? {
            if tag.code == 0 {
                self.tags.push_back(tag);
                break;
            }
            tags.push(tag);
        }
        Ok(tags)
    }

    /// Skip to the end of the current section
    pub fn skip_section(&mut self) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDSEC") {
                break;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // HEADER
    // ------------------------------------------------------------------

    pub fn read_header(&mut self, doc: &mut CadDocument) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDSEC") {
                break;
            }
            if tag.code != 9 {
                continue;
            }
            let name = tag.as_str().to_string();
            let values = self.read_var_tags()?;
            apply_header_variable(doc, &name, &values);
        }
        Ok(())
    }

    /// Collect the value tags of one header variable
    fn read_var_tags(&mut self) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        while let Some(tag) = self.tags.read_tag()? {
            if tag.code == 9 || tag.code == 0 {
                self.tags.push_back(tag);
                break;
            }
            tags.push(tag);
        }
        Ok(tags)
    }

    // ------------------------------------------------------------------
    // TABLES
    // ------------------------------------------------------------------

    pub fn read_tables(&mut self, doc: &mut CadDocument, pending: &mut PendingRefs) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDSEC") {
                break;
            }
            if !tag.is(0, "TABLE") {
                continue;
            }
            let name_tag = self.next_tag()?;
            let table_name = match &name_tag {
                Some(t) if t.code == 2 => t.as_str().to_string(),
                _ => continue,
            };
            // table header groups (handle, owner, subclass, count)
            let _ = self.read_object_tags()?;
            self.read_table_entries(doc, pending, &table_name)?;
        }
        Ok(())
    }

    fn read_table_entries(
        &mut self,
        doc: &mut CadDocument,
        pending: &mut PendingRefs,
        table_name: &str,
    ) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDTAB") {
                break;
            }
            if tag.code != 0 {
                continue;
            }
            let tags = self.read_object_tags()?;
            match table_name {
                "LAYER" => read_layer(doc, tags),
                "LTYPE" => read_ltype(doc, tags),
                "STYLE" => read_style(doc, tags),
                "VIEW" => read_view(doc, tags),
                "UCS" => read_ucs(doc, tags),
                "APPID" => read_appid(doc, tags),
                "DIMSTYLE" => read_dimstyle(doc, pending, tags),
                "BLOCK_RECORD" => read_block_record(doc, tags),
                // viewports are not part of the document model
                _ => {}
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // BLOCKS
    // ------------------------------------------------------------------

    pub fn read_blocks(&mut self, doc: &mut CadDocument) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDSEC") {
                break;
            }
            if tag.is(0, "BLOCK") {
                self.read_block(doc)?;
            }
        }
        Ok(())
    }

    fn read_block(&mut self, doc: &mut CadDocument) -> Result<()> {
        let header = self.read_object_tags()?;
        let mut name = String::new();
        let mut block_handle = Handle::NULL;
        let mut base_point = Vector3::ZERO;
        let mut flags = 0i16;
        let mut xref_path = String::new();
        for tag in &header {
            match tag.code {
                2 => name = tag.as_str().to_string(),
                5 => block_handle = tag.as_handle().unwrap_or(Handle::NULL),
                70 => flags = tag.as_i16().unwrap_or(0),
                10 | 20 | 30 => feed_point(&mut base_point, tag),
                1 => xref_path = tag.as_str().to_string(),
                _ => {}
            }
        }
        if name.is_empty() {
            name = format!("*U{}", doc.blocks.len());
        }

        // The BLOCK_RECORD table usually created the block already
        let block = doc.blocks.add(Block::new(name.clone()));
        block.block_handle = block_handle;
        block.base_point = base_point;
        if flags & 4 != 0 {
            block.is_xref = true;
            block.xref_path = xref_path;
        }

        // contents until ENDBLK
        loop {
            let tag = match self.next_tag()? {
                Some(tag) => tag,
                None => break,
            };
            if tag.is(0, "ENDBLK") {
                let end_tags = self.read_object_tags()?;
                let block = doc
                    .blocks
                    .get_mut(&name)
                    .ok_or_else(|| DxfError::NameNotFound(name.clone()))?;
                for t in &end_tags {
                    if t.code == 5 {
                        block.end_handle = t.as_handle().unwrap_or(Handle::NULL);
                    }
                }
                break;
            }
            if tag.code != 0 {
                continue;
            }
            let record = tag.as_str().to_string();
            if record == "ATTDEF" {
                let tags = self.read_object_tags()?;
                let def = read_attdef(tags);
                if let Some(block) = doc.blocks.get_mut(&name) {
                    // lenient: duplicate tags from files are tolerated
                    block.push_attribute_definition(def);
                }
            } else if let Some((entity, _)) = self.read_entity(doc, &record)? {
                if let Some(block) = doc.blocks.get_mut(&name) {
                    let _ = block.add_entity(entity);
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // ENTITIES
    // ------------------------------------------------------------------

    pub fn read_entities(&mut self, doc: &mut CadDocument) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDSEC") {
                break;
            }
            if tag.code != 0 {
                continue;
            }
            let record = tag.as_str().to_string();
            if let Some((entity, paper)) = self.read_entity(doc, &record)? {
                let target = if paper { PAPER_SPACE } else { MODEL_SPACE };
                if !doc.blocks.contains(target) {
                    doc.blocks.add(Block::new(target));
                }
                if let Some(block) = doc.blocks.get_mut(target) {
                    let _ = block.add_entity(entity);
                }
            }
        }
        Ok(())
    }

    /// Parse one entity; `None` when the record type is not modeled.
    /// The second element reports the paper space flag (group 67).
    fn read_entity(
        &mut self,
        doc: &mut CadDocument,
        record: &str,
    ) -> Result<Option<(EntityType, bool)>> {
        let tags = self.read_object_tags()?;
        let paper = tags
            .iter()
            .any(|t| t.code == 67 && t.as_i16() == Some(1));
        let entity = match record {
            "POINT" => Some(read_point(tags)),
            "LINE" => Some(read_line(tags)),
            "CIRCLE" => Some(read_circle(tags)),
            "ARC" => Some(read_arc(tags)),
            "LWPOLYLINE" => Some(read_lwpolyline(tags)),
            "TEXT" => Some(read_text(tags)),
            "ATTDEF" => Some(EntityType::AttributeDefinition(read_attdef(tags))),
            "DIMENSION" => Some(read_dimension(tags)),
            "HATCH" => Some(read_hatch(tags)),
            "INSERT" => {
                let mut insert = read_insert(tags);
                self.read_insert_attributes(&mut insert)?;
                Some(EntityType::Insert(insert))
            }
            other => {
                doc.notifications.notify(
                    NotificationKind::NotImplemented,
                    format!("entity {} skipped", other),
                );
                None
            }
        };
        Ok(entity.map(|e| (e, paper)))
    }

    /// Consume the ATTRIB run and SEQEND marker following an insert
    fn read_insert_attributes(&mut self, insert: &mut Insert) -> Result<()> {
        loop {
            let tag = match self.next_tag()? {
                Some(tag) => tag,
                None => return Ok(()),
            };
            if tag.is(0, "ATTRIB") {
                let tags = self.read_object_tags()?;
                insert.attributes.push(read_attribute(tags));
            } else if tag.is(0, "SEQEND") {
                let tags = self.read_object_tags()?;
                for t in &tags {
                    if t.code == 5 {
                        insert.seqend_handle = t.as_handle().unwrap_or(Handle::NULL);
                    }
                }
                return Ok(());
            } else {
                self.tags.push_back(tag);
                return Ok(());
            }
        }
    }

    // ------------------------------------------------------------------
    // OBJECTS
    // ------------------------------------------------------------------

    pub fn read_objects(&mut self, doc: &mut CadDocument, pending: &mut PendingRefs) -> Result<()> {
        while let Some(tag) = self.next_tag()? {
            if tag.is(0, "ENDSEC") {
                break;
            }
            if tag.code != 0 {
                continue;
            }
            let record = tag.as_str().to_string();
            let tags = self.read_object_tags()?;
            match record.as_str() {
                "DICTIONARY" => pending.dictionaries.push(read_dictionary(tags)),
                "LAYOUT" => {
                    if let Some(parsed) = read_layout(tags) {
                        pending.layouts.push(parsed);
                    }
                }
                "MLINESTYLE" => read_mline_style(doc, tags),
                "GROUP" => pending.groups.push(read_group(tags)),
                _ => doc.raw_objects.push(read_raw_object(&record, tags)),
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Header variables
// ----------------------------------------------------------------------

fn apply_header_variable(doc: &mut CadDocument, name: &str, values: &[Tag]) {
    let h = &mut doc.header;
    let first = values.first();
    match name {
        "$ACADVER" => {
            if let Some(tag) = first {
                doc.version = DxfVersion::from_version_string(tag.as_str());
            }
        }
        "$DWGCODEPAGE" => {
            if let Some(tag) = first {
                h.code_page = tag.as_str().to_string();
            }
        }
        "$HANDSEED" => {
            if let Some(seed) = first.and_then(|t| t.as_handle()) {
                doc.reserve_handles_through(seed.value().saturating_sub(1));
            }
        }
        "$INSBASE" => h.insertion_base = point3(values),
        "$EXTMIN" => h.extents_min = point3(values),
        "$EXTMAX" => h.extents_max = point3(values),
        "$LIMMIN" => h.limits_min = point2(values),
        "$LIMMAX" => h.limits_max = point2(values),
        "$CLAYER" => {
            if let Some(tag) = first {
                h.current_layer = tag.as_str().to_string();
            }
        }
        "$CELTYPE" => {
            if let Some(tag) = first {
                h.current_line_type = tag.as_str().to_string();
            }
        }
        "$TEXTSTYLE" => {
            if let Some(tag) = first {
                h.current_text_style = tag.as_str().to_string();
            }
        }
        "$DIMSTYLE" => {
            if let Some(tag) = first {
                h.current_dim_style = tag.as_str().to_string();
            }
        }
        "$CMLSTYLE" => {
            if let Some(tag) = first {
                h.current_mline_style = tag.as_str().to_string();
            }
        }
        "$CECOLOR" => {
            if let Some(index) = first.and_then(|t| t.as_i16()) {
                h.current_color = Color::from_index(index);
            }
        }
        "$CELWEIGHT" => {
            if let Some(value) = first.and_then(|t| t.as_i16()) {
                h.current_line_weight = LineWeight::from_value(value);
            }
        }
        "$LTSCALE" => set_f64(&mut h.line_type_scale, first),
        "$TEXTSIZE" => set_f64(&mut h.text_height, first),
        "$ANGBASE" => set_f64(&mut h.angle_base, first),
        "$ANGDIR" => set_i16(&mut h.angle_direction, first),
        "$ATTMODE" => set_i16(&mut h.attribute_visibility, first),
        "$PDMODE" => set_i16(&mut h.point_display_mode, first),
        "$PDSIZE" => set_f64(&mut h.point_display_size, first),
        "$LUNITS" => set_i16(&mut h.linear_unit_format, first),
        "$LUPREC" => set_i16(&mut h.linear_unit_precision, first),
        "$AUNITS" => set_i16(&mut h.angular_unit_format, first),
        "$AUPREC" => set_i16(&mut h.angular_unit_precision, first),
        "$INSUNITS" => {
            if let Some(value) = first.and_then(|t| t.as_i16()) {
                h.insertion_units = Units::from_value(value);
            }
        }
        "$MEASUREMENT" => set_i16(&mut h.measurement, first),
        "$TDCREATE" => set_f64(&mut h.create_date, first),
        "$TDUPDATE" => set_f64(&mut h.update_date, first),
        "$LASTSAVEDBY" => {
            if let Some(tag) = first {
                h.last_saved_by = tag.as_str().to_string();
            }
        }
        _ => {
            // unrecognized variables survive verbatim
            let pairs = values.iter().map(|t| (t.code, t.raw.clone())).collect();
            h.set_custom(name, pairs);
        }
    }
}

fn set_f64(field: &mut f64, tag: Option<&Tag>) {
    if let Some(value) = tag.and_then(|t| t.as_f64()) {
        *field = value;
    }
}

fn set_i16(field: &mut i16, tag: Option<&Tag>) {
    if let Some(value) = tag.and_then(|t| t.as_i16()) {
        *field = value;
    }
}

fn point3(values: &[Tag]) -> Vector3 {
    let mut point = Vector3::ZERO;
    for tag in values {
        feed_point(&mut point, tag);
    }
    point
}

fn point2(values: &[Tag]) -> Vector2 {
    let p = point3(values);
    Vector2::new(p.x, p.y)
}

fn feed_point(point: &mut Vector3, tag: &Tag) {
    if let Some(value) = tag.as_f64() {
        match tag.code {
            10 => point.x = value,
            20 => point.y = value,
            30 => point.z = value,
            _ => {}
        }
    }
}

// ----------------------------------------------------------------------
// Table entries
// ----------------------------------------------------------------------

fn entry_name(tags: &[Tag]) -> String {
    tags.iter()
        .find(|t| t.code == 2)
        .map(|t| t.as_str().to_string())
        .unwrap_or_default()
}

fn entry_handle(tags: &[Tag], code: i32) -> Handle {
    tags.iter()
        .find(|t| t.code == code)
        .and_then(|t| t.as_handle())
        .unwrap_or(Handle::NULL)
}

fn read_layer(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut layer = Layer::new(entry_name(&tags));
    layer.handle = entry_handle(&tags, 5);
    layer.xdata = xdata;
    for tag in &tags {
        match tag.code {
            70 => {
                let bits = tag.as_i16().unwrap_or(0) as u16;
                layer.flags = crate::tables::LayerFlags::from_bits_truncate(bits);
            }
            62 => {
                let index = tag.as_i16().unwrap_or(7);
                layer.is_off = index < 0;
                layer.color = Color::from_index(index.abs());
            }
            420 => {
                if let Some(rgb) = tag.as_i32() {
                    layer.color = Color::from_true_color(rgb);
                }
            }
            6 => layer.line_type = tag.as_str().to_string(),
            290 => layer.is_plottable = tag.as_bool().unwrap_or(true),
            370 => layer.line_weight = LineWeight::from_value(tag.as_i16().unwrap_or(-3)),
            440 => {
                if let Some(value) = tag.as_i32() {
                    layer.transparency = Transparency::from_value(value);
                }
            }
            _ => {}
        }
    }
    doc.layers.add(layer);
}

fn read_ltype(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut lt = LineType::new(entry_name(&tags));
    lt.handle = entry_handle(&tags, 5);
    lt.xdata = xdata;
    for tag in &tags {
        match tag.code {
            3 => lt.description = tag.as_str().to_string(),
            49 => {
                if let Some(length) = tag.as_f64() {
                    lt.segments.push(LineTypeSegment { length });
                }
            }
            _ => {}
        }
    }
    doc.line_types.add(lt);
}

fn read_style(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut style = TextStyle::new(entry_name(&tags), "");
    style.handle = entry_handle(&tags, 5);
    style.xdata = xdata;
    for tag in &tags {
        match tag.code {
            3 => style.font = tag.as_str().to_string(),
            4 => style.big_font = tag.as_str().to_string(),
            40 => style.height = tag.as_f64().unwrap_or(0.0),
            41 => style.width_factor = tag.as_f64().unwrap_or(1.0),
            42 => style.last_height = tag.as_f64().unwrap_or(2.5),
            50 => style.oblique_angle = tag.as_f64().unwrap_or(0.0),
            71 => {
                let bits = tag.as_i16().unwrap_or(0) as u16;
                style.flags = TextStyleFlags::from_bits_truncate(bits);
            }
            _ => {}
        }
    }
    doc.text_styles.add(style);
}

fn read_view(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut view = View::new(entry_name(&tags));
    view.handle = entry_handle(&tags, 5);
    view.xdata = xdata;
    let mut direction = Vector3::UNIT_Z;
    let mut target = Vector3::ZERO;
    for tag in &tags {
        match tag.code {
            40 => view.height = tag.as_f64().unwrap_or(1.0),
            41 => view.width = tag.as_f64().unwrap_or(1.0),
            42 => view.lens_length = tag.as_f64().unwrap_or(50.0),
            10 => view.center.x = tag.as_f64().unwrap_or(0.0),
            20 => view.center.y = tag.as_f64().unwrap_or(0.0),
            11 => direction.x = tag.as_f64().unwrap_or(0.0),
            21 => direction.y = tag.as_f64().unwrap_or(0.0),
            31 => direction.z = tag.as_f64().unwrap_or(0.0),
            12 => target.x = tag.as_f64().unwrap_or(0.0),
            22 => target.y = tag.as_f64().unwrap_or(0.0),
            32 => target.z = tag.as_f64().unwrap_or(0.0),
            _ => {}
        }
    }
    view.direction = direction;
    view.target = target;
    doc.views.add(view);
}

fn read_ucs(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut ucs = Ucs::new(entry_name(&tags));
    ucs.handle = entry_handle(&tags, 5);
    ucs.xdata = xdata;
    for tag in &tags {
        if let Some(value) = tag.as_f64() {
            match tag.code {
                10 => ucs.origin.x = value,
                20 => ucs.origin.y = value,
                30 => ucs.origin.z = value,
                11 => ucs.x_axis.x = value,
                21 => ucs.x_axis.y = value,
                31 => ucs.x_axis.z = value,
                12 => ucs.y_axis.x = value,
                22 => ucs.y_axis.y = value,
                32 => ucs.y_axis.z = value,
                _ => {}
            }
        }
    }
    doc.ucss.add(ucs);
}

fn read_appid(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut app = AppId::new(entry_name(&tags));
    app.handle = entry_handle(&tags, 5);
    app.xdata = xdata;
    doc.app_ids.add(app);
}

fn read_dimstyle(doc: &mut CadDocument, pending: &mut PendingRefs, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut style = DimStyle::new(entry_name(&tags));
    style.handle = entry_handle(&tags, 105);
    style.xdata = xdata;
    for tag in &tags {
        match tag.code {
            40 => style.scale = tag.as_f64().unwrap_or(1.0),
            41 => style.arrow_size = tag.as_f64().unwrap_or(0.18),
            42 => style.ext_line_offset = tag.as_f64().unwrap_or(0.0625),
            44 => style.ext_line_extension = tag.as_f64().unwrap_or(0.18),
            140 => style.text_height = tag.as_f64().unwrap_or(0.18),
            147 => style.text_gap = tag.as_f64().unwrap_or(0.09),
            176 => style.line_color = Color::from_index(tag.as_i16().unwrap_or(0)),
            271 => style.decimal_places = tag.as_i16().unwrap_or(4),
            340 => {
                if let Some(handle) = tag.as_handle() {
                    if !handle.is_null() {
                        pending
                            .dimstyle_text_styles
                            .push((style.name.clone(), handle));
                    }
                }
            }
            _ => {}
        }
    }
    doc.dim_styles.add(style);
}

fn read_block_record(doc: &mut CadDocument, tags: Vec<Tag>) {
    let name = entry_name(&tags);
    if name.is_empty() {
        return;
    }
    let mut block = Block::new(name);
    block.record_handle = entry_handle(&tags, 5);
    for tag in &tags {
        if tag.code == 70 {
            block.units = Some(Units::from_value(tag.as_i16().unwrap_or(0)));
        }
    }
    doc.blocks.add(block);
}

// ----------------------------------------------------------------------
// Entities
// ----------------------------------------------------------------------

/// Split off extended data groups (codes 1000 and up)
fn split_xdata(tags: Vec<Tag>) -> (Vec<Tag>, XData) {
    let split = tags.iter().position(|t| t.code >= 1000);
    match split {
        Some(index) => {
            let mut tags = tags;
            let xdata_tags = tags.split_off(index);
            (tags, parse_xdata(&xdata_tags))
        }
        None => (tags, XData::new()),
    }
}

fn parse_xdata(tags: &[Tag]) -> XData {
    let mut xdata = XData::new();
    let mut current: Option<XDataRecord> = None;
    let mut iter = tags.iter().peekable();
    while let Some(tag) = iter.next() {
        if tag.code == 1001 {
            if let Some(record) = current.take() {
                xdata.insert(record);
            }
            current = Some(XDataRecord::new(tag.as_str()));
            continue;
        }
        let record = match current.as_mut() {
            Some(record) => record,
            None => continue,
        };
        match tag.code {
            1000 => record.push(XDataValue::String(tag.as_str().to_string())),
            1002 => record.push(XDataValue::Control(tag.as_str() == "{")),
            1003 => record.push(XDataValue::LayerName(tag.as_str().to_string())),
            1004 => {
                if let Some(bytes) = tag.as_bytes() {
                    record.push(XDataValue::Bytes(bytes.to_vec()));
                }
            }
            1005 => {
                if let Some(handle) = tag.as_handle() {
                    record.push(XDataValue::Handle(handle));
                }
            }
            1010 => {
                let mut p = Vector3::new(tag.as_f64().unwrap_or(0.0), 0.0, 0.0);
                if let Some(y) = iter.peek().filter(|t| t.code == 1020) {
                    p.y = y.as_f64().unwrap_or(0.0);
                    iter.next();
                }
                if let Some(z) = iter.peek().filter(|t| t.code == 1030) {
                    p.z = z.as_f64().unwrap_or(0.0);
                    iter.next();
                }
                record.push(XDataValue::Point(p));
            }
            1040 => record.push(XDataValue::Real(tag.as_f64().unwrap_or(0.0))),
            1041 => record.push(XDataValue::Distance(tag.as_f64().unwrap_or(0.0))),
            1042 => record.push(XDataValue::ScaleFactor(tag.as_f64().unwrap_or(0.0))),
            1070 => record.push(XDataValue::Integer16(tag.as_i16().unwrap_or(0))),
            1071 => record.push(XDataValue::Integer32(tag.as_i32().unwrap_or(0))),
            _ => {}
        }
    }
    if let Some(record) = current.take() {
        xdata.insert(record);
    }
    xdata
}

/// Apply the shared envelope groups
fn read_common(common: &mut EntityCommon, tags: &[Tag]) {
    for tag in tags {
        match tag.code {
            5 => common.handle = tag.as_handle().unwrap_or(Handle::NULL),
            8 => common.layer = tag.as_str().to_string(),
            6 => common.line_type = tag.as_str().to_string(),
            62 => common.color = Color::from_index(tag.as_i16().unwrap_or(256)),
            420 => {
                if let Some(rgb) = tag.as_i32() {
                    common.color = Color::from_true_color(rgb);
                }
            }
            370 => common.line_weight = LineWeight::from_value(tag.as_i16().unwrap_or(-1)),
            48 => common.line_type_scale = tag.as_f64().unwrap_or(1.0),
            60 => common.invisible = tag.as_i16().unwrap_or(0) == 1,
            440 => {
                if let Some(value) = tag.as_i32() {
                    common.transparency = Transparency::from_value(value);
                }
            }
            _ => {}
        }
    }
}

fn triplet(tags: &[Tag], base: i32) -> Vector3 {
    let mut point = Vector3::ZERO;
    for tag in tags {
        if let Some(value) = tag.as_f64() {
            if tag.code == base {
                point.x = value;
            } else if tag.code == base + 10 {
                point.y = value;
            } else if tag.code == base + 20 {
                point.z = value;
            }
        }
    }
    point
}

fn f64_code(tags: &[Tag], code: i32, default: f64) -> f64 {
    tags.iter()
        .find(|t| t.code == code)
        .and_then(|t| t.as_f64())
        .unwrap_or(default)
}

fn str_code(tags: &[Tag], code: i32) -> Option<String> {
    tags.iter()
        .find(|t| t.code == code)
        .map(|t| t.as_str().to_string())
}

fn read_point(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Point::new(Vector3::ZERO);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.location = triplet(&tags, 10);
    e.thickness = f64_code(&tags, 39, 0.0);
    EntityType::Point(e)
}

fn read_line(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Line::from_points(Vector3::ZERO, Vector3::ZERO);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.start = triplet(&tags, 10);
    e.end = triplet(&tags, 11);
    e.thickness = f64_code(&tags, 39, 0.0);
    if tags.iter().any(|t| t.code == 210) {
        e.normal = triplet(&tags, 210);
    }
    EntityType::Line(e)
}

fn read_circle(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Circle::new(Vector3::ZERO, 1.0);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.center = triplet(&tags, 10);
    e.radius = f64_code(&tags, 40, 1.0);
    e.thickness = f64_code(&tags, 39, 0.0);
    if tags.iter().any(|t| t.code == 210) {
        e.normal = triplet(&tags, 210);
    }
    EntityType::Circle(e)
}

fn read_arc(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Arc::new(Vector3::ZERO, 1.0, 0.0, 360.0);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.center = triplet(&tags, 10);
    e.radius = f64_code(&tags, 40, 1.0);
    e.start_angle = f64_code(&tags, 50, 0.0);
    e.end_angle = f64_code(&tags, 51, 360.0);
    e.thickness = f64_code(&tags, 39, 0.0);
    if tags.iter().any(|t| t.code == 210) {
        e.normal = triplet(&tags, 210);
    }
    EntityType::Arc(e)
}

fn read_lwpolyline(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = LwPolyline::new();
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    for tag in &tags {
        match tag.code {
            70 => e.is_closed = tag.as_i16().unwrap_or(0) & 1 != 0,
            43 => e.constant_width = tag.as_f64().unwrap_or(0.0),
            38 => e.elevation = tag.as_f64().unwrap_or(0.0),
            10 => {
                if let Some(x) = tag.as_f64() {
                    e.vertices.push(LwVertex::new(Vector2::new(x, 0.0)));
                }
            }
            20 => {
                if let (Some(y), Some(last)) = (tag.as_f64(), e.vertices.last_mut()) {
                    last.point.y = y;
                }
            }
            42 => {
                if let (Some(bulge), Some(last)) = (tag.as_f64(), e.vertices.last_mut()) {
                    last.bulge = bulge;
                }
            }
            _ => {}
        }
    }
    EntityType::LwPolyline(e)
}

fn read_text(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Text::new("", Vector3::ZERO, 2.5);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.position = triplet(&tags, 10);
    e.height = f64_code(&tags, 40, 2.5);
    e.value = str_code(&tags, 1).unwrap_or_default();
    e.rotation = f64_code(&tags, 50, 0.0);
    e.width_factor = f64_code(&tags, 41, 1.0);
    e.oblique_angle = f64_code(&tags, 51, 0.0);
    if let Some(style) = str_code(&tags, 7) {
        e.style = style;
    }
    EntityType::Text(e)
}

fn read_attdef(tags: Vec<Tag>) -> AttributeDefinition {
    let (tags, xdata) = split_xdata(tags);
    let mut def = AttributeDefinition::new("", "");
    read_common(&mut def.common, &tags);
    def.common.xdata = xdata;
    def.position = triplet(&tags, 10);
    def.height = f64_code(&tags, 40, 2.5);
    def.rotation = f64_code(&tags, 50, 0.0);
    def.value = str_code(&tags, 1).unwrap_or_default();
    def.prompt = str_code(&tags, 3).unwrap_or_default();
    def.tag = str_code(&tags, 2).unwrap_or_default();
    if let Some(style) = str_code(&tags, 7) {
        def.style = style;
    }
    if let Some(bits) = tags.iter().find(|t| t.code == 70).and_then(|t| t.as_i16()) {
        def.flags = AttributeFlags::from_bits_truncate(bits as u16);
    }
    def
}

fn read_attribute(tags: Vec<Tag>) -> Attribute {
    let (tags, xdata) = split_xdata(tags);
    let mut attr = Attribute {
        common: EntityCommon::new(),
        tag: String::new(),
        value: String::new(),
        position: Vector3::ZERO,
        height: 2.5,
        rotation: 0.0,
        style: crate::tables::textstyle::STANDARD.to_string(),
        flags: AttributeFlags::empty(),
    };
    read_common(&mut attr.common, &tags);
    attr.common.xdata = xdata;
    attr.position = triplet(&tags, 10);
    attr.height = f64_code(&tags, 40, 2.5);
    attr.rotation = f64_code(&tags, 50, 0.0);
    attr.value = str_code(&tags, 1).unwrap_or_default();
    attr.tag = str_code(&tags, 2).unwrap_or_default();
    if let Some(style) = str_code(&tags, 7) {
        attr.style = style;
    }
    if let Some(bits) = tags.iter().find(|t| t.code == 70).and_then(|t| t.as_i16()) {
        attr.flags = AttributeFlags::from_bits_truncate(bits as u16);
    }
    attr
}

fn read_insert(tags: Vec<Tag>) -> Insert {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Insert::new("", Vector3::ZERO);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.block_name = str_code(&tags, 2).unwrap_or_default();
    e.position = triplet(&tags, 10);
    e.x_scale = f64_code(&tags, 41, 1.0);
    e.y_scale = f64_code(&tags, 42, 1.0);
    e.z_scale = f64_code(&tags, 43, 1.0);
    e.rotation = f64_code(&tags, 50, 0.0);
    if tags.iter().any(|t| t.code == 210) {
        e.normal = triplet(&tags, 210);
    }
    e
}

fn read_dimension(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Dimension::linear(Vector3::ZERO, Vector3::ZERO, 0.0);
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;
    e.definition_point = triplet(&tags, 10);
    e.text_mid_point = triplet(&tags, 11);
    e.first_point = triplet(&tags, 13);
    e.second_point = triplet(&tags, 14);
    e.rotation = f64_code(&tags, 50, 0.0);
    e.text_override = str_code(&tags, 1);
    if let Some(style) = str_code(&tags, 3) {
        e.style = style;
    }
    EntityType::Dimension(e)
}

fn read_hatch(tags: Vec<Tag>) -> EntityType {
    let (tags, xdata) = split_xdata(tags);
    let mut e = Hatch::new(HatchPattern::solid());
    read_common(&mut e.common, &tags);
    e.common.xdata = xdata;

    let mut i = 0usize;
    let mut angle = 0.0;
    let mut scale = 1.0;
    while i < tags.len() {
        let tag = &tags[i];
        match tag.code {
            30 => e.elevation = tag.as_f64().unwrap_or(0.0),
            2 => e.pattern.name = tag.as_str().to_string(),
            71 => e.is_associative = tag.as_i16().unwrap_or(0) != 0,
            52 => angle = tag.as_f64().unwrap_or(0.0),
            41 => scale = tag.as_f64().unwrap_or(1.0),
            91 => {
                let count = tag.as_i32().unwrap_or(0).max(0) as usize;
                i += 1;
                for _ in 0..count {
                    let (path, next) = read_boundary_path(&tags, i);
                    e.paths.push(path);
                    i = next;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    e.pattern.angle = angle;
    e.pattern.scale = scale;
    EntityType::Hatch(e)
}

/// Parse one boundary path starting at `start`; returns the path and the
/// index of the first tag after it
fn read_boundary_path(tags: &[Tag], start: usize) -> (BoundaryPath, usize) {
    let mut path = BoundaryPath::default();
    let mut i = start;

    // find the path type flag
    while i < tags.len() && tags[i].code != 92 {
        i += 1;
    }
    if i >= tags.len() {
        return (path, i);
    }
    let flags = tags[i].as_i32().unwrap_or(0);
    i += 1;

    if flags & 2 != 0 {
        // polyline form
        let mut has_bulge = false;
        let mut count = 0usize;
        while i < tags.len() {
            match tags[i].code {
                72 => has_bulge = tags[i].as_i16().unwrap_or(0) != 0,
                73 => path.is_closed = tags[i].as_i16().unwrap_or(0) != 0,
                93 => {
                    count = tags[i].as_i32().unwrap_or(0).max(0) as usize;
                    i += 1;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        let _ = has_bulge;
        for _ in 0..count {
            let mut point = Vector2::ZERO;
            let mut bulge = 0.0;
            while i < tags.len() {
                match tags[i].code {
                    10 => {
                        point.x = tags[i].as_f64().unwrap_or(0.0);
                        i += 1;
                    }
                    20 => {
                        point.y = tags[i].as_f64().unwrap_or(0.0);
                        i += 1;
                        // an optional bulge follows its vertex
                        if i < tags.len() && tags[i].code == 42 {
                            bulge = tags[i].as_f64().unwrap_or(0.0);
                            i += 1;
                        }
                        break;
                    }
                    _ => i += 1,
                }
            }
            path.vertices.push((point, bulge));
        }
    } else {
        // edge list form
        let mut count = 0usize;
        while i < tags.len() {
            if tags[i].code == 93 {
                count = tags[i].as_i32().unwrap_or(0).max(0) as usize;
                i += 1;
                break;
            }
            i += 1;
        }
        for _ in 0..count {
            while i < tags.len() && tags[i].code != 72 {
                i += 1;
            }
            if i >= tags.len() {
                break;
            }
            let edge_type = tags[i].as_i16().unwrap_or(1);
            i += 1;
            match edge_type {
                2 => {
                    let mut center = Vector2::ZERO;
                    let mut radius = 1.0;
                    let mut start_angle = 0.0;
                    let mut end_angle = 360.0;
                    let mut ccw = true;
                    while i < tags.len() {
                        match tags[i].code {
                            10 => center.x = tags[i].as_f64().unwrap_or(0.0),
                            20 => center.y = tags[i].as_f64().unwrap_or(0.0),
                            40 => radius = tags[i].as_f64().unwrap_or(1.0),
                            50 => start_angle = tags[i].as_f64().unwrap_or(0.0),
                            51 => end_angle = tags[i].as_f64().unwrap_or(360.0),
                            73 => {
                                ccw = tags[i].as_i16().unwrap_or(1) != 0;
                                i += 1;
                                break;
                            }
                            _ => break,
                        }
                        i += 1;
                    }
                    path.edges.push(BoundaryEdge::Arc {
                        center,
                        radius,
                        start_angle,
                        end_angle,
                        counter_clockwise: ccw,
                    });
                }
                _ => {
                    let mut start = Vector2::ZERO;
                    let mut end = Vector2::ZERO;
                    while i < tags.len() {
                        match tags[i].code {
                            10 => start.x = tags[i].as_f64().unwrap_or(0.0),
                            20 => start.y = tags[i].as_f64().unwrap_or(0.0),
                            11 => end.x = tags[i].as_f64().unwrap_or(0.0),
                            21 => {
                                end.y = tags[i].as_f64().unwrap_or(0.0);
                                i += 1;
                                break;
                            }
                            _ => break,
                        }
                        i += 1;
                    }
                    path.edges.push(BoundaryEdge::Line { start, end });
                }
            }
        }
    }

    // boundary source handles
    while i < tags.len() {
        match tags[i].code {
            97 => {
                let count = tags[i].as_i32().unwrap_or(0).max(0) as usize;
                i += 1;
                for _ in 0..count {
                    if i < tags.len() && tags[i].code == 330 {
                        if let Some(handle) = tags[i].as_handle() {
                            path.handles.push(handle);
                        }
                        i += 1;
                    }
                }
                break;
            }
            92 => break,
            _ => i += 1,
        }
    }

    (path, i)
}

// ----------------------------------------------------------------------
// Objects
// ----------------------------------------------------------------------

fn read_dictionary(tags: Vec<Tag>) -> RawDictionary {
    let mut dict = RawDictionary {
        handle: entry_handle(&tags, 5),
        ..Default::default()
    };
    let mut key: Option<String> = None;
    for tag in &tags {
        match tag.code {
            330 => dict.owner = tag.as_handle().unwrap_or(Handle::NULL),
            3 => key = Some(tag.as_str().to_string()),
            350 | 360 => {
                if let (Some(name), Some(handle)) = (key.take(), tag.as_handle()) {
                    dict.entries.push((name, handle));
                }
            }
            _ => {}
        }
    }
    dict
}

fn read_layout(tags: Vec<Tag>) -> Option<(Layout, Handle)> {
    let mut layout = Layout::new("", "", 0);
    layout.handle = entry_handle(&tags, 5);
    let mut block_handle = Handle::NULL;
    let mut in_layout = false;
    for tag in &tags {
        match tag.code {
            100 => in_layout = tag.as_str() == "AcDbLayout",
            1 if in_layout => layout.name = tag.as_str().to_string(),
            71 if in_layout => layout.tab_order = tag.as_i16().unwrap_or(0),
            10 if in_layout => layout.limits_min.x = tag.as_f64().unwrap_or(0.0),
            20 if in_layout => layout.limits_min.y = tag.as_f64().unwrap_or(0.0),
            11 if in_layout => layout.limits_max.x = tag.as_f64().unwrap_or(0.0),
            21 if in_layout => layout.limits_max.y = tag.as_f64().unwrap_or(0.0),
            330 if in_layout => block_handle = tag.as_handle().unwrap_or(Handle::NULL),
            _ => {}
        }
    }
    if layout.name.is_empty() {
        return None;
    }
    Some((layout, block_handle))
}

fn read_mline_style(doc: &mut CadDocument, tags: Vec<Tag>) {
    let (tags, xdata) = split_xdata(tags);
    let mut style = MLineStyle::new(entry_name(&tags));
    style.handle = entry_handle(&tags, 5);
    style.xdata = xdata;
    style.elements.clear();
    let mut seen_fill = false;
    for tag in &tags {
        match tag.code {
            3 => style.description = tag.as_str().to_string(),
            51 => style.start_angle = tag.as_f64().unwrap_or(90.0),
            52 => style.end_angle = tag.as_f64().unwrap_or(90.0),
            49 => style
                .elements
                .push(MLineStyleElement::new(tag.as_f64().unwrap_or(0.0))),
            62 => {
                let color = Color::from_index(tag.as_i16().unwrap_or(256));
                if let Some(element) = style.elements.last_mut() {
                    element.color = color;
                } else if !seen_fill {
                    style.fill_color = color;
                    seen_fill = true;
                }
            }
            6 => {
                if let Some(element) = style.elements.last_mut() {
                    element.line_type = tag.as_str().to_string();
                }
            }
            _ => {}
        }
    }
    doc.mline_styles.add(style);
}

fn read_group(tags: Vec<Tag>) -> Group {
    let mut group = Group::new("");
    group.handle = entry_handle(&tags, 5);
    for tag in &tags {
        match tag.code {
            300 => group.description = tag.as_str().to_string(),
            71 => group.is_selectable = tag.as_i16().unwrap_or(1) != 0,
            340 => {
                if let Some(handle) = tag.as_handle() {
                    group.entity_handles.push(handle);
                }
            }
            _ => {}
        }
    }
    group
}

fn read_raw_object(object_type: &str, tags: Vec<Tag>) -> RawObject {
    let mut object = RawObject::new(object_type);
    let mut seen_owner = false;
    for tag in tags {
        match tag.code {
            5 if object.handle.is_null() => {
                object.handle = tag.as_handle().unwrap_or(Handle::NULL);
            }
            330 if !seen_owner => {
                object.owner = tag.as_handle().unwrap_or(Handle::NULL);
                seen_owner = true;
            }
            _ => object.pairs.push((tag.code, tag.raw)),
        }
    }
    object
}

