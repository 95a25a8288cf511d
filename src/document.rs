//! The drawing document
//!
//! `CadDocument` aggregates one registry per table kind, the block
//! ownership graph, layouts, header variables and the non-graphical
//! objects. All reference-checked mutation (removal, rename, purge) goes
//! through the document because only the document can walk the whole graph.

use crate::blocks::{Block, MODEL_SPACE, PAPER_SPACE};
use crate::entities::EntityType;
use crate::error::{DxfError, Result};
use crate::header::HeaderVariables;
use crate::notification::{NotificationCollection, NotificationKind};
use crate::objects::{Group, Layout, RawObject};
use crate::tables::{
    table_key, AppId, DimStyle, Layer, LineType, MLineStyle, Table, TableEntry, TextStyle, Ucs,
    View,
};
use crate::types::{DxfVersion, Handle, HandleAllocator, Units};
use ahash::{AHashMap, AHashSet};
use indexmap::IndexMap;

/// Construction-time configuration for a document
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    /// Units stamped on blocks that do not specify their own
    pub default_block_units: Units,
}

/// A CAD document containing all drawing data
#[derive(Debug, Clone)]
pub struct CadDocument {
    /// Document dialect version
    pub version: DxfVersion,
    /// Header variables
    pub header: HeaderVariables,
    /// Leading file comments (code 999)
    pub comments: Vec<String>,
    /// Layer registry
    pub layers: Table<Layer>,
    /// Line type registry
    pub line_types: Table<LineType>,
    /// Text style registry
    pub text_styles: Table<TextStyle>,
    /// Dimension style registry
    pub dim_styles: Table<DimStyle>,
    /// Multiline style registry
    pub mline_styles: Table<MLineStyle>,
    /// Application registry
    pub app_ids: Table<AppId>,
    /// UCS registry
    pub ucss: Table<Ucs>,
    /// View registry
    pub views: Table<View>,
    /// Block registry (the block-record table)
    pub blocks: Table<Block>,
    /// Layouts keyed case-insensitively by name, in tab order
    layouts: IndexMap<String, Layout>,
    /// Groups keyed case-insensitively by name
    pub groups: IndexMap<String, Group>,
    /// OBJECTS entries preserved verbatim
    pub raw_objects: Vec<RawObject>,
    /// Diagnostics from the last read/write pass
    pub notifications: NotificationCollection,
    /// Name of the active layout
    active_layout: String,
    options: DocumentOptions,
    allocator: HandleAllocator,
}

impl CadDocument {
    /// Create a new document seeded with the standard entries
    pub fn new() -> Self {
        Self::with_options(DocumentOptions::default())
    }

    /// Create a document with a specific dialect version
    pub fn with_version(version: DxfVersion) -> Self {
        let mut doc = Self::new();
        doc.version = version;
        doc
    }

    /// Create a document with explicit options
    pub fn with_options(options: DocumentOptions) -> Self {
        let mut doc = Self::bare(options);
        doc.seed_defaults();
        doc
    }

    /// A document with nothing in it; the reader builds on this so loaded
    /// objects keep the handles found in the file
    pub(crate) fn empty() -> Self {
        Self::bare(DocumentOptions::default())
    }

    fn bare(options: DocumentOptions) -> Self {
        CadDocument {
            version: DxfVersion::default(),
            header: HeaderVariables::new(),
            comments: Vec::new(),
            layers: Table::new(),
            line_types: Table::new(),
            text_styles: Table::new(),
            dim_styles: Table::new(),
            mline_styles: Table::new(),
            app_ids: Table::new(),
            ucss: Table::new(),
            views: Table::new(),
            blocks: Table::new(),
            layouts: IndexMap::new(),
            groups: IndexMap::new(),
            raw_objects: Vec::new(),
            notifications: NotificationCollection::new(),
            active_layout: "Model".to_string(),
            options,
            allocator: HandleAllocator::new(),
        }
    }

    /// Seed or complete the reserved entries every document carries.
    ///
    /// Entries that already exist are left alone, so a freshly loaded
    /// document keeps the handles it was read with.
    pub(crate) fn seed_defaults(&mut self) {
        let alloc = &mut self.allocator;
        add_seed(&mut self.line_types, alloc, LineType::by_layer());
        add_seed(&mut self.line_types, alloc, LineType::by_block());
        add_seed(&mut self.line_types, alloc, LineType::continuous());
        add_seed(&mut self.layers, alloc, Layer::default_layer());
        add_seed(&mut self.text_styles, alloc, TextStyle::standard());
        add_seed(&mut self.dim_styles, alloc, DimStyle::standard());
        add_seed(&mut self.mline_styles, alloc, MLineStyle::standard());
        add_seed(&mut self.app_ids, alloc, AppId::acad());

        if !self.blocks.contains(MODEL_SPACE) {
            let block = Block::model_space();
            let entry = self.blocks.add(block);
            // attach cannot fail on an empty block
            let _ = entry.attach(alloc, self.options.default_block_units);
        }
        if !self.layouts.contains_key(&table_key("Model")) {
            let mut layout = Layout::model();
            layout.handle = alloc.next();
            self.layouts.insert(table_key("Model"), layout);
        }
        if self.layouts.len() == 1 {
            // give every fresh document one paper sheet, like the tools do
            if !self.blocks.contains(PAPER_SPACE) {
                let entry = self.blocks.add(Block::paper_space(PAPER_SPACE, "Layout1"));
                let _ = entry.attach(alloc, self.options.default_block_units);
            }
            let mut layout = Layout::new("Layout1", PAPER_SPACE, 1);
            layout.handle = alloc.next();
            self.layouts.insert(table_key("Layout1"), layout);
        }
    }

    /// $HANDSEED: the next handle a new object would receive
    pub fn next_handle(&self) -> u64 {
        self.allocator.peek()
    }

    /// Keep future allocations above a handle seen on the wire
    pub(crate) fn reserve_handles_through(&mut self, seen: u64) {
        self.allocator.reserve_through(seen);
    }

    // ------------------------------------------------------------------
    // Registry add wrappers (merge-by-name, handle assignment)
    // ------------------------------------------------------------------

    /// Add a layer, returning the canonical entry (merge-by-name)
    pub fn add_layer(&mut self, layer: Layer) -> &mut Layer {
        add_seed(&mut self.layers, &mut self.allocator, layer)
    }

    /// Add a line type, returning the canonical entry
    pub fn add_line_type(&mut self, line_type: LineType) -> &mut LineType {
        add_seed(&mut self.line_types, &mut self.allocator, line_type)
    }

    /// Add a text style, returning the canonical entry
    pub fn add_text_style(&mut self, style: TextStyle) -> &mut TextStyle {
        add_seed(&mut self.text_styles, &mut self.allocator, style)
    }

    /// Add a dimension style, returning the canonical entry
    pub fn add_dim_style(&mut self, style: DimStyle) -> &mut DimStyle {
        add_seed(&mut self.dim_styles, &mut self.allocator, style)
    }

    /// Add a multiline style, returning the canonical entry
    pub fn add_mline_style(&mut self, style: MLineStyle) -> &mut MLineStyle {
        add_seed(&mut self.mline_styles, &mut self.allocator, style)
    }

    /// Add an application registry entry, returning the canonical entry
    pub fn add_app_id(&mut self, app_id: AppId) -> &mut AppId {
        add_seed(&mut self.app_ids, &mut self.allocator, app_id)
    }

    /// Add a UCS, returning the canonical entry
    pub fn add_ucs(&mut self, ucs: Ucs) -> &mut Ucs {
        add_seed(&mut self.ucss, &mut self.allocator, ucs)
    }

    /// Add a view, returning the canonical entry
    pub fn add_view(&mut self, view: View) -> &mut View {
        add_seed(&mut self.views, &mut self.allocator, view)
    }

    /// Add a block, returning the canonical entry (merge-by-name).
    ///
    /// The block's contents are attached: missing handles are assigned in
    /// order, staged hatch boundary sources are adopted, and the document's
    /// default units are stamped if the block has none.
    pub fn add_block(&mut self, block: Block) -> Result<&mut Block> {
        let fresh = !self.blocks.contains(block.name());
        let entry = self.blocks.add(block);
        if fresh {
            entry.attach(&mut self.allocator, self.options.default_block_units)?;
        }
        Ok(entry)
    }

    // ------------------------------------------------------------------
    // Entity ownership
    // ------------------------------------------------------------------

    /// Add a detached entity to a block.
    ///
    /// Inserts get their attribute list synchronized from the referenced
    /// block's definitions here, at construction into the document.
    pub fn add_entity(&mut self, block_name: &str, mut entity: EntityType) -> Result<Handle> {
        if self.blocks.get(block_name).is_none() {
            return Err(DxfError::NameNotFound(block_name.to_string()));
        }

        // Boundary handles must already live in the target block
        if let EntityType::Hatch(hatch) = &entity {
            for handle in hatch.boundary_handles() {
                match self.owner_of(handle) {
                    Some(owner) if owner.eq_ignore_ascii_case(block_name) => {}
                    Some(owner) => {
                        return Err(DxfError::CrossBlockBoundary {
                            handle: handle.value(),
                            block: owner.to_string(),
                        })
                    }
                    None => return Err(DxfError::ObjectNotFound(handle.value())),
                }
            }
        }

        // Synchronize insert attributes from the referenced block
        if let EntityType::Insert(insert) = &mut entity {
            if insert.attributes.is_empty() {
                if let Some(source) = self.blocks.get(&insert.block_name) {
                    let defs: Vec<_> = source.attribute_definitions().to_vec();
                    insert.sync_attributes(defs.iter());
                }
            }
        }

        let mut alloc = std::mem::take(&mut self.allocator);
        let result = match self.blocks.get_mut(block_name) {
            None => Err(DxfError::NameNotFound(block_name.to_string())),
            Some(block) if block.is_read_only() => {
                Err(DxfError::ReservedName(block.name.clone()))
            }
            Some(block) => block.insert_with_adoption(entity, &mut alloc),
        };
        self.allocator = alloc;
        result
    }

    /// Add a detached entity to model space
    pub fn add_to_model_space(&mut self, entity: EntityType) -> Result<Handle> {
        self.add_entity(MODEL_SPACE, entity)
    }

    /// Remove an entity from a block.
    ///
    /// Fails with `OwnershipMismatch` when the block does not own the
    /// entity. Removing an associative hatch cascades to its boundary
    /// entities; removing an entity that a hatch tracks as a boundary
    /// unlinks it from that hatch.
    pub fn remove_entity(&mut self, block_name: &str, handle: Handle) -> Result<EntityType> {
        let block = self
            .blocks
            .get_mut(block_name)
            .ok_or_else(|| DxfError::NameNotFound(block_name.to_string()))?;
        let removed = block.remove_entity(handle)?;

        // Cascade: an associative hatch owns its boundary entities
        if let EntityType::Hatch(hatch) = &removed {
            if hatch.is_associative {
                for boundary in hatch.boundary_handles().collect::<Vec<_>>() {
                    let _ = block.remove_entity(boundary);
                }
            }
        }

        // Back-pointer cleanup on the remaining objects
        for entity in block.entities_mut() {
            if let EntityType::Hatch(hatch) = entity {
                let mut touched = false;
                for path in &mut hatch.paths {
                    let before = path.handles.len();
                    path.handles.retain(|h| *h != handle);
                    touched |= path.handles.len() != before;
                }
                if touched && hatch.boundary_handles().next().is_none() {
                    hatch.is_associative = false;
                }
            }
        }
        for group in self.groups.values_mut() {
            group.remove(handle);
        }

        Ok(removed)
    }

    /// Recompute an insert's attribute list from its block's current
    /// definitions. Never triggered implicitly by block mutation.
    pub fn sync_insert_attributes(&mut self, insert_handle: Handle) -> Result<()> {
        let owner = self
            .owner_of(insert_handle)
            .ok_or(DxfError::ObjectNotFound(insert_handle.value()))?
            .to_string();

        let block_name = match self
            .blocks
            .get(&owner)
            .and_then(|b| b.entity(insert_handle))
        {
            Some(EntityType::Insert(insert)) => insert.block_name.clone(),
            _ => return Err(DxfError::ObjectNotFound(insert_handle.value())),
        };

        let defs: Vec<_> = self
            .blocks
            .get(&block_name)
            .map(|b| b.attribute_definitions().to_vec())
            .unwrap_or_default();

        let mut alloc = std::mem::take(&mut self.allocator);
        if let Some(EntityType::Insert(insert)) = self
            .blocks
            .get_mut(&owner)
            .and_then(|b| b.entity_mut(insert_handle))
        {
            insert.sync_attributes(defs.iter());
            for attr in &mut insert.attributes {
                if attr.common.handle.is_null() {
                    attr.common.handle = alloc.next();
                }
            }
            if !insert.attributes.is_empty() && insert.seqend_handle.is_null() {
                insert.seqend_handle = alloc.next();
            }
        }
        self.allocator = alloc;
        Ok(())
    }

    /// Find an entity anywhere in the document
    pub fn entity(&self, handle: Handle) -> Option<&EntityType> {
        self.blocks.iter().find_map(|b| b.entity(handle))
    }

    /// Name of the block owning an entity
    pub fn owner_of(&self, handle: Handle) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.owns(handle))
            .map(|b| b.name())
    }

    /// The model space block
    pub fn model_space(&self) -> Option<&Block> {
        self.blocks.get(MODEL_SPACE)
    }

    /// The model space block, mutably
    pub fn model_space_mut(&mut self) -> Option<&mut Block> {
        self.blocks.get_mut(MODEL_SPACE)
    }

    // ------------------------------------------------------------------
    // Reference tracking
    // ------------------------------------------------------------------

    /// Handles of every object referencing a layer
    pub fn layer_references(&self, name: &str) -> Vec<Handle> {
        let mut refs = Vec::new();
        for block in self.blocks.iter() {
            for def in block.attribute_definitions() {
                if def.common.layer.eq_ignore_ascii_case(name) {
                    refs.push(def.common.handle);
                }
            }
        }
        self.walk_entities(|e| {
            if e.common().layer.eq_ignore_ascii_case(name) {
                refs.push(e.handle());
            }
        });
        refs
    }

    /// Handles of every object referencing a line type
    pub fn line_type_references(&self, name: &str) -> Vec<Handle> {
        let mut refs = Vec::new();
        for layer in self.layers.iter() {
            if layer.line_type.eq_ignore_ascii_case(name) {
                refs.push(layer.handle);
            }
        }
        self.walk_entities(|e| {
            if e.common().line_type.eq_ignore_ascii_case(name) {
                refs.push(e.handle());
            }
        });
        refs
    }

    /// Handles of every object referencing a text style
    pub fn text_style_references(&self, name: &str) -> Vec<Handle> {
        let mut refs = Vec::new();
        for style in self.dim_styles.iter() {
            if style.text_style.eq_ignore_ascii_case(name) {
                refs.push(style.handle);
            }
        }
        for block in self.blocks.iter() {
            for def in block.attribute_definitions() {
                if def.style.eq_ignore_ascii_case(name) {
                    refs.push(def.common.handle);
                }
            }
        }
        self.walk_entities(|e| {
            let references = match e {
                EntityType::Text(t) => t.style.eq_ignore_ascii_case(name),
                EntityType::AttributeDefinition(d) => d.style.eq_ignore_ascii_case(name),
                EntityType::Insert(i) => i
                    .attributes
                    .iter()
                    .any(|a| a.style.eq_ignore_ascii_case(name)),
                _ => false,
            };
            if references {
                refs.push(e.handle());
            }
        });
        refs
    }

    /// Handles of every object referencing a dimension style
    pub fn dim_style_references(&self, name: &str) -> Vec<Handle> {
        let mut refs = Vec::new();
        self.walk_entities(|e| {
            if let EntityType::Dimension(d) = e {
                if d.style.eq_ignore_ascii_case(name) {
                    refs.push(e.handle());
                }
            }
        });
        refs
    }

    /// Handles of every object carrying XData under an application name
    pub fn app_id_references(&self, name: &str) -> Vec<Handle> {
        let mut refs = Vec::new();
        self.walk_entities(|e| {
            if e.common().xdata.references_app(name) {
                refs.push(e.handle());
            }
        });
        for layer in self.layers.iter() {
            if layer.xdata.references_app(name) {
                refs.push(layer.handle);
            }
        }
        for lt in self.line_types.iter() {
            if lt.xdata.references_app(name) {
                refs.push(lt.handle);
            }
        }
        for st in self.text_styles.iter() {
            if st.xdata.references_app(name) {
                refs.push(st.handle);
            }
        }
        for ds in self.dim_styles.iter() {
            if ds.xdata.references_app(name) {
                refs.push(ds.handle);
            }
        }
        refs
    }

    /// Handles of every object referencing a block (inserts and layouts)
    pub fn block_references(&self, name: &str) -> Vec<Handle> {
        let mut refs = Vec::new();
        self.walk_entities(|e| {
            if let EntityType::Insert(i) = e {
                if i.block_name.eq_ignore_ascii_case(name) {
                    refs.push(e.handle());
                }
            }
        });
        for layout in self.layouts.values() {
            if layout.block_name.eq_ignore_ascii_case(name) {
                refs.push(layout.handle);
            }
        }
        refs
    }

    fn walk_entities<'a>(&'a self, mut visit: impl FnMut(&'a EntityType)) {
        for block in self.blocks.iter() {
            for entity in block.entities() {
                visit(entity);
            }
        }
    }

    // ------------------------------------------------------------------
    // Checked removal, rename, purge
    // ------------------------------------------------------------------

    /// Remove a layer; fails while referenced or reserved
    pub fn remove_layer(&mut self, name: &str) -> Result<Layer> {
        check_removal(&self.layers, name, self.layer_references(name).len())?;
        Ok(self.layers.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a line type; fails while referenced or reserved
    pub fn remove_line_type(&mut self, name: &str) -> Result<LineType> {
        check_removal(&self.line_types, name, self.line_type_references(name).len())?;
        Ok(self.line_types.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a text style; fails while referenced or reserved
    pub fn remove_text_style(&mut self, name: &str) -> Result<TextStyle> {
        check_removal(&self.text_styles, name, self.text_style_references(name).len())?;
        Ok(self.text_styles.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a dimension style; fails while referenced or reserved
    pub fn remove_dim_style(&mut self, name: &str) -> Result<DimStyle> {
        check_removal(&self.dim_styles, name, self.dim_style_references(name).len())?;
        Ok(self.dim_styles.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a multiline style; fails while reserved
    pub fn remove_mline_style(&mut self, name: &str) -> Result<MLineStyle> {
        check_removal(&self.mline_styles, name, 0)?;
        Ok(self.mline_styles.remove_unchecked(name).expect("checked above"))
    }

    /// Remove an application registry entry; fails while referenced
    pub fn remove_app_id(&mut self, name: &str) -> Result<AppId> {
        check_removal(&self.app_ids, name, self.app_id_references(name).len())?;
        Ok(self.app_ids.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a UCS
    pub fn remove_ucs(&mut self, name: &str) -> Result<Ucs> {
        check_removal(&self.ucss, name, 0)?;
        Ok(self.ucss.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a view
    pub fn remove_view(&mut self, name: &str) -> Result<View> {
        check_removal(&self.views, name, 0)?;
        Ok(self.views.remove_unchecked(name).expect("checked above"))
    }

    /// Remove a block and every entity it owns; fails while any insert or
    /// layout references it, or for the reserved space blocks
    pub fn remove_block(&mut self, name: &str) -> Result<Block> {
        check_removal(&self.blocks, name, self.block_references(name).len())?;
        Ok(self.blocks.remove_unchecked(name).expect("checked above"))
    }

    /// Rename a layer, rewriting every reference to it
    pub fn rename_layer(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.layers.rename(name, new_name)?;
        for block in self.blocks.iter_mut() {
            for entity in block.entities_mut() {
                if entity.common().layer.eq_ignore_ascii_case(name) {
                    entity.common_mut().layer = new_name.to_string();
                }
            }
        }
        if self.header.current_layer.eq_ignore_ascii_case(name) {
            self.header.current_layer = new_name.to_string();
        }
        Ok(())
    }

    /// Rename a line type, rewriting every reference to it
    pub fn rename_line_type(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.line_types.rename(name, new_name)?;
        for layer in self.layers.iter_mut() {
            if layer.line_type.eq_ignore_ascii_case(name) {
                layer.line_type = new_name.to_string();
            }
        }
        for block in self.blocks.iter_mut() {
            for entity in block.entities_mut() {
                if entity.common().line_type.eq_ignore_ascii_case(name) {
                    entity.common_mut().line_type = new_name.to_string();
                }
            }
        }
        if self.header.current_line_type.eq_ignore_ascii_case(name) {
            self.header.current_line_type = new_name.to_string();
        }
        Ok(())
    }

    /// Rename a text style, rewriting every reference to it
    pub fn rename_text_style(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.text_styles.rename(name, new_name)?;
        for style in self.dim_styles.iter_mut() {
            if style.text_style.eq_ignore_ascii_case(name) {
                style.text_style = new_name.to_string();
            }
        }
        for block in self.blocks.iter_mut() {
            for entity in block.entities_mut() {
                match entity {
                    EntityType::Text(t) if t.style.eq_ignore_ascii_case(name) => {
                        t.style = new_name.to_string();
                    }
                    EntityType::AttributeDefinition(d) if d.style.eq_ignore_ascii_case(name) => {
                        d.style = new_name.to_string();
                    }
                    EntityType::Insert(i) => {
                        for attr in &mut i.attributes {
                            if attr.style.eq_ignore_ascii_case(name) {
                                attr.style = new_name.to_string();
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        if self.header.current_text_style.eq_ignore_ascii_case(name) {
            self.header.current_text_style = new_name.to_string();
        }
        Ok(())
    }

    /// Rename a dimension style, rewriting every reference to it
    pub fn rename_dim_style(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.dim_styles.rename(name, new_name)?;
        for block in self.blocks.iter_mut() {
            for entity in block.entities_mut() {
                if let EntityType::Dimension(d) = entity {
                    if d.style.eq_ignore_ascii_case(name) {
                        d.style = new_name.to_string();
                    }
                }
            }
        }
        if self.header.current_dim_style.eq_ignore_ascii_case(name) {
            self.header.current_dim_style = new_name.to_string();
        }
        Ok(())
    }

    /// Rename a block, rewriting every insert and layout referencing it
    pub fn rename_block(&mut self, name: &str, new_name: &str) -> Result<()> {
        self.blocks.rename(name, new_name)?;
        for block in self.blocks.iter_mut() {
            for entity in block.entities_mut() {
                if let EntityType::Insert(i) = entity {
                    if i.block_name.eq_ignore_ascii_case(name) {
                        i.block_name = new_name.to_string();
                    }
                }
            }
        }
        for layout in self.layouts.values_mut() {
            if layout.block_name.eq_ignore_ascii_case(name) {
                layout.block_name = new_name.to_string();
            }
        }
        Ok(())
    }

    /// Best-effort purge: remove every non-reserved, unreferenced entry
    /// from every registry. In-use entries are silently kept. Returns the
    /// number of removed entries.
    pub fn purge(&mut self) -> usize {
        let mut removed = 0;

        // One graph walk per reference kind, collected into name sets
        let mut used_layers: AHashSet<String> = AHashSet::new();
        let mut used_line_types: AHashSet<String> = AHashSet::new();
        let mut used_text_styles: AHashSet<String> = AHashSet::new();
        let mut used_dim_styles: AHashSet<String> = AHashSet::new();
        let mut used_app_ids: AHashSet<String> = AHashSet::new();
        let mut used_blocks: AHashSet<String> = AHashSet::new();

        for layer in self.layers.iter() {
            used_line_types.insert(table_key(&layer.line_type));
            for record in layer.xdata.iter() {
                used_app_ids.insert(table_key(&record.app_name));
            }
        }
        for style in self.dim_styles.iter() {
            used_text_styles.insert(table_key(&style.text_style));
        }
        for block in self.blocks.iter() {
            for def in block.attribute_definitions() {
                used_layers.insert(table_key(&def.common.layer));
                used_text_styles.insert(table_key(&def.style));
            }
        }
        self.walk_entities(|e| {
            used_layers.insert(table_key(&e.common().layer));
            used_line_types.insert(table_key(&e.common().line_type));
            for record in e.common().xdata.iter() {
                used_app_ids.insert(table_key(&record.app_name));
            }
            match e {
                EntityType::Text(t) => {
                    used_text_styles.insert(table_key(&t.style));
                }
                EntityType::AttributeDefinition(d) => {
                    used_text_styles.insert(table_key(&d.style));
                }
                EntityType::Dimension(d) => {
                    used_dim_styles.insert(table_key(&d.style));
                }
                EntityType::Insert(i) => {
                    used_blocks.insert(table_key(&i.block_name));
                    for attr in &i.attributes {
                        used_text_styles.insert(table_key(&attr.style));
                    }
                }
                _ => {}
            }
        });
        for layout in self.layouts.values() {
            used_blocks.insert(table_key(&layout.block_name));
        }

        removed += purge_table(&mut self.layers, &used_layers);
        removed += purge_table(&mut self.line_types, &used_line_types);
        removed += purge_table(&mut self.text_styles, &used_text_styles);
        removed += purge_table(&mut self.dim_styles, &used_dim_styles);
        removed += purge_table(&mut self.app_ids, &used_app_ids);
        removed += purge_table(&mut self.blocks, &used_blocks);
        removed += purge_table(&mut self.mline_styles, &AHashSet::new());
        removed += purge_table(&mut self.ucss, &AHashSet::new());
        removed += purge_table(&mut self.views, &AHashSet::new());

        removed
    }

    // ------------------------------------------------------------------
    // Layouts
    // ------------------------------------------------------------------

    /// Layouts in tab order
    pub fn layouts(&self) -> impl Iterator<Item = &Layout> {
        self.layouts.values()
    }

    /// Look up a layout by name (case-insensitive)
    pub fn layout(&self, name: &str) -> Option<&Layout> {
        self.layouts.get(&table_key(name))
    }

    /// Create a new paper layout with its own paper space block
    pub fn add_layout(&mut self, name: &str) -> Result<&Layout> {
        let key = table_key(name);
        if self.layouts.contains_key(&key) {
            return Err(DxfError::DuplicateName(name.to_string()));
        }
        // *Paper_Space, then *Paper_Space0, *Paper_Space1, ...
        let mut block_name = PAPER_SPACE.to_string();
        let mut counter = 0usize;
        while self.blocks.contains(&block_name) {
            block_name = format!("{}{}", PAPER_SPACE, counter);
            counter += 1;
        }
        let entry = self.blocks.add(Block::paper_space(&block_name, name));
        entry.attach(&mut self.allocator, self.options.default_block_units)?;

        let tab_order = self.layouts.len() as i16;
        let mut layout = Layout::new(name, block_name, tab_order);
        layout.handle = self.allocator.next();
        self.layouts.insert(key.clone(), layout);
        Ok(&self.layouts[&key])
    }

    /// Insert a layout built by the reader, keeping its block binding
    pub(crate) fn insert_layout_raw(&mut self, layout: Layout) {
        self.layouts.insert(table_key(&layout.name), layout);
    }

    /// Remove a paper layout and its block (with every entity the block
    /// owns). The model layout cannot be removed.
    pub fn remove_layout(&mut self, name: &str) -> Result<Layout> {
        let key = table_key(name);
        let layout = self
            .layouts
            .get(&key)
            .ok_or_else(|| DxfError::NameNotFound(name.to_string()))?;
        if layout.is_model() {
            return Err(DxfError::ReservedName(layout.name.clone()));
        }
        let block_name = layout.block_name.clone();
        let layout = self.layouts.shift_remove(&key).expect("checked above");
        // The layout was the only legal referrer of its space block
        self.blocks.remove_unchecked(&block_name);
        if self.active_layout.eq_ignore_ascii_case(name) {
            self.active_layout = "Model".to_string();
        }
        Ok(layout)
    }

    /// Name of the active layout
    pub fn active_layout(&self) -> &str {
        &self.active_layout
    }

    /// Switch the active layout
    pub fn set_active_layout(&mut self, name: &str) -> Result<()> {
        let layout = self
            .layouts
            .get(&table_key(name))
            .ok_or_else(|| DxfError::NameNotFound(name.to_string()))?;
        self.active_layout = layout.name.clone();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    /// Add a group; fails with `DuplicateName` when the name is taken
    pub fn add_group(&mut self, mut group: Group) -> Result<&Group> {
        let key = table_key(&group.name);
        if self.groups.contains_key(&key) {
            return Err(DxfError::DuplicateName(group.name));
        }
        if group.handle.is_null() {
            group.handle = self.allocator.next();
        }
        self.groups.insert(key.clone(), group);
        Ok(&self.groups[&key])
    }

    /// Remove a group; member entities are untouched
    pub fn remove_group(&mut self, name: &str) -> Option<Group> {
        self.groups.shift_remove(&table_key(name))
    }

    // ------------------------------------------------------------------
    // Post-load resolution
    // ------------------------------------------------------------------

    /// Second pass after a load: bump the handle counter above everything
    /// seen, complete the reserved entries, and substitute fallbacks for
    /// dangling references. Reference problems never fail the load.
    pub(crate) fn resolve_after_load(&mut self) {
        // 1. handle seed above every handle in the file
        let mut max_handle = 0u64;
        let mut see = |h: Handle| {
            if h.value() > max_handle {
                max_handle = h.value();
            }
        };
        for layer in self.layers.iter() {
            see(layer.handle);
        }
        for lt in self.line_types.iter() {
            see(lt.handle);
        }
        for st in self.text_styles.iter() {
            see(st.handle);
        }
        for ds in self.dim_styles.iter() {
            see(ds.handle);
        }
        for ms in self.mline_styles.iter() {
            see(ms.handle);
        }
        for app in self.app_ids.iter() {
            see(app.handle);
        }
        for ucs in self.ucss.iter() {
            see(ucs.handle);
        }
        for view in self.views.iter() {
            see(view.handle);
        }
        for block in self.blocks.iter() {
            see(block.record_handle);
            see(block.block_handle);
            see(block.end_handle);
            for def in block.attribute_definitions() {
                see(def.common.handle);
            }
            for entity in block.entities() {
                see(entity.handle());
                if let EntityType::Insert(insert) = entity {
                    for attr in &insert.attributes {
                        see(attr.common.handle);
                    }
                }
            }
        }
        for layout in self.layouts.values() {
            see(layout.handle);
        }
        for group in self.groups.values() {
            see(group.handle);
        }
        for obj in &self.raw_objects {
            see(obj.handle);
        }
        self.allocator.reserve_through(max_handle);

        // 2. reserved entries the file may have omitted
        self.seed_defaults();

        // 3. register application ids seen in XData
        let mut xdata_apps: AHashSet<String> = AHashSet::new();
        self.walk_entities(|e| {
            for record in e.common().xdata.iter() {
                xdata_apps.insert(record.app_name.clone());
            }
        });
        for app in xdata_apps {
            if !self.app_ids.contains(&app) {
                self.add_app_id(AppId::new(app));
            }
        }

        // 4. dangling name references fall back to the defaults
        self.substitute_dangling_names();

        // 5. hatch boundary and group members must exist in the graph
        self.validate_handle_references();

        // 6. every block needs units and owners stamped
        let default_units = self.options.default_block_units;
        for block in self.blocks.iter_mut() {
            if block.units.is_none() {
                block.units = Some(default_units);
            }
            let name = block.name().to_string();
            for entity in block.entities_mut() {
                if entity.common().owner.is_none() {
                    entity.common_mut().owner = Some(name.clone());
                }
            }
        }

        // 7. inserts of blocks the file never defined get empty ones
        let mut missing_blocks: Vec<String> = Vec::new();
        self.walk_entities(|e| {
            if let EntityType::Insert(i) = e {
                if self.blocks.get(&i.block_name).is_none()
                    && !missing_blocks
                        .iter()
                        .any(|n| n.eq_ignore_ascii_case(&i.block_name))
                {
                    missing_blocks.push(i.block_name.clone());
                }
            }
        });
        for name in missing_blocks {
            self.notifications.notify(
                NotificationKind::Substituted,
                format!("block '{}' is not defined; an empty definition was created", name),
            );
            let _ = self.add_block(Block::new(name));
        }

        // 8. the active layout must exist
        if self.layout(&self.active_layout).is_none() {
            self.active_layout = "Model".to_string();
        }
    }

    fn substitute_dangling_names(&mut self) {
        let layer_names: AHashSet<String> =
            self.layers.names().map(table_key).collect();
        let line_type_names: AHashSet<String> =
            self.line_types.names().map(table_key).collect();
        let text_style_names: AHashSet<String> =
            self.text_styles.names().map(table_key).collect();
        let dim_style_names: AHashSet<String> =
            self.dim_styles.names().map(table_key).collect();

        let mut notes: Vec<String> = Vec::new();
        for layer in self.layers.iter_mut() {
            if !line_type_names.contains(&table_key(&layer.line_type)) {
                notes.push(format!(
                    "line type '{}' on layer '{}' -> 'Continuous'",
                    layer.line_type, layer.name
                ));
                layer.line_type = crate::tables::linetype::CONTINUOUS.to_string();
            }
        }
        for style in self.dim_styles.iter_mut() {
            if !text_style_names.contains(&table_key(&style.text_style)) {
                notes.push(format!(
                    "text style '{}' on dimension style '{}' -> 'Standard'",
                    style.text_style, style.name
                ));
                style.text_style = crate::tables::textstyle::STANDARD.to_string();
            }
        }
        for block in self.blocks.iter_mut() {
            for entity in block.entities_mut() {
                let common = entity.common_mut();
                if !layer_names.contains(&table_key(&common.layer)) {
                    notes.push(format!("layer '{}' -> '0'", common.layer));
                    common.layer = crate::tables::layer::DEFAULT_LAYER.to_string();
                }
                if !line_type_names.contains(&table_key(&common.line_type)) {
                    notes.push(format!("line type '{}' -> 'ByLayer'", common.line_type));
                    common.line_type = crate::tables::linetype::BY_LAYER.to_string();
                }
                match entity {
                    EntityType::Text(t) => {
                        if !text_style_names.contains(&table_key(&t.style)) {
                            notes.push(format!("text style '{}' -> 'Standard'", t.style));
                            t.style = crate::tables::textstyle::STANDARD.to_string();
                        }
                    }
                    EntityType::AttributeDefinition(d) => {
                        if !text_style_names.contains(&table_key(&d.style)) {
                            notes.push(format!("text style '{}' -> 'Standard'", d.style));
                            d.style = crate::tables::textstyle::STANDARD.to_string();
                        }
                    }
                    EntityType::Dimension(d) => {
                        if !dim_style_names.contains(&table_key(&d.style)) {
                            notes.push(format!("dimension style '{}' -> 'Standard'", d.style));
                            d.style = crate::tables::dimstyle::STANDARD.to_string();
                        }
                    }
                    _ => {}
                }
            }
        }
        if !layer_names.contains(&table_key(&self.header.current_layer)) {
            self.header.current_layer = crate::tables::layer::DEFAULT_LAYER.to_string();
        }
        for note in notes {
            self.notifications
                .notify(NotificationKind::Substituted, note);
        }
    }

    fn validate_handle_references(&mut self) {
        let mut owners: AHashMap<u64, String> = AHashMap::new();
        for block in self.blocks.iter() {
            for entity in block.entities() {
                owners.insert(entity.handle().value(), block.name().to_string());
            }
        }

        let mut notes: Vec<String> = Vec::new();
        for block in self.blocks.iter_mut() {
            let block_name = block.name().to_string();
            for entity in block.entities_mut() {
                if let EntityType::Hatch(hatch) = entity {
                    for path in &mut hatch.paths {
                        path.handles.retain(|h| {
                            match owners.get(&h.value()) {
                                Some(owner) if owner.eq_ignore_ascii_case(&block_name) => true,
                                Some(owner) => {
                                    notes.push(format!(
                                        "hatch boundary {:#X} owned by '{}' dropped",
                                        h.value(),
                                        owner
                                    ));
                                    false
                                }
                                None => {
                                    notes.push(format!(
                                        "hatch boundary {:#X} not found; dropped",
                                        h.value()
                                    ));
                                    false
                                }
                            }
                        });
                    }
                    if hatch.is_associative && hatch.boundary_handles().next().is_none() {
                        hatch.is_associative = false;
                    }
                }
            }
        }
        for group in self.groups.values_mut() {
            group
                .entity_handles
                .retain(|h| owners.contains_key(&h.value()));
        }
        for note in notes {
            self.notifications
                .notify(NotificationKind::Warning, note);
        }
    }

    /// Pre-save pass: everything persisted needs a handle, assigned in the
    /// fixed traversal order (tables, blocks and contents, then free
    /// objects).
    pub(crate) fn assign_missing_handles(&mut self) {
        let alloc = &mut self.allocator;
        for lt in self.line_types.iter_mut() {
            if lt.handle.is_null() {
                lt.handle = alloc.next();
            }
        }
        for layer in self.layers.iter_mut() {
            if layer.handle.is_null() {
                layer.handle = alloc.next();
            }
        }
        for st in self.text_styles.iter_mut() {
            if st.handle.is_null() {
                st.handle = alloc.next();
            }
        }
        for ds in self.dim_styles.iter_mut() {
            if ds.handle.is_null() {
                ds.handle = alloc.next();
            }
        }
        for ms in self.mline_styles.iter_mut() {
            if ms.handle.is_null() {
                ms.handle = alloc.next();
            }
        }
        for app in self.app_ids.iter_mut() {
            if app.handle.is_null() {
                app.handle = alloc.next();
            }
        }
        for ucs in self.ucss.iter_mut() {
            if ucs.handle.is_null() {
                ucs.handle = alloc.next();
            }
        }
        for view in self.views.iter_mut() {
            if view.handle.is_null() {
                view.handle = alloc.next();
            }
        }
        let default_units = self.options.default_block_units;
        for block in self.blocks.iter_mut() {
            // attach is idempotent for already-attached blocks
            let _ = block.attach(alloc, default_units);
        }
        for layout in self.layouts.values_mut() {
            if layout.handle.is_null() {
                layout.handle = alloc.next();
            }
        }
        for group in self.groups.values_mut() {
            if group.handle.is_null() {
                group.handle = alloc.next();
            }
        }
        for obj in &mut self.raw_objects {
            if obj.handle.is_null() {
                obj.handle = alloc.next();
            }
        }
    }
}

impl Default for CadDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge into a table, allocating a handle only for fresh entries without
/// one (loaded entries keep their file handles).
fn add_seed<'t, T: TableEntry>(
    table: &'t mut Table<T>,
    alloc: &mut HandleAllocator,
    entry: T,
) -> &'t mut T {
    let canonical = table.add(entry);
    if canonical.handle().is_null() {
        canonical.set_handle(alloc.next());
    }
    canonical
}

fn check_removal<T: TableEntry>(table: &Table<T>, name: &str, ref_count: usize) -> Result<()> {
    let entry = table
        .get(name)
        .ok_or_else(|| DxfError::NameNotFound(name.to_string()))?;
    if entry.is_reserved() {
        return Err(DxfError::ReservedName(entry.name().to_string()));
    }
    if ref_count > 0 {
        return Err(DxfError::InUse {
            name: entry.name().to_string(),
            count: ref_count,
        });
    }
    Ok(())
}

fn purge_table<T: TableEntry>(table: &mut Table<T>, used: &AHashSet<String>) -> usize {
    let removable: Vec<String> = table
        .iter()
        .filter(|e| !e.is_reserved() && !used.contains(&table_key(e.name())))
        .map(|e| e.name().to_string())
        .collect();
    for name in &removable {
        table.remove_unchecked(name);
    }
    removable.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Line;
    use crate::types::Vector3;

    fn line() -> EntityType {
        Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)).into()
    }

    #[test]
    fn test_new_document_is_seeded() {
        let doc = CadDocument::new();
        assert!(doc.layers.contains("0"));
        assert!(doc.line_types.contains("ByLayer"));
        assert!(doc.line_types.contains("Continuous"));
        assert!(doc.text_styles.contains("Standard"));
        assert!(doc.blocks.contains(MODEL_SPACE));
        assert!(doc.layout("Model").is_some());
        assert!(doc.layout("Layout1").is_some());
    }

    #[test]
    fn test_add_entity_assigns_handle_and_owner() {
        let mut doc = CadDocument::new();
        let handle = doc.add_to_model_space(line()).unwrap();
        assert!(!handle.is_null());
        let entity = doc.entity(handle).unwrap();
        assert_eq!(entity.common().owner.as_deref(), Some(MODEL_SPACE));
    }

    #[test]
    fn test_remove_entity_detaches() {
        let mut doc = CadDocument::new();
        let handle = doc.add_to_model_space(line()).unwrap();
        let removed = doc.remove_entity(MODEL_SPACE, handle).unwrap();
        assert_eq!(removed.common().owner, None);
        assert!(matches!(
            doc.remove_entity(MODEL_SPACE, handle),
            Err(DxfError::OwnershipMismatch { .. })
        ));
    }

    #[test]
    fn test_remove_layer_in_use() {
        let mut doc = CadDocument::new();
        doc.add_layer(Layer::new("Walls"));
        let mut e = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        e.common.layer = "Walls".to_string();
        let handle = doc.add_to_model_space(e.into()).unwrap();

        assert!(matches!(
            doc.remove_layer("Walls"),
            Err(DxfError::InUse { .. })
        ));
        doc.remove_entity(MODEL_SPACE, handle).unwrap();
        assert!(doc.remove_layer("Walls").is_ok());
    }

    #[test]
    fn test_reserved_layer_never_removable() {
        let mut doc = CadDocument::new();
        assert!(matches!(
            doc.remove_layer("0"),
            Err(DxfError::ReservedName(_))
        ));
    }

    #[test]
    fn test_rename_layer_rewrites_references() {
        let mut doc = CadDocument::new();
        doc.add_layer(Layer::new("Old"));
        let mut e = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        e.common.layer = "Old".to_string();
        let handle = doc.add_to_model_space(e.into()).unwrap();

        doc.rename_layer("Old", "New").unwrap();
        assert_eq!(doc.entity(handle).unwrap().common().layer, "New");
        assert!(doc.layers.contains("New"));
        assert!(!doc.layers.contains("Old"));
    }

    #[test]
    fn test_purge_keeps_used_and_reserved() {
        let mut doc = CadDocument::new();
        doc.add_layer(Layer::new("Used"));
        doc.add_layer(Layer::new("Unused"));
        let mut e = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        e.common.layer = "Used".to_string();
        doc.add_to_model_space(e.into()).unwrap();

        doc.purge();
        assert!(doc.layers.contains("0"));
        assert!(doc.layers.contains("Used"));
        assert!(!doc.layers.contains("Unused"));
    }

    #[test]
    fn test_add_layout_names_paper_blocks() {
        let mut doc = CadDocument::new();
        doc.add_layout("Sheet2").unwrap();
        let layout = doc.layout("Sheet2").unwrap();
        assert_eq!(layout.block_name, "*Paper_Space0");
        assert!(doc.blocks.contains("*Paper_Space0"));
    }

    #[test]
    fn test_remove_model_layout_refused() {
        let mut doc = CadDocument::new();
        assert!(matches!(
            doc.remove_layout("Model"),
            Err(DxfError::ReservedName(_))
        ));
    }

    #[test]
    fn test_merge_by_name_identity() {
        let mut doc = CadDocument::new();
        doc.add_layer(Layer::with_color("L1", crate::types::Color::RED));
        let merged = doc.add_layer(Layer::with_color("l1", crate::types::Color::BLUE));
        // The canonical entry keeps the first definition
        assert_eq!(merged.color, crate::types::Color::RED);
        assert_eq!(doc.layers.len(), 2); // "0" and "L1"
    }
}
