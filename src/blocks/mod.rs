//! Block definitions and the entity ownership graph
//!
//! A block is the only owner an entity can have: the entity value lives in
//! the block's vector. Blocks double as their own block-record table entry,
//! so the block registry gives the one-to-one record identity the format
//! requires.

use crate::entities::{AttributeDefinition, EntityType};
use crate::error::{DxfError, Result};
use crate::tables::TableEntry;
use crate::types::{Handle, HandleAllocator, Units, Vector3};

/// Name of the model space block
pub const MODEL_SPACE: &str = "*Model_Space";
/// Name of the primary paper space block
pub const PAPER_SPACE: &str = "*Paper_Space";

/// A block definition: named container of entities and attribute
/// definitions, plus its block-record metadata.
#[derive(Debug, Clone)]
pub struct Block {
    /// Handle of the block-record table entry
    pub record_handle: Handle,
    /// Handle of the BLOCK entity marker
    pub block_handle: Handle,
    /// Handle of the ENDBLK terminating marker
    pub end_handle: Handle,
    /// Block name
    pub name: String,
    /// Description text
    pub description: String,
    /// Base point for inserts
    pub base_point: Vector3,
    /// Insertion units; `None` takes the document default on attach
    pub units: Option<Units>,
    /// Whether this block comes from an external reference
    pub is_xref: bool,
    /// Path of the external reference, if any
    pub xref_path: String,
    /// Name of the layout bound to this block, for space blocks
    pub layout: Option<String>,
    /// Attribute definitions; tag-unique through the API, the lenient
    /// reader may append duplicates
    attdefs: Vec<AttributeDefinition>,
    /// Owned entities
    entities: Vec<EntityType>,
}

impl Block {
    /// Create a new user block
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            record_handle: Handle::NULL,
            block_handle: Handle::NULL,
            end_handle: Handle::NULL,
            name: name.into(),
            description: String::new(),
            base_point: Vector3::ZERO,
            units: None,
            is_xref: false,
            xref_path: String::new(),
            layout: None,
            attdefs: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// The model space block
    pub fn model_space() -> Self {
        let mut block = Block::new(MODEL_SPACE);
        block.layout = Some("Model".to_string());
        block
    }

    /// A paper space block bound to a layout
    pub fn paper_space(name: impl Into<String>, layout: impl Into<String>) -> Self {
        let mut block = Block::new(name);
        block.layout = Some(layout.into());
        block
    }

    pub fn is_model_space(&self) -> bool {
        self.name.eq_ignore_ascii_case(MODEL_SPACE)
    }

    pub fn is_paper_space(&self) -> bool {
        self.name.to_uppercase().starts_with(&PAPER_SPACE.to_uppercase())
    }

    /// Space and xref blocks refuse structural mutation through the API
    pub fn is_read_only(&self) -> bool {
        self.is_xref
    }

    /// Add a detached entity to this block.
    ///
    /// Fails with `AlreadyOwned` if the entity belongs to another block;
    /// use [`EntityType::detached_clone`] to move copies between documents.
    pub fn add_entity(&mut self, mut entity: EntityType) -> Result<()> {
        if let Some(owner) = &entity.common().owner {
            if !owner.eq_ignore_ascii_case(&self.name) {
                return Err(DxfError::AlreadyOwned(owner.clone()));
            }
        }
        entity.common_mut().owner = Some(self.name.clone());
        self.entities.push(entity);
        Ok(())
    }

    /// Remove an entity by handle.
    ///
    /// Fails with `OwnershipMismatch` when no entity with that handle is
    /// owned by this block. The returned entity is detached.
    pub fn remove_entity(&mut self, handle: Handle) -> Result<EntityType> {
        let index = self
            .entities
            .iter()
            .position(|e| e.handle() == handle)
            .ok_or_else(|| DxfError::OwnershipMismatch {
                handle: handle.value(),
                block: self.name.clone(),
            })?;
        let mut entity = self.entities.remove(index);
        entity.common_mut().owner = None;
        Ok(entity)
    }

    /// Get an entity by handle
    pub fn entity(&self, handle: Handle) -> Option<&EntityType> {
        self.entities.iter().find(|e| e.handle() == handle)
    }

    /// Get a mutable entity by handle
    pub fn entity_mut(&mut self, handle: Handle) -> Option<&mut EntityType> {
        self.entities.iter_mut().find(|e| e.handle() == handle)
    }

    /// Whether an entity with this handle is owned by the block
    pub fn owns(&self, handle: Handle) -> bool {
        self.entities.iter().any(|e| e.handle() == handle)
    }

    /// Iterate owned entities in order
    pub fn entities(&self) -> impl Iterator<Item = &EntityType> {
        self.entities.iter()
    }

    /// Iterate owned entities mutably
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut EntityType> {
        self.entities.iter_mut()
    }

    /// Number of owned entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Add an attribute definition; its tag must be unique in this block
    pub fn add_attribute_definition(&mut self, def: AttributeDefinition) -> Result<()> {
        if self
            .attdefs
            .iter()
            .any(|d| d.tag.eq_ignore_ascii_case(&def.tag))
        {
            return Err(DxfError::DuplicateTag(def.tag));
        }
        self.attdefs.push(def);
        Ok(())
    }

    /// Append an attribute definition without the tag check. Reader only.
    pub(crate) fn push_attribute_definition(&mut self, def: AttributeDefinition) {
        self.attdefs.push(def);
    }

    /// Remove an attribute definition by tag
    pub fn remove_attribute_definition(&mut self, tag: &str) -> Option<AttributeDefinition> {
        let index = self
            .attdefs
            .iter()
            .position(|d| d.tag.eq_ignore_ascii_case(tag))?;
        Some(self.attdefs.remove(index))
    }

    /// The block's attribute definitions
    pub fn attribute_definitions(&self) -> &[AttributeDefinition] {
        &self.attdefs
    }

    /// Document-side insertion: assigns missing handles, sets the owner and
    /// adopts any staged hatch boundary sources into this block.
    pub(crate) fn insert_with_adoption(
        &mut self,
        mut entity: EntityType,
        alloc: &mut HandleAllocator,
    ) -> Result<Handle> {
        if let Some(owner) = &entity.common().owner {
            if !owner.eq_ignore_ascii_case(&self.name) {
                return Err(DxfError::AlreadyOwned(owner.clone()));
            }
        }
        if entity.common().handle.is_null() {
            entity.common_mut().handle = alloc.next();
        }
        let handle = entity.handle();
        entity.common_mut().owner = Some(self.name.clone());

        if let EntityType::Hatch(hatch) = &mut entity {
            let mut adopted = Vec::new();
            for path in &mut hatch.paths {
                for mut src in path.sources.drain(..) {
                    if let Some(owner) = &src.common().owner {
                        if !owner.eq_ignore_ascii_case(&self.name) {
                            return Err(DxfError::CrossBlockBoundary {
                                handle: src.handle().value(),
                                block: owner.clone(),
                            });
                        }
                    }
                    if src.common().handle.is_null() {
                        src.common_mut().handle = alloc.next();
                    }
                    src.common_mut().owner = Some(self.name.clone());
                    path.handles.push(src.handle());
                    adopted.push(src);
                }
            }
            if hatch.boundary_handles().next().is_some() {
                hatch.is_associative = true;
            }
            self.entities.extend(adopted);
        }

        if let EntityType::Insert(insert) = &mut entity {
            for attr in &mut insert.attributes {
                if attr.common.handle.is_null() {
                    attr.common.handle = alloc.next();
                }
            }
            if !insert.attributes.is_empty() && insert.seqend_handle.is_null() {
                insert.seqend_handle = alloc.next();
            }
        }

        self.entities.push(entity);
        Ok(handle)
    }

    /// Document attach: resolve the unit default and run every owned
    /// object through handle assignment and adoption, in order.
    pub(crate) fn attach(
        &mut self,
        alloc: &mut HandleAllocator,
        default_units: Units,
    ) -> Result<()> {
        if self.units.is_none() {
            self.units = Some(default_units);
        }
        if self.record_handle.is_null() {
            self.record_handle = alloc.next();
        }
        if self.block_handle.is_null() {
            self.block_handle = alloc.next();
        }
        if self.end_handle.is_null() {
            self.end_handle = alloc.next();
        }
        let name = self.name.clone();
        for def in &mut self.attdefs {
            def.common.owner = Some(name.clone());
            if def.common.handle.is_null() {
                def.common.handle = alloc.next();
            }
        }
        let staged = std::mem::take(&mut self.entities);
        for entity in staged {
            self.insert_with_adoption(entity, alloc)?;
        }
        Ok(())
    }
}

impl TableEntry for Block {
    fn handle(&self) -> Handle {
        self.record_handle
    }

    fn set_handle(&mut self, handle: Handle) {
        self.record_handle = handle;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        // Keep the owner back-pointers on owned entities in step
        for entity in &mut self.entities {
            entity.common_mut().owner = Some(name.clone());
        }
        self.name = name;
    }

    fn is_reserved(&self) -> bool {
        self.is_model_space() || self.is_paper_space()
    }
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
    fn test_add_sets_owner() {
        let mut block = Block::new("B");
        block.add_entity(line()).unwrap();
        let owner = block.entities().next().unwrap().common().owner.clone();
        assert_eq!(owner.as_deref(), Some("B"));
    }

    #[test]
    fn test_add_owned_entity_fails() {
        let mut a = Block::new("A");
        a.add_entity(line()).unwrap();
        let owned = a.entities().next().unwrap().clone();

        let mut b = Block::new("B");
        assert!(matches!(
            b.add_entity(owned.clone()),
            Err(DxfError::AlreadyOwned(_))
        ));
        // A detached clone is acceptable
        assert!(b.add_entity(owned.detached_clone()).is_ok());
    }

    #[test]
    fn test_remove_unowned_is_mismatch() {
        let mut block = Block::new("B");
        assert!(matches!(
            block.remove_entity(Handle::new(0x99)),
            Err(DxfError::OwnershipMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_tag_refused() {
        let mut block = Block::new("B");
        block
            .add_attribute_definition(AttributeDefinition::new("TAG", "1"))
            .unwrap();
        assert!(matches!(
            block.add_attribute_definition(AttributeDefinition::new("tag", "2")),
            Err(DxfError::DuplicateTag(_))
        ));
    }

    #[test]
    fn test_space_blocks_are_reserved() {
        assert!(Block::model_space().is_reserved());
        assert!(Block::paper_space("*Paper_Space", "Layout1").is_reserved());
        assert!(!Block::new("Door").is_reserved());
    }
}
