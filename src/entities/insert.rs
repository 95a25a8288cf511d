//! Insert entity (block reference)

use super::attrib::{Attribute, AttributeDefinition};
use super::{Entity, EntityCommon};
use crate::types::{Handle, Vector3};

/// An insert entity placing a block instance.
///
/// The attribute list is synchronized from the block's attribute
/// definitions when the insert enters the document; structural changes to
/// the block afterwards only show up after an explicit sync.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub common: EntityCommon,
    /// Referenced block name
    pub block_name: String,
    /// Insertion point
    pub position: Vector3,
    /// X scale factor
    pub x_scale: f64,
    /// Y scale factor
    pub y_scale: f64,
    /// Z scale factor
    pub z_scale: f64,
    /// Rotation angle in degrees
    pub rotation: f64,
    /// Normal vector
    pub normal: Vector3,
    /// Per-instance attribute values
    pub attributes: Vec<Attribute>,
    /// Handle of the sequence-end marker that closes the attribute run on
    /// the wire; consumed like any other persisted object
    pub seqend_handle: Handle,
}

impl Insert {
    /// Create an insert of a block at a position
    pub fn new(block_name: impl Into<String>, position: Vector3) -> Self {
        Insert {
            common: EntityCommon::new(),
            block_name: block_name.into(),
            position,
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            rotation: 0.0,
            normal: Vector3::UNIT_Z,
            attributes: Vec::new(),
            seqend_handle: Handle::NULL,
        }
    }

    /// Builder: set a uniform scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.x_scale = scale;
        self.y_scale = scale;
        self.z_scale = scale;
        self
    }

    /// Builder: set the rotation angle in degrees
    pub fn with_rotation(mut self, angle: f64) -> Self {
        self.rotation = angle;
        self
    }

    /// Get an attribute value by tag (case-insensitive)
    pub fn attribute(&self, tag: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|a| a.tag.eq_ignore_ascii_case(tag))
    }

    /// Set an attribute value by tag; returns false if no such tag
    pub fn set_attribute(&mut self, tag: &str, value: impl Into<String>) -> bool {
        match self
            .attributes
            .iter_mut()
            .find(|a| a.tag.eq_ignore_ascii_case(tag))
        {
            Some(attr) => {
                attr.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Rebuild the attribute list from the block's current definitions.
    ///
    /// Values for tags that still exist are preserved; new tags get their
    /// default value; attributes whose tag no longer exists are dropped.
    pub fn sync_attributes<'a>(&mut self, definitions: impl Iterator<Item = &'a AttributeDefinition>) {
        let old = std::mem::take(&mut self.attributes);
        for def in definitions {
            let mut attr = Attribute::from_definition(def);
            if let Some(existing) = old.iter().find(|a| a.tag.eq_ignore_ascii_case(&def.tag)) {
                attr.value = existing.value.clone();
                attr.common.handle = existing.common.handle;
            }
            self.attributes.push(attr);
        }
    }
}

impl Entity for Insert {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "INSERT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_preserves_values_and_adds_defaults() {
        let mut insert = Insert::new("B", Vector3::ZERO);
        let defs = vec![AttributeDefinition::new("PARTNO", "0000")];
        insert.sync_attributes(defs.iter());
        insert.set_attribute("PARTNO", "A-17");

        let defs = vec![
            AttributeDefinition::new("PARTNO", "0000"),
            AttributeDefinition::new("REV", "A"),
        ];
        insert.sync_attributes(defs.iter());

        assert_eq!(insert.attributes.len(), 2);
        assert_eq!(insert.attribute("PARTNO").unwrap().value, "A-17");
        assert_eq!(insert.attribute("REV").unwrap().value, "A");
    }

    #[test]
    fn test_sync_drops_stale_tags() {
        let mut insert = Insert::new("B", Vector3::ZERO);
        insert.sync_attributes(vec![AttributeDefinition::new("OLD", "x")].iter());
        insert.sync_attributes(std::iter::empty());
        assert!(insert.attributes.is_empty());
    }
}
