//! Attribute definitions and attribute instances
//!
//! An `AttributeDefinition` (ATTDEF) lives in a block and is identified by
//! its tag. An `Attribute` (ATTRIB) is the per-insert value instance,
//! synchronized from the block's definitions.

use super::{Entity, EntityCommon};
use crate::types::Vector3;
use bitflags::bitflags;

bitflags! {
    /// Attribute behavior flags (wire code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributeFlags: u16 {
        const INVISIBLE = 1;
        const CONSTANT = 2;
        const VERIFY = 4;
        const PRESET = 8;
    }
}

/// An attribute definition inside a block
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDefinition {
    pub common: EntityCommon,
    /// Tag identifying the attribute within its block
    pub tag: String,
    /// Prompt shown when values are requested interactively
    pub prompt: String,
    /// Default value for new inserts
    pub value: String,
    /// Insertion point
    pub position: Vector3,
    /// Text height
    pub height: f64,
    /// Rotation angle in degrees
    pub rotation: f64,
    /// Text style name
    pub style: String,
    /// Behavior flags
    pub flags: AttributeFlags,
}

impl AttributeDefinition {
    /// Create a definition with a tag and default value
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        AttributeDefinition {
            common: EntityCommon::new(),
            tag: tag.into(),
            prompt: String::new(),
            value: value.into(),
            position: Vector3::ZERO,
            height: 2.5,
            rotation: 0.0,
            style: crate::tables::textstyle::STANDARD.to_string(),
            flags: AttributeFlags::empty(),
        }
    }
}

impl Entity for AttributeDefinition {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "ATTDEF"
    }
}

/// An attribute value instance carried by an insert
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub common: EntityCommon,
    /// Tag matching an attribute definition in the referenced block
    pub tag: String,
    /// Current value, local to the insert
    pub value: String,
    /// Insertion point
    pub position: Vector3,
    /// Text height
    pub height: f64,
    /// Rotation angle in degrees
    pub rotation: f64,
    /// Text style name
    pub style: String,
    /// Behavior flags
    pub flags: AttributeFlags,
}

impl Attribute {
    /// Create an attribute instance from its definition, taking the default
    /// value
    pub fn from_definition(def: &AttributeDefinition) -> Self {
        Attribute {
            common: EntityCommon::on_layer(def.common.layer.clone()),
            tag: def.tag.clone(),
            value: def.value.clone(),
            position: def.position,
            height: def.height,
            rotation: def.rotation,
            style: def.style.clone(),
            flags: def.flags,
        }
    }
}

impl Entity for Attribute {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        "ATTRIB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_from_definition() {
        let mut def = AttributeDefinition::new("PARTNO", "0000");
        def.height = 5.0;
        def.flags |= AttributeFlags::VERIFY;

        let attr = Attribute::from_definition(&def);
        assert_eq!(attr.tag, "PARTNO");
        assert_eq!(attr.value, "0000");
        assert_eq!(attr.height, 5.0);
        assert!(attr.flags.contains(AttributeFlags::VERIFY));
    }
}
