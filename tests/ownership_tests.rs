//! Ownership graph behavior: single owner, cascades, attribute sync

use dxfdom::entities::{
    AttributeDefinition, BoundaryPath, EntityType, Hatch, HatchPattern, Insert, Line,
};
use dxfdom::types::{Vector2, Vector3};
use dxfdom::{Block, CadDocument, DxfError};

fn line() -> EntityType {
    Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)).into()
}

#[test]
fn add_then_remove_restores_detached_state() {
    let mut doc = CadDocument::new();
    let handle = doc.add_to_model_space(line()).unwrap();

    let removed = doc.remove_entity("*Model_Space", handle).unwrap();
    assert_eq!(removed.common().owner, None);

    // a second removal through the same block is an ownership mismatch
    match doc.remove_entity("*Model_Space", handle) {
        Err(DxfError::OwnershipMismatch { handle: h, block }) => {
            assert_eq!(h, handle.value());
            assert_eq!(block, "*Model_Space");
        }
        other => panic!("expected OwnershipMismatch, got {:?}", other),
    }
}

#[test]
fn owned_entity_cannot_join_another_block() {
    let mut doc = CadDocument::new();
    doc.add_block(Block::new("B")).unwrap();
    let handle = doc.add_to_model_space(line()).unwrap();
    let owned = doc.entity(handle).unwrap().clone();

    assert!(matches!(
        doc.add_entity("B", owned.clone()),
        Err(DxfError::AlreadyOwned(_))
    ));

    // an explicit detached clone is the sanctioned way to copy
    let copied = doc.add_entity("B", owned.detached_clone()).unwrap();
    assert_ne!(copied, handle);
    assert_eq!(doc.owner_of(copied), Some("B"));
    assert_eq!(doc.owner_of(handle), Some("*Model_Space"));
}

#[test]
fn staging_blocks_accept_detached_entities() {
    let mut block = Block::new("Staged");
    block.add_entity(line()).unwrap();
    assert_eq!(block.entity_count(), 1);

    let mut doc = CadDocument::new();
    let attached = doc.add_block(block).unwrap();
    // attach assigned a handle to the staged entity
    assert!(!attached.entities().next().unwrap().handle().is_null());
}

#[test]
fn duplicate_attribute_tags_refused_through_api() {
    let mut block = Block::new("Title");
    block
        .add_attribute_definition(AttributeDefinition::new("PART", "0"))
        .unwrap();
    assert!(matches!(
        block.add_attribute_definition(AttributeDefinition::new("part", "1")),
        Err(DxfError::DuplicateTag(_))
    ));
}

#[test]
fn hatch_adopts_staged_boundary_entities() {
    let mut doc = CadDocument::new();
    let mut hatch = Hatch::new(HatchPattern::solid());
    hatch.add_path(BoundaryPath::from_entities(vec![line(), line()]));

    let handle = doc.add_entity("*Model_Space", hatch.into()).unwrap();

    let model = doc.model_space().unwrap();
    // hatch + two adopted boundary entities
    assert_eq!(model.entity_count(), 3);
    match model.entity(handle).unwrap() {
        EntityType::Hatch(h) => {
            assert!(h.is_associative);
            assert_eq!(h.boundary_handles().count(), 2);
            for boundary in h.boundary_handles() {
                assert_eq!(doc.owner_of(boundary), Some("*Model_Space"));
            }
        }
        other => panic!("expected hatch, got {:?}", other),
    }
}

#[test]
fn hatch_boundary_in_another_block_is_illegal() {
    let mut doc = CadDocument::new();
    doc.add_block(Block::new("Other")).unwrap();
    let foreign = doc.add_entity("Other", line()).unwrap();

    let mut hatch = Hatch::new(HatchPattern::solid());
    let mut path = BoundaryPath::polyline([
        Vector2::new(0.0, 0.0),
        Vector2::new(1.0, 0.0),
        Vector2::new(1.0, 1.0),
    ]);
    path.handles.push(foreign);
    hatch.add_path(path);

    match doc.add_entity("*Model_Space", hatch.into()) {
        Err(DxfError::CrossBlockBoundary { handle, block }) => {
            assert_eq!(handle, foreign.value());
            assert_eq!(block, "Other");
        }
        other => panic!("expected CrossBlockBoundary, got {:?}", other),
    }
}

#[test]
fn removing_associative_hatch_cascades_to_boundaries() {
    let mut doc = CadDocument::new();
    let mut hatch = Hatch::new(HatchPattern::solid());
    hatch.add_path(BoundaryPath::from_entities(vec![line()]));
    let handle = doc.add_to_model_space(hatch.into()).unwrap();
    assert_eq!(doc.model_space().unwrap().entity_count(), 2);

    doc.remove_entity("*Model_Space", handle).unwrap();
    assert_eq!(doc.model_space().unwrap().entity_count(), 0);
}

#[test]
fn unlinking_boundaries_keeps_the_entities() {
    let mut doc = CadDocument::new();
    let mut hatch = Hatch::new(HatchPattern::solid());
    hatch.add_path(BoundaryPath::from_entities(vec![line()]));
    let handle = doc.add_to_model_space(hatch.into()).unwrap();

    if let Some(EntityType::Hatch(h)) = doc.model_space_mut().unwrap().entity_mut(handle) {
        h.unlink_boundaries();
        assert!(!h.is_associative);
    } else {
        panic!("hatch not found");
    }

    // boundary entity survives; removing the hatch no longer cascades
    doc.remove_entity("*Model_Space", handle).unwrap();
    assert_eq!(doc.model_space().unwrap().entity_count(), 1);
}

#[test]
fn removing_a_boundary_entity_unlinks_it_from_the_hatch() {
    let mut doc = CadDocument::new();
    let mut hatch = Hatch::new(HatchPattern::solid());
    hatch.add_path(BoundaryPath::from_entities(vec![line()]));
    let hatch_handle = doc.add_to_model_space(hatch.into()).unwrap();

    let boundary = match doc.entity(hatch_handle).unwrap() {
        EntityType::Hatch(h) => h.boundary_handles().next().unwrap(),
        _ => unreachable!(),
    };
    doc.remove_entity("*Model_Space", boundary).unwrap();

    match doc.entity(hatch_handle).unwrap() {
        EntityType::Hatch(h) => {
            assert_eq!(h.boundary_handles().count(), 0);
            assert!(!h.is_associative);
        }
        _ => unreachable!(),
    }
}

#[test]
fn insert_attributes_sync_only_on_request() {
    let mut doc = CadDocument::new();
    let mut block = Block::new("Title");
    block
        .add_attribute_definition(AttributeDefinition::new("PART", "0000"))
        .unwrap();
    doc.add_block(block).unwrap();

    // attributes are synchronized when the insert enters the document
    let insert = Insert::new("Title", Vector3::ZERO);
    let handle = doc.add_to_model_space(insert.into()).unwrap();
    match doc.entity(handle).unwrap() {
        EntityType::Insert(i) => {
            assert_eq!(i.attributes.len(), 1);
            assert_eq!(i.attribute("PART").unwrap().value, "0000");
        }
        _ => unreachable!(),
    }

    // a later definition does not propagate on its own
    doc.blocks
        .get_mut("Title")
        .unwrap()
        .add_attribute_definition(AttributeDefinition::new("REV", "A"))
        .unwrap();
    match doc.entity(handle).unwrap() {
        EntityType::Insert(i) => assert_eq!(i.attributes.len(), 1),
        _ => unreachable!(),
    }

    // explicit sync picks it up, preserving edited values
    if let Some(EntityType::Insert(i)) = doc.model_space_mut().unwrap().entity_mut(handle) {
        i.set_attribute("PART", "A-17");
    }
    doc.sync_insert_attributes(handle).unwrap();
    match doc.entity(handle).unwrap() {
        EntityType::Insert(i) => {
            assert_eq!(i.attributes.len(), 2);
            assert_eq!(i.attribute("PART").unwrap().value, "A-17");
            assert_eq!(i.attribute("REV").unwrap().value, "A");
        }
        _ => unreachable!(),
    }
}

#[test]
fn xref_blocks_refuse_new_entities() {
    let mut doc = CadDocument::new();
    let mut block = Block::new("XrefBlock");
    block.is_xref = true;
    block.xref_path = "detail.dwg".to_string();
    doc.add_block(block).unwrap();

    assert!(matches!(
        doc.add_entity("XrefBlock", line()),
        Err(DxfError::ReservedName(_))
    ));
}
