//! Registry behavior: merge-by-name, rename, in-use removal, purge

use dxfdom::entities::Line;
use dxfdom::tables::{Layer, LineType, TextStyle};
use dxfdom::types::{Color, Vector3};
use dxfdom::{CadDocument, DxfError};

fn line_on(layer: &str) -> dxfdom::entities::EntityType {
    let mut line = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
    line.common.layer = layer.to_string();
    line.into()
}

#[test]
fn add_merges_by_name_and_keeps_the_first_instance() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::with_color("L1", Color::RED));
    let merged = doc.add_layer(Layer::with_color("l1", Color::BLUE));
    assert_eq!(merged.color, Color::RED);
    assert_eq!(merged.name, "L1");

    // reserved names always resolve to the reserved entry
    let zero = doc.add_layer(Layer::with_color("0", Color::GREEN));
    assert_eq!(zero.color, Color::WHITE);
}

#[test]
fn removal_refused_while_referenced() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::new("Walls"));
    let handle = doc.add_to_model_space(line_on("Walls")).unwrap();

    match doc.remove_layer("Walls") {
        Err(DxfError::InUse { name, count }) => {
            assert_eq!(name, "Walls");
            assert_eq!(count, 1);
        }
        other => panic!("expected InUse, got {:?}", other),
    }

    doc.remove_entity("*Model_Space", handle).unwrap();
    assert!(doc.remove_layer("Walls").is_ok());
}

#[test]
fn reserved_entries_cannot_be_renamed_or_removed() {
    let mut doc = CadDocument::new();
    assert!(matches!(
        doc.remove_layer("0"),
        Err(DxfError::ReservedName(_))
    ));
    assert!(matches!(
        doc.rename_layer("0", "Zero"),
        Err(DxfError::ReservedName(_))
    ));
    assert!(matches!(
        doc.remove_line_type("Continuous"),
        Err(DxfError::ReservedName(_))
    ));
    assert!(matches!(
        doc.remove_text_style("Standard"),
        Err(DxfError::ReservedName(_))
    ));
}

#[test]
fn rename_is_atomic_and_rewrites_referrers() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::new("A"));
    doc.add_layer(Layer::new("B"));
    doc.add_layer(Layer::new("C"));
    let handle = doc.add_to_model_space(line_on("B")).unwrap();

    doc.rename_layer("B", "Middle").unwrap();

    // position preserved, lookups never miss
    let names: Vec<_> = doc.layers.names().collect();
    assert_eq!(names, vec!["0", "A", "Middle", "C"]);
    assert!(doc.layers.get("middle").is_some());
    assert_eq!(doc.entity(handle).unwrap().common().layer, "Middle");
}

#[test]
fn rename_onto_taken_name_is_refused() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::new("A"));
    doc.add_layer(Layer::new("B"));
    assert!(matches!(
        doc.rename_layer("A", "b"),
        Err(DxfError::DuplicateName(_))
    ));
}

#[test]
fn line_type_removal_tracks_layer_references() {
    let mut doc = CadDocument::new();
    doc.add_line_type(LineType::predefined("Dashed").unwrap());
    doc.add_layer(Layer::new("Hidden")).line_type = "Dashed".to_string();

    assert!(matches!(
        doc.remove_line_type("Dashed"),
        Err(DxfError::InUse { .. })
    ));
    doc.layers.get_mut("Hidden").unwrap().line_type = "Continuous".to_string();
    assert!(doc.remove_line_type("Dashed").is_ok());
}

#[test]
fn text_style_references_through_dim_styles() {
    let mut doc = CadDocument::new();
    doc.add_text_style(TextStyle::new("Arch", "arch.shx"));
    doc.dim_styles.get_mut("Standard").unwrap().text_style = "Arch".to_string();

    assert!(matches!(
        doc.remove_text_style("Arch"),
        Err(DxfError::InUse { .. })
    ));
}

#[test]
fn purge_is_best_effort() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::new("Used"));
    doc.add_layer(Layer::new("Unused"));
    doc.add_line_type(LineType::predefined("Dot").unwrap());
    doc.add_text_style(TextStyle::new("Orphan", "orphan.ttf"));
    doc.add_to_model_space(line_on("Used")).unwrap();

    let removed = doc.purge();
    assert!(removed >= 3);

    assert!(doc.layers.contains("Used"));
    assert!(!doc.layers.contains("Unused"));
    assert!(!doc.line_types.contains("Dot"));
    assert!(!doc.text_styles.contains("Orphan"));
    // reserved entries survive regardless
    assert!(doc.layers.contains("0"));
    assert!(doc.line_types.contains("ByLayer"));
    assert!(doc.text_styles.contains("Standard"));
}

#[test]
fn block_removal_requires_no_inserts() {
    let mut doc = CadDocument::new();
    doc.add_block(dxfdom::Block::new("Door")).unwrap();
    let insert = dxfdom::entities::Insert::new("Door", Vector3::ZERO);
    let handle = doc.add_to_model_space(insert.into()).unwrap();

    assert!(matches!(
        doc.remove_block("Door"),
        Err(DxfError::InUse { .. })
    ));
    doc.remove_entity("*Model_Space", handle).unwrap();
    assert!(doc.remove_block("Door").is_ok());
}
