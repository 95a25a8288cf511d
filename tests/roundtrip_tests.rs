//! Codec round trips: ASCII idempotence, binary fidelity, probing

use dxfdom::entities::{AttributeDefinition, EntityType, Insert, Line};
use dxfdom::tables::Layer;
use dxfdom::types::{Color, Vector3};
use dxfdom::xdata::{XDataRecord, XDataValue};
use dxfdom::{probe, Block, CadDocument, DxfVersion, NotificationKind};
use std::io::Cursor;

fn reload(bytes: &[u8]) -> CadDocument {
    let mut cursor = Cursor::new(bytes.to_vec());
    CadDocument::read_from(&mut cursor).unwrap()
}

#[test]
fn loaded_line_resolves_to_the_loaded_layer_entry() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::with_color("L1", Color::RED));
    let mut line = Line::from_points(Vector3::ZERO, Vector3::new(10.0, 0.0, 0.0));
    line.common.layer = "L1".to_string();
    doc.add_to_model_space(line.into()).unwrap();

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);

    let entity = loaded.model_space().unwrap().entities().next().unwrap();
    // the name key resolves to the registry's canonical entry
    let layer = loaded.layers.get(&entity.common().layer).unwrap();
    assert_eq!(layer.name, "L1");
    assert_eq!(layer.color, Color::RED);
}

#[test]
fn ascii_save_load_save_is_byte_identical() {
    let mut doc = CadDocument::new();
    doc.add_layer(Layer::with_color("L1", Color::RED));
    let mut line = Line::from_points(Vector3::ZERO, Vector3::new(10.0, 5.0, 0.0));
    line.common.layer = "L1".to_string();
    doc.add_to_model_space(line.into()).unwrap();
    doc.add_to_model_space(
        dxfdom::entities::Circle::new(Vector3::new(2.0, 2.0, 0.0), 1.25).into(),
    )
    .unwrap();

    for version in [DxfVersion::AC1015, DxfVersion::AC1032] {
        let first = doc.to_bytes(version, false).unwrap();
        let mut loaded = reload(&first);
        let second = loaded.to_bytes(version, false).unwrap();
        assert_eq!(
            first, second,
            "ASCII round trip not idempotent at {}",
            version
        );
    }
}

#[test]
fn binary_save_load_save_is_byte_identical() {
    let mut doc = CadDocument::new();
    doc.add_to_model_space(Line::from_points(Vector3::ZERO, Vector3::new(1.0, 2.0, 3.0)).into())
        .unwrap();

    let first = doc.to_bytes(DxfVersion::AC1032, true).unwrap();
    let mut loaded = reload(&first);
    let second = loaded.to_bytes(DxfVersion::AC1032, true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn binary_preserves_full_double_precision() {
    let mut doc = CadDocument::new();
    let x = std::f64::consts::PI * 1e-7;
    doc.add_to_model_space(Line::from_points(Vector3::new(x, 0.0, 0.0), Vector3::ZERO).into())
        .unwrap();

    let bytes = doc.to_bytes(DxfVersion::AC1032, true).unwrap();
    let loaded = reload(&bytes);
    match loaded.model_space().unwrap().entities().next().unwrap() {
        EntityType::Line(line) => assert_eq!(line.start.x, x),
        other => panic!("unexpected {:?}", other),
    };
}

#[test]
fn xdata_binary_chunk_roundtrips_exactly() {
    // 200 bytes forces the 127-byte chunk split on the wire
    let payload: Vec<u8> = (0..200u16).map(|i| (i * 31 % 251) as u8).collect();

    let mut doc = CadDocument::new();
    let mut line = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
    let mut record = XDataRecord::new("TESTAPP");
    record.push(XDataValue::Bytes(payload.clone()));
    record.push(XDataValue::Integer16(42));
    line.common.xdata.insert(record);
    doc.add_to_model_space(line.into()).unwrap();

    for binary in [true, false] {
        let bytes = doc.to_bytes(DxfVersion::AC1032, binary).unwrap();
        let loaded = reload(&bytes);
        let entity = loaded.model_space().unwrap().entities().next().unwrap();
        let record = entity.common().xdata.get("TESTAPP").unwrap();
        match &record.values[0] {
            XDataValue::Bytes(data) => assert_eq!(data, &payload),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(record.values[1], XDataValue::Integer16(42));
        // the application id was registered on load
        assert!(loaded.app_ids.contains("TESTAPP"));
    }
}

#[test]
fn true_color_downgrades_below_its_gate() {
    let mut doc = CadDocument::new();
    let mut line = Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
    line.common.color = Color::from_rgb(200, 30, 30);
    doc.add_to_model_space(line.into()).unwrap();

    // AC1015 has no true color groups; the nearest ACI index is written
    let bytes = doc.to_bytes(DxfVersion::AC1015, false).unwrap();
    let loaded = reload(&bytes);
    match loaded.model_space().unwrap().entities().next().unwrap() {
        EntityType::Line(line) => assert_eq!(line.common.color, Color::RED),
        other => panic!("unexpected {:?}", other),
    }

    // AC1032 keeps the full color
    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);
    match loaded.model_space().unwrap().entities().next().unwrap() {
        EntityType::Line(line) => assert_eq!(line.common.color, Color::from_rgb(200, 30, 30)),
        other => panic!("unexpected {:?}", other),
    };
}

#[test]
fn custom_header_variables_roundtrip_verbatim() {
    let mut doc = CadDocument::new();
    doc.header.set_custom(
        "$MYVENDORVAR",
        vec![(70, "5".to_string()), (40, "2.5000".to_string())],
    );

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();
    assert!(text.contains("$MYVENDORVAR"));
    assert!(text.contains("2.5000"));

    let loaded = reload(&bytes);
    assert_eq!(
        loaded.header.custom("$MYVENDORVAR").unwrap(),
        &[(70, "5".to_string()), (40, "2.5000".to_string())]
    );
}

#[test]
fn comments_survive_ascii_roundtrips() {
    let mut doc = CadDocument::new();
    doc.comments.push("exported by the nightly job".to_string());

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);
    assert_eq!(loaded.comments, vec!["exported by the nightly job"]);
}

#[test]
fn probe_reports_version_and_encoding_without_loading() {
    let mut doc = CadDocument::with_version(DxfVersion::AC1027);
    let ascii = doc.to_bytes(DxfVersion::AC1027, false).unwrap();
    let binary = doc.to_bytes(DxfVersion::AC1027, true).unwrap();

    let mut cursor = Cursor::new(ascii);
    let info = probe(&mut cursor).unwrap();
    assert_eq!(info.version, DxfVersion::AC1027);
    assert!(!info.is_binary);
    assert_eq!(cursor.position(), 0);

    let mut cursor = Cursor::new(binary);
    let info = probe(&mut cursor).unwrap();
    assert_eq!(info.version, DxfVersion::AC1027);
    assert!(info.is_binary);
    assert_eq!(cursor.position(), 0);
}

#[test]
fn blocks_and_insert_attributes_roundtrip() {
    let mut doc = CadDocument::new();
    let mut block = Block::new("Title");
    block
        .add_attribute_definition(AttributeDefinition::new("PART", "0000"))
        .unwrap();
    block
        .add_entity(Line::from_points(Vector3::ZERO, Vector3::new(5.0, 0.0, 0.0)).into())
        .unwrap();
    doc.add_block(block).unwrap();

    let insert_handle = doc
        .add_to_model_space(Insert::new("Title", Vector3::new(1.0, 1.0, 0.0)).into())
        .unwrap();
    if let Some(EntityType::Insert(i)) = doc.model_space_mut().unwrap().entity_mut(insert_handle) {
        i.set_attribute("PART", "B-9");
    }

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);

    let block = loaded.blocks.get("Title").unwrap();
    assert_eq!(block.attribute_definitions().len(), 1);
    assert_eq!(block.entity_count(), 1);

    match loaded.model_space().unwrap().entities().next().unwrap() {
        EntityType::Insert(i) => {
            assert_eq!(i.block_name, "Title");
            assert_eq!(i.attribute("PART").unwrap().value, "B-9");
        }
        other => panic!("unexpected {:?}", other),
    };
}

#[test]
fn groups_keep_their_names_through_the_dictionary() {
    let mut doc = CadDocument::new();
    let h1 = doc
        .add_to_model_space(Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)).into())
        .unwrap();
    let mut group = dxfdom::objects::Group::new("Fasteners");
    group.add(h1);
    doc.add_group(group).unwrap();

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);

    let group = loaded.groups.values().next().unwrap();
    assert_eq!(group.name, "Fasteners");
    assert_eq!(group.entity_handles.len(), 1);
}

#[test]
fn layouts_bind_to_their_blocks_after_load() {
    let mut doc = CadDocument::new();
    doc.add_layout("Detail Sheet").unwrap();

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);

    let layout = loaded.layout("Detail Sheet").unwrap();
    let block = loaded.blocks.get(&layout.block_name).unwrap();
    assert_eq!(block.layout.as_deref(), Some("Detail Sheet"));
}

#[test]
fn dangling_layer_reference_falls_back_to_default() {
    // a file referencing a layer that is never defined
    let data = "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1032\n  0\nENDSEC\n\
  0\nSECTION\n  2\nENTITIES\n  0\nLINE\n  5\n100\n  8\nMISSING\n100\nAcDbEntity\n100\nAcDbLine\n\
 10\n0.0\n 20\n0.0\n 30\n0.0\n 11\n1.0\n 21\n0.0\n 31\n0.0\n  0\nENDSEC\n  0\nEOF\n";
    let mut cursor = Cursor::new(data.as_bytes().to_vec());
    let doc = CadDocument::read_from(&mut cursor).unwrap();

    let entity = doc.model_space().unwrap().entities().next().unwrap();
    assert_eq!(entity.common().layer, "0");
    assert!(doc.notifications.has_kind(NotificationKind::Substituted));
}

#[test]
fn insert_of_undefined_block_gets_an_empty_definition() {
    let data = "  0\nSECTION\n  2\nHEADER\n  9\n$ACADVER\n  1\nAC1032\n  0\nENDSEC\n\
  0\nSECTION\n  2\nENTITIES\n  0\nINSERT\n  5\n100\n  8\n0\n100\nAcDbEntity\n100\nAcDbBlockReference\n\
  2\nGHOST\n 10\n0.0\n 20\n0.0\n 30\n0.0\n  0\nENDSEC\n  0\nEOF\n";
    let mut cursor = Cursor::new(data.as_bytes().to_vec());
    let doc = CadDocument::read_from(&mut cursor).unwrap();

    assert!(doc.blocks.get("GHOST").is_some());
    assert!(doc.notifications.has_kind(NotificationKind::Substituted));
}

#[test]
fn handles_are_stable_across_a_reload() {
    let mut doc = CadDocument::new();
    let handle = doc
        .add_to_model_space(Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)).into())
        .unwrap();

    let bytes = doc.to_bytes(DxfVersion::AC1032, false).unwrap();
    let loaded = reload(&bytes);
    let reloaded = loaded.model_space().unwrap().entities().next().unwrap();
    assert_eq!(reloaded.handle(), handle);
    // the seed stays above everything seen
    assert!(loaded.next_handle() > handle.value());
}

#[test]
fn multiple_documents_share_one_stream_at_offsets() {
    let mut doc_a = CadDocument::new();
    doc_a
        .add_to_model_space(Line::from_points(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0)).into())
        .unwrap();
    let mut doc_b = CadDocument::new();

    let bytes_a = doc_a.to_bytes(DxfVersion::AC1032, false).unwrap();
    let bytes_b = doc_b.to_bytes(DxfVersion::AC1032, false).unwrap();

    let mut joined = bytes_a.clone();
    let offset_b = joined.len() as u64;
    joined.extend_from_slice(&bytes_b);

    let mut cursor = Cursor::new(joined);
    let first = CadDocument::read_from(&mut cursor).unwrap();
    assert_eq!(first.model_space().unwrap().entity_count(), 1);

    use std::io::Seek;
    cursor.seek(std::io::SeekFrom::Start(offset_b)).unwrap();
    let second = CadDocument::read_from(&mut cursor).unwrap();
    assert_eq!(second.model_space().unwrap().entity_count(), 0);
}
