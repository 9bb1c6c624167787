//! End-to-end: panel payload in, shapes and selections out.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::*;
use express_tables::host::{DocumentHost, DocumentQuery};
use express_tables::styles::{style_by_id, style_by_name};
use express_tables::types::{NodeKind, TableSpec, TextAlignment};
use serde_json::json;

fn contacts_payload() -> serde_json::Value {
    json!({
        "columnCount": 2,
        "rowCount": 3,
        "columnLabels": { "Column 1": "Name", "Column 2": "Email" },
        "rowCells": [["Ann", "a@x.com"], ["Bo", "b@x.com"], ["Cy", "c@x.com"]],
        "style": style_by_id(3).unwrap(),
        "textAlignment": "left"
    })
}

#[test]
fn test_contacts_table_end_to_end() {
    let spec: TableSpec = serde_json::from_value(contacts_payload()).unwrap();
    assert_eq!(spec.text_alignment, TextAlignment::Left);
    assert_eq!(spec.style.name, "Basic blue");

    let mut s = session();
    let table = s.create_table(&spec).unwrap();
    let doc = s.host();

    let rows = doc.children(&table.root).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(cell_text(doc, &table.header.cells[0]), "Name");
    assert_eq!(cell_text(doc, &table.header.cells[1]), "Email");

    assert!(s.select_row(1));
    let selected = s.host().selection().unwrap();
    assert_eq!(selected, vec![rows[2].clone()]);

    let bo = &table.rows[1];
    assert_eq!(bo.group, rows[2]);
    assert_eq!(cell_text(s.host(), &bo.cells[0]), "Bo");
    assert_eq!(cell_text(s.host(), &bo.cells[1]), "b@x.com");
}

#[test]
fn test_panel_payload_with_record_rows() {
    // Rows as objects, the shape CSV import produces
    let payload = json!({
        "columns": 3,
        "rows": 2,
        "columnValues": { "Column 1": "City", "Column 2": "Country", "Column 3": "" },
        "rowData": [
            { "city": "Oslo", "country": "Norway", "population": 709000 },
            { "city": "Lima", "country": null }
        ],
        "selectedStyle": style_by_name("basic green").unwrap()
    });
    let spec: TableSpec = serde_json::from_value(payload).unwrap();

    let mut s = session();
    let table = s.create_table(&spec).unwrap();
    let doc = s.host();
    assert_eq!(cell_text(doc, &table.header.cells[2]), "Column 3");
    assert_eq!(cell_text(doc, &table.rows[0].cells[2]), "709000");
    assert_eq!(cell_text(doc, &table.rows[1].cells[1]), "Row 2, Col 2");
    assert_eq!(cell_text(doc, &table.rows[1].cells[2]), "Row 2, Col 3");
}

#[test]
fn test_scene_dump_reflects_table() {
    let mut s = session();
    let table = s.create_table(&contacts_spec()).unwrap();
    let doc = s.host();
    let scene = doc.scene(&table.root).unwrap();

    assert_eq!(scene.kind, NodeKind::Group);
    assert_eq!(scene.children.len(), 4);
    let header_cell = &scene.children[0].children[0];
    assert_eq!(header_cell.children[0].kind, NodeKind::Rectangle);
    assert_eq!(header_cell.children[0].width, Some(150.0));
    assert_eq!(header_cell.children[1].text.as_deref(), Some("Name"));

    let json = serde_json::to_value(&scene).unwrap();
    assert!(json["metadata"]["tables-for-express-table"].is_string());
    assert!(json.to_string().contains("b@x.com"));
}

#[test]
fn test_session_survives_user_edits() {
    let mut s = session();
    let first = s.create_table(&contacts_spec()).unwrap();
    assert!(s.select_column(0));

    // User deletes the table, then creates another one from the panel
    s.host_mut().remove_node(&first.root).unwrap();
    assert!(s.host().selection().unwrap().is_empty());
    assert!(!s.select_column(0));

    let second = s
        .create_table(&TableSpec::new(3, 2).with_alignment(TextAlignment::Right))
        .unwrap();
    assert!(s.select_column(2));
    assert_eq!(s.host().selection().unwrap().len(), 3);
    assert!(s.select_all());
    assert_eq!(s.host().selection().unwrap(), vec![second.root.clone()]);
    assert_eq!(s.table_metadata().unwrap().node_id, second.root);
    assert!(s.clear_selection());
}

#[test]
fn test_measure_text_is_estimate_of_rendered_width() {
    let mut s = session();
    assert_eq!(s.measure_text("Email").unwrap(), text_width("Email"));
    assert_eq!(s.measure_text("").unwrap(), 0.0);
    assert_eq!(s.host().orphan_count(), 0);
}
