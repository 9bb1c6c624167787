//! Table layout tests: tree shape, column sizing, row heights, colors,
//! scaling and failure behavior.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_lossless,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]

mod common;

use common::*;
use express_tables::host::{DocumentQuery, HostOp, MemoryDocument, TextMetrics};
use express_tables::types::{TableMetadata, TableSpec, TextAlignment, METADATA_KEY};
use express_tables::{LayoutConfig, TableBuilder, TableError, TableSession};
use test_case::test_case;

#[test_case(1, 1 ; "single cell")]
#[test_case(2, 3 ; "contacts shape")]
#[test_case(5, 8 ; "wide and tall")]
fn test_tree_has_header_plus_rows(columns: i32, rows: i32) {
    let mut s = session();
    let table = s.create_table(&TableSpec::new(columns, rows)).unwrap();
    let doc = s.host();

    let row_groups = doc.children(&table.root).unwrap();
    assert_eq!(row_groups.len(), rows as usize + 1);
    for row in &row_groups {
        let cells = doc.children(row).unwrap();
        assert_eq!(cells.len(), columns as usize);
        for cell in &cells {
            // rectangle then text
            assert_eq!(child_count(doc, cell), 2);
        }
    }
    assert_eq!(row_groups[0], table.header.group);
    assert_eq!(doc.orphan_count(), 0);
}

#[test_case("A", 150.0 ; "short label floors at min")]
#[test_case("Twenty char label xx", 190.0 ; "label plus padding")]
#[test_case("An exceptionally long header label that overflows", 250.0 ; "long label caps at max")]
fn test_column_width_clamped(label: &str, expected: f64) {
    let mut s = session();
    let table = s
        .create_table(&TableSpec::new(1, 1).with_labels([label]))
        .unwrap();
    let width = table.column_widths[0];
    assert_eq!(width, expected);
    assert!((150.0..=250.0).contains(&width));
    assert_eq!(node(s.host(), &table.header.cells[0].rect).width, expected);
}

#[test]
fn test_header_labels_never_wrap() {
    let mut s = session();
    let label = "An exceptionally long header label that overflows";
    let table = s
        .create_table(&TableSpec::new(1, 1).with_labels([label]))
        .unwrap();
    assert_eq!(cell_text(s.host(), &table.header.cells[0]), label);
}

#[test]
fn test_row_height_normalized_to_tallest_cell() {
    let mut s = session();
    let long = "The quick brown fox jumps over the lazy dog and keeps on running";
    let spec = TableSpec::from_records(
        ["Story", "Note"],
        [vec![long, "short"], vec!["a", "b"]],
    );
    let table = s.create_table(&spec).unwrap();
    let doc = s.host();

    let first = &table.rows[0];
    assert_eq!(first.height, 128.0);
    for cell in &first.cells {
        assert_eq!(rect_height(doc, cell), first.height);
    }
    assert!(first.cells[0].wrapped);
    assert_eq!(cell_text(doc, &first.cells[1]), "short");

    let second = &table.rows[1];
    assert_eq!(second.height, table.base_row_height);
    assert_eq!(second.y, first.y + first.height + 6.0);
}

#[test]
fn test_rows_stack_with_gutter() {
    let mut s = session();
    let table = s.create_table(&contacts_spec().with_gutter(10.0)).unwrap();
    assert_eq!(table.header.y, 10.0);
    assert_eq!(table.header.cells[0].x, 10.0);
    assert_eq!(table.header.cells[1].x, 10.0 + 150.0 + 10.0);
    let mut y = table.header.y + table.header.height + 10.0;
    for row in &table.rows {
        assert_eq!(row.y, y);
        y += row.height + 10.0;
    }
}

#[test]
fn test_base_row_height_from_table_height() {
    let mut s = session();
    // 200 / 2 rows = 100
    let two = s.create_table(&TableSpec::new(1, 2)).unwrap();
    assert_eq!(two.base_row_height, 100.0);
    // 200 / 5 rows = 40, floored at 70
    let five = s.create_table(&TableSpec::new(1, 5)).unwrap();
    assert_eq!(five.base_row_height, 70.0);
}

#[test]
fn test_row_colors_alternate() {
    let mut s = session();
    let spec = contacts_spec();
    let palette = spec.style.colors.resolve().unwrap();
    let table = s.create_table(&spec).unwrap();
    let doc = s.host();

    assert_eq!(node(doc, &table.header.cells[0].rect).fill, Some(palette.header));
    assert_eq!(node(doc, &table.rows[0].cells[0].rect).fill, Some(palette.alt_row));
    assert_eq!(node(doc, &table.rows[1].cells[0].rect).fill, Some(palette.row));
    assert_eq!(node(doc, &table.rows[2].cells[1].rect).fill, Some(palette.alt_row));
    assert_eq!(
        node(doc, &table.rows[1].cells[0].text_node).text_color,
        Some(palette.row_text)
    );
}

#[test]
fn test_missing_labels_are_synthesized() {
    let mut s = session();
    let table = s.create_table(&TableSpec::new(2, 2)).unwrap();
    let doc = s.host();
    assert_eq!(cell_text(doc, &table.header.cells[0]), "Column 1");
    assert_eq!(cell_text(doc, &table.header.cells[1]), "Column 2");
    assert_eq!(cell_text(doc, &table.rows[1].cells[0]), "Row 2, Col 1");
}

#[test]
fn test_text_anchored_by_alignment() {
    let mut s = session();
    let spec = contacts_spec().with_alignment(TextAlignment::Right);
    let table = s.create_table(&spec).unwrap();
    let cell = &table.rows[0].cells[1];
    let text = node(s.host(), &cell.text_node);
    assert_eq!(text.alignment, TextAlignment::Right);
    assert_eq!(text.translation.x, cell.x + cell.width - 10.0);
    assert_eq!(text.translation.y, cell.y + cell.height / 2.0);
}

#[test]
fn test_metadata_identifies_table() {
    let mut s = session();
    let table = s.create_table(&contacts_spec()).unwrap();
    let raw = s
        .host()
        .metadata(&table.root, METADATA_KEY)
        .unwrap()
        .expect("metadata set on root");
    let meta = TableMetadata::from_json(&raw).unwrap();
    assert_eq!(meta.node_id, table.root);
    assert_eq!((meta.columns, meta.rows), (2, 3));
    assert!(chrono::DateTime::parse_from_rfc3339(&meta.created_at).is_ok());
    assert_eq!(meta, table.metadata);
}

#[test]
fn test_table_appended_to_insertion_parent() {
    let mut s = session();
    let table = s.create_table(&contacts_spec()).unwrap();
    let doc = s.host();
    let artboard = doc.insertion_parent().unwrap();
    assert_eq!(doc.parent(&table.root).unwrap(), Some(artboard));
}

#[test]
fn test_fits_page_without_scaling() {
    let mut s = session();
    let table = s.create_table(&contacts_spec()).unwrap();
    assert_eq!(table.scale, None);
    assert_eq!(node(s.host(), &table.root).transform.a, 1.0);
}

#[test]
fn test_wide_table_scaled_to_page() {
    let mut s = session_with_canvas(200.0, 800.0);
    let table = s.create_table(&contacts_spec()).unwrap();
    let doc = s.host();

    // two 150px columns from x=6 with one 6px gutter between them
    let width = doc.bounds_local(&table.root).unwrap().width;
    assert_eq!(width, 306.0);
    let factor = table.scale.expect("table should be scaled");
    assert_approx(factor, 200.0 / 306.0);
    let transform = node(doc, &table.root).transform;
    assert_approx(transform.a, factor);
    assert_approx(transform.d, factor);
}

#[test_case(0, 3 ; "zero columns")]
#[test_case(2, 0 ; "zero rows")]
#[test_case(-1, 2 ; "negative columns")]
fn test_invalid_counts_touch_nothing(columns: i32, rows: i32) {
    let mut s = session();
    let err = s.create_table(&TableSpec::new(columns, rows)).unwrap_err();
    assert!(matches!(err, TableError::InvalidDimension(_)));
    assert_eq!(s.host().created_count(), 0);
}

#[test]
fn test_invalid_color_rejected_up_front() {
    let mut s = session();
    let mut spec = contacts_spec();
    spec.style.colors.header = "#12345".to_string();
    let err = s.create_table(&spec).unwrap_err();
    assert!(matches!(err, TableError::InvalidColor(_)));
    assert_eq!(s.host().created_count(), 0);
}

#[test]
fn test_host_failure_leaves_partial_table() {
    let mut s = session();
    s.host_mut().fail(HostOp::SetMetadata);
    let err = s.create_table(&contacts_spec()).unwrap_err();
    assert!(err.is_host_failure());

    let doc = s.host();
    let artboard = doc.insertion_parent().unwrap();
    let drawn = doc.children(&artboard).unwrap();
    assert_eq!(drawn.len(), 1);
    assert_eq!(child_count(doc, &drawn[0]), 4);
}

#[test]
fn test_host_failure_before_append_leaves_document_untouched() {
    let mut s = session();
    s.host_mut().fail(HostOp::CreateRectangle);
    let err = s.create_table(&contacts_spec()).unwrap_err();
    assert!(matches!(err, TableError::HostOperation { operation: "createRectangle", .. }));
    let doc = s.host();
    assert!(doc.children(&doc.insertion_parent().unwrap()).unwrap().is_empty());
}

#[test]
fn test_builder_reuses_measurements_within_one_table() {
    let mut doc = MemoryDocument::new();
    let mut builder = TableBuilder::new(LayoutConfig::default()).unwrap();
    let spec = TableSpec::from_records(["A", "A"], [vec!["x", "x"]]);
    builder.create_table(&mut doc, &spec).unwrap();
    assert_eq!(builder.measurer().host_measurements(), 1);
    assert_eq!(builder.measurer().cache_hits(), 1);

    // Each table starts from fresh measurements
    builder.create_table(&mut doc, &spec).unwrap();
    assert_eq!(builder.measurer().host_measurements(), 2);
}

#[test]
fn test_font_change_between_tables_is_picked_up() {
    let mut s = session();
    let spec = TableSpec::new(1, 1).with_labels(["Twenty char label xx"]);
    let before = s.create_table(&spec).unwrap();
    assert_eq!(before.column_widths, vec![190.0]);

    let wider = TextMetrics {
        char_width: 10.0,
        ..s.host().metrics()
    };
    s.host_mut().set_metrics(wider);
    let after = s.create_table(&spec).unwrap();
    assert_eq!(after.column_widths, vec![240.0]);
}

#[test_case(101, 1 ; "too many columns")]
#[test_case(1, 1001 ; "too many rows")]
#[test_case(i32::MAX, 1 ; "absurd column count")]
#[test_case(2, i32::MAX ; "absurd row count")]
fn test_oversized_counts_touch_nothing(columns: i32, rows: i32) {
    let mut s = session();
    let err = s.create_table(&TableSpec::new(columns, rows)).unwrap_err();
    assert!(matches!(err, TableError::InvalidDimension(_)));
    assert_eq!(s.host().created_count(), 0);
}

#[test]
fn test_count_limits_follow_config() {
    let config = LayoutConfig {
        max_columns: 3,
        max_rows: 2,
        ..LayoutConfig::default()
    };
    let mut s = TableSession::new(MemoryDocument::new(), config).unwrap();
    assert!(s.create_table(&TableSpec::new(3, 2)).is_ok());
    let created = s.host().created_count();
    assert!(matches!(
        s.create_table(&TableSpec::new(4, 2)),
        Err(TableError::InvalidDimension(_))
    ));
    assert_eq!(s.host().created_count(), created);
}

#[test]
fn test_zero_row_height_rejected_before_drawing() {
    let config = LayoutConfig {
        table_height: 0.0,
        min_row_height: 0.0,
        ..LayoutConfig::default()
    };
    assert!(matches!(
        TableBuilder::new(config.clone()),
        Err(TableError::InvalidConfig(_))
    ));
    assert!(matches!(
        TableSession::new(MemoryDocument::new(), config),
        Err(TableError::InvalidConfig(_))
    ));
}

#[test]
fn test_custom_config_changes_clamp() {
    let config = LayoutConfig {
        min_column_width: 80.0,
        max_column_width: 120.0,
        ..LayoutConfig::default()
    };
    let mut doc = MemoryDocument::new();
    let mut builder = TableBuilder::new(config).unwrap();
    let table = builder.create_table(&mut doc, &contacts_spec()).unwrap();
    assert_eq!(table.column_widths, vec![80.0, 80.0]);
}
