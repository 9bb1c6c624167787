//! Shared helpers for the integration tests.
//!
//! Everything runs against [`MemoryDocument`], whose text metrics are fixed:
//! 7.5px per character at font size 15, lines 18px tall.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_precision_loss
)]

use express_tables::host::{DocumentQuery, MemoryDocument, MemoryNode};
use express_tables::layout::CellBox;
use express_tables::types::{NodeId, Size, TableSpec};
use express_tables::TableSession;

/// Width of `text` under the memory document's metrics
pub fn text_width(text: &str) -> f64 {
    text.chars().count() as f64 * 7.5
}

pub fn session() -> TableSession<MemoryDocument> {
    TableSession::with_defaults(MemoryDocument::new()).unwrap()
}

pub fn session_with_canvas(width: f64, height: f64) -> TableSession<MemoryDocument> {
    TableSession::with_defaults(MemoryDocument::with_canvas(Size { width, height })).unwrap()
}

/// Two columns, three rows of contacts
pub fn contacts_spec() -> TableSpec {
    TableSpec::from_records(
        ["Name", "Email"],
        [
            vec!["Ann", "a@x.com"],
            vec!["Bo", "b@x.com"],
            vec!["Cy", "c@x.com"],
        ],
    )
}

pub fn node<'a>(doc: &'a MemoryDocument, id: &NodeId) -> &'a MemoryNode {
    doc.node(id)
        .unwrap_or_else(|| panic!("node {id} missing from document"))
}

/// Text currently shown by a cell
pub fn cell_text(doc: &MemoryDocument, cell: &CellBox) -> String {
    node(doc, &cell.text_node).text.clone()
}

/// Rendered height of a cell's rectangle
pub fn rect_height(doc: &MemoryDocument, cell: &CellBox) -> f64 {
    node(doc, &cell.rect).height
}

pub fn child_count(doc: &MemoryDocument, id: &NodeId) -> usize {
    doc.children(id).unwrap().len()
}

pub fn assert_approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
